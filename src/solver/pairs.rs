//! Lazy enumeration of the parent pairs of one generation.
//!
//! After a commit the population is split into members that were already
//! there (`existing`) and members added by the last generation (`added`).
//! Pairs among `existing` were evaluated before, so the next generation only
//! needs `existing x added` plus the unordered pairs within `added`
//! (including a member paired with itself). Pairs are addressed by index,
//! which lets the driver cut the space into contiguous chunks for the worker
//! threads without materializing it.

use std::ops::Range;

use crate::reference::SharedRef;

#[derive(Debug, Clone, Default)]
pub struct PairSpace {
    existing: Vec<SharedRef>,
    added: Vec<SharedRef>,
}

impl PairSpace {
    pub fn new(existing: Vec<SharedRef>, added: Vec<SharedRef>) -> Self {
        Self { existing, added }
    }

    fn cross_len(&self) -> usize {
        self.existing.len() * self.added.len()
    }

    pub fn len(&self) -> usize {
        let added = self.added.len();
        self.cross_len() + added * (added + 1) / 2
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }

    /// Splits the index space into ranges of at most `size` pairs.
    pub fn chunks(&self, size: usize) -> Vec<Range<usize>> {
        let size = size.max(1);
        let len = self.len();
        (0..len)
            .step_by(size)
            .map(|start| start..(start + size).min(len))
            .collect()
    }

    /// The pairs with indices in `range`.
    pub fn pairs(&self, range: Range<usize>) -> Pairs<'_> {
        let remaining = range.end.min(self.len()).saturating_sub(range.start);
        Pairs {
            space: self,
            cursor: self.cursor_at(range.start),
            remaining,
        }
    }

    fn cursor_at(&self, index: usize) -> Cursor {
        let added = self.added.len();
        if index < self.cross_len() {
            return Cursor::Cross {
                i: index / added,
                j: index % added,
            };
        }
        let mut offset = index - self.cross_len();
        let mut i = 0;
        while i < added && offset >= added - i {
            offset -= added - i;
            i += 1;
        }
        Cursor::Triangle { i, j: i + offset }
    }
}

#[derive(Debug, Clone, Copy)]
enum Cursor {
    Cross { i: usize, j: usize },
    Triangle { i: usize, j: usize },
}

/// Iterator over a range of a [`PairSpace`].
#[derive(Debug)]
pub struct Pairs<'a> {
    space: &'a PairSpace,
    cursor: Cursor,
    remaining: usize,
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a SharedRef, &'a SharedRef);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let space = self.space;
        let added = space.added.len();
        match self.cursor {
            Cursor::Cross { i, j } => {
                let pair = (&space.existing[i], &space.added[j]);
                self.cursor = if j + 1 < added {
                    Cursor::Cross { i, j: j + 1 }
                } else if i + 1 < space.existing.len() {
                    Cursor::Cross { i: i + 1, j: 0 }
                } else {
                    Cursor::Triangle { i: 0, j: 0 }
                };
                Some(pair)
            }
            Cursor::Triangle { i, j } => {
                let pair = (&space.added[i], &space.added[j]);
                self.cursor = if j + 1 < added {
                    Cursor::Triangle { i, j: j + 1 }
                } else {
                    Cursor::Triangle { i: i + 1, j: i + 1 }
                };
                Some(pair)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::game::{GameConstants, Species, SpeciesId};
    use crate::reference::CandidateRef;

    fn refs(ids: Range<u32>) -> Vec<SharedRef> {
        ids.map(|id| {
            let species = Species::new(SpeciesId(id), "s").with_capture_effort(Duration::from_secs(1));
            Arc::new(CandidateRef::wild(&species, 0, &GameConstants::default()).unwrap())
        })
        .collect()
    }

    fn ids(pair: (&SharedRef, &SharedRef)) -> (u32, u32) {
        (pair.0.species().0, pair.1.species().0)
    }

    #[test]
    fn test_pair_count() {
        let space = PairSpace::new(refs(0..3), refs(10..14));
        assert_eq!(space.len(), 3 * 4 + 10);
        assert_eq!(space.pairs(0..space.len()).count(), space.len());
        assert!(PairSpace::new(refs(0..3), Vec::new()).is_empty());
        assert_eq!(PairSpace::new(refs(0..3), Vec::new()).len(), 0);
    }

    #[test]
    fn test_chunks_cover_every_pair_once() {
        let space = PairSpace::new(refs(0..3), refs(10..14));
        let whole: Vec<(u32, u32)> = space.pairs(0..space.len()).map(ids).collect();
        let chunked: Vec<(u32, u32)> = space
            .chunks(5)
            .into_iter()
            .flat_map(|range| space.pairs(range).map(ids).collect::<Vec<_>>())
            .collect();
        assert_eq!(whole, chunked);

        let distinct: HashSet<(u32, u32)> = whole.iter().copied().collect();
        assert_eq!(distinct.len(), whole.len());
        assert!(distinct.contains(&(10, 10)));
        assert!(distinct.contains(&(2, 13)));
        assert!(!distinct.contains(&(0, 1)));
    }

    #[test]
    fn test_triangle_only() {
        let space = PairSpace::new(Vec::new(), refs(0..3));
        let pairs: Vec<(u32, u32)> = space.pairs(0..space.len()).map(ids).collect();
        assert_eq!(pairs, vec![(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)]);
    }
}
