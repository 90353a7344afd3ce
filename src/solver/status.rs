use std::fmt;

/// Phase of a solve, reported through [`SolverStatus`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverPhase {
    Initializing,
    Breeding,
    Simplifying,
    Finished,
}

/// Progress event emitted at every phase transition and generation boundary.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverStatus {
    pub phase: SolverPhase,
    /// 1-based; 0 before the first generation.
    pub current_generation: usize,
    pub target_generations: usize,
    pub cancelled: bool,
}

/// Callback receiving status events.
pub type StatusCallback = Box<dyn Fn(&SolverStatus) + Send + Sync>;

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {}/{}",
            self.phase, self.current_generation, self.target_generations
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}
