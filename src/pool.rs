//! # Buffer pools
//!
//! Per-thread free lists of `Vec` buffers for the evaluator's inner loop.
//! Every pair needs a few short-lived vectors (the parents' skill pool, the
//! skill targets being enumerated); taking them from a pool keeps the hot
//! loop free of allocations once each worker thread is warm.
//!
//! Each thread owns its own free list, so taking and returning a buffer never
//! contends with other workers.
//!
//! ```rust
//! use breedpath::pool::BufferPool;
//!
//! let pool: BufferPool<u32> = BufferPool::new();
//! {
//!     let mut buffer = pool.take();
//!     buffer.extend([1, 2, 3]);
//!     assert_eq!(buffer.len(), 3);
//! }
//! // the buffer went back to this thread's free list, emptied
//! assert_eq!(pool.available(), 1);
//! assert!(pool.take().is_empty());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::ops::{Deref, DerefMut};

use thread_local::ThreadLocal;

/// Buffers kept per thread; extra returns are dropped.
const MAX_RETAINED: usize = 16;

pub struct BufferPool<T: Send> {
    free: ThreadLocal<RefCell<Vec<Vec<T>>>>,
}

impl<T: Send> BufferPool<T> {
    pub fn new() -> Self {
        Self {
            free: ThreadLocal::new(),
        }
    }

    /// Takes an empty buffer, reusing one returned earlier on this thread
    /// when possible.
    pub fn take(&self) -> PooledVec<'_, T> {
        let buffer = self
            .free
            .get()
            .and_then(|cell| cell.try_borrow_mut().ok())
            .and_then(|mut free| free.pop())
            .unwrap_or_default();
        PooledVec { pool: self, buffer }
    }

    fn give_back(&self, mut buffer: Vec<T>) {
        buffer.clear();
        let cell = self.free.get_or_default();
        if let Ok(mut free) = cell.try_borrow_mut() {
            if free.len() < MAX_RETAINED {
                free.push(buffer);
            }
        }
    }

    /// Number of idle buffers held for the current thread.
    pub fn available(&self) -> usize {
        self.free
            .get()
            .and_then(|cell| cell.try_borrow().ok())
            .map_or(0, |free| free.len())
    }
}

impl<T: Send> Default for BufferPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> fmt::Debug for BufferPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("available", &self.available())
            .finish()
    }
}

/// A buffer on loan from a [`BufferPool`]. Goes back to the pool on drop.
pub struct PooledVec<'a, T: Send> {
    pool: &'a BufferPool<T>,
    buffer: Vec<T>,
}

impl<T: Send> Deref for PooledVec<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.buffer
    }
}

impl<T: Send> DerefMut for PooledVec<'_, T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.buffer
    }
}

impl<T: Send> Drop for PooledVec<'_, T> {
    fn drop(&mut self) {
        if self.buffer.capacity() > 0 {
            self.pool.give_back(std::mem::take(&mut self.buffer));
        }
    }
}
