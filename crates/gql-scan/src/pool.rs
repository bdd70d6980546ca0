use std::sync::{Mutex, PoisonError};

use crate::scanner::Open;

/// Upper bound on retained buffers; anything beyond is dropped.
const KEEP: usize = 64;

/// A process-wide free list of scanner stack buffers.
///
/// A scan acquires one buffer at entry and releases it on every return
/// path through the scanner's `Drop`. Contents are cleared on release;
/// capacity is kept, so a repeated scan allocates nothing.
pub(crate) struct Pool {
    free: Mutex<Vec<Vec<Open>>>,
}

impl Pool {
    pub(crate) const fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn acquire(&self) -> Vec<Open> {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default()
    }

    pub(crate) fn release(&self, mut stack: Vec<Open>) {
        stack.clear();
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < KEEP {
            free.push(stack);
        }
    }
}

pub(crate) static STACKS: Pool = Pool::new();
