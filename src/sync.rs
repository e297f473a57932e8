#[cfg(not(all(test, feature = "loom")))]
use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(all(test, feature = "loom"))]
use loom::sync::atomic::{AtomicUsize, Ordering};

/// Spaces per indentation step.
pub const TAB_WIDTH: usize = 2;

/// Prefix for a message nested `depth` levels deep.
pub fn indentation(depth: usize) -> String {
    " ".repeat(TAB_WIDTH * depth)
}

/// Indentation depth owned by a single logger.
///
/// Updates are atomic, so loggers shared across threads never lose an increase or
/// decrease. Decreasing below zero is a no-op.
#[derive(Debug)]
pub(crate) struct Indentation {
    depth: AtomicUsize,
}

impl Indentation {
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            depth: AtomicUsize::new(depth),
        }
    }

    #[inline]
    pub(crate) fn depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    pub(crate) fn increase(&self) {
        self.depth.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn decrease(&self) {
        let mut current = self.depth.load(Ordering::Acquire);
        while current > 0 {
            match self.depth.compare_exchange(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}
