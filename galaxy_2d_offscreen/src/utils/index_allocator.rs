/// Hands out offscreen slot indices, always the lowest free one.
///
/// Released indices are reused before the range grows, so a pool that
/// settles at N live surfaces keeps addressing them as `0..N`.
///
/// # Example
///
/// ```ignore
/// let mut indices = IndexAllocator::new();
/// let a = indices.acquire();  // 0
/// let b = indices.acquire();  // 1
/// indices.release(a);
/// let c = indices.acquire();  // 0 again
/// ```

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Default)]
pub(crate) struct IndexAllocator {
    released: BinaryHeap<Reverse<u32>>,
    end: u32,
}

impl IndexAllocator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Take the lowest index not currently in use
    pub(crate) fn acquire(&mut self) -> u32 {
        match self.released.pop() {
            Some(Reverse(index)) => index,
            None => {
                let index = self.end;
                self.end += 1;
                index
            }
        }
    }

    /// Give an index back
    ///
    /// Releasing an index that was never handed out is ignored.
    pub(crate) fn release(&mut self, index: u32) {
        if index >= self.end || self.released.iter().any(|Reverse(i)| *i == index) {
            return;
        }
        self.released.push(Reverse(index));
    }

    /// Number of indices in use
    pub(crate) fn in_use(&self) -> u32 {
        self.end - self.released.len() as u32
    }

    /// Drop every assignment
    pub(crate) fn reset(&mut self) {
        self.released.clear();
        self.end = 0;
    }
}

#[cfg(test)]
#[path = "index_allocator_tests.rs"]
mod tests;
