//! The working set of partials currently mid-render.
//!
//! Partials are referred to by their index in the session's frozen partial
//! slice, never by reference. The queue is allocated once at `setup` with room
//! for every partial, and a partial is in it at most once, so it never grows
//! on the audio thread.

use std::collections::VecDeque;

#[derive(Clone, Debug, Default)]
pub struct ActiveSet {
    queue: VecDeque<usize>,
}

impl ActiveSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { queue: VecDeque::with_capacity(capacity) }
    }

    #[inline] pub fn len(&self) -> usize { self.queue.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.queue.is_empty() }
    #[inline] pub fn clear(&mut self) { self.queue.clear(); }

    #[inline]
    pub fn push(&mut self, index: usize) {
        debug_assert!(!self.queue.contains(&index), "partial {index} is already active");
        self.queue.push_back(index);
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.queue.contains(&index)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.queue.iter().copied()
    }

    /// Visit every active partial once, in activation order. Partials for
    /// which `f` returns `false` leave the set; the others keep their order.
    #[inline]
    pub fn retain(&mut self, mut f: impl FnMut(usize) -> bool) {
        self.queue.retain(|&index| f(index));
    }
}
