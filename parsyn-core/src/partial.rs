//! Source partials: time-ordered breakpoint trajectories produced upstream.
//!
//! A [`Partial`] keeps its `(time, Breakpoint)` pairs strictly increasing in
//! time. The only ways in are [`Partial::insert`] and `FromIterator`, both of
//! which maintain the order, so downstream code can rely on it.

use alloc::vec::Vec;

use crate::breakpoint::Breakpoint;

/// One analysed sinusoidal trajectory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partial {
    label: i32,
    breakpoints: Vec<(f64, Breakpoint)>,
}

impl Partial {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `bp` at `time` seconds. A breakpoint already at exactly `time`
    /// is replaced.
    pub fn insert(&mut self, time: f64, bp: Breakpoint) {
        match self
            .breakpoints
            .binary_search_by(|(t, _)| t.total_cmp(&time))
        {
            Ok(i) => self.breakpoints[i].1 = bp,
            Err(i) => self.breakpoints.insert(i, (time, bp)),
        }
    }

    #[inline] pub fn len(&self) -> usize { self.breakpoints.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.breakpoints.is_empty() }

    #[inline] pub fn label(&self) -> i32 { self.label }
    #[inline] pub fn set_label(&mut self, label: i32) { self.label = label; }

    #[inline] pub fn first(&self) -> Option<&(f64, Breakpoint)> { self.breakpoints.first() }
    #[inline] pub fn last(&self) -> Option<&(f64, Breakpoint)> { self.breakpoints.last() }

    /// Time of the first breakpoint, 0 for an empty partial.
    #[inline]
    pub fn start_time(&self) -> f64 {
        self.first().map_or(0.0, |(t, _)| *t)
    }

    /// Time of the last breakpoint, 0 for an empty partial.
    #[inline]
    pub fn end_time(&self) -> f64 {
        self.last().map_or(0.0, |(t, _)| *t)
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, (f64, Breakpoint)> {
        self.breakpoints.iter()
    }
}

impl FromIterator<(f64, Breakpoint)> for Partial {
    fn from_iter<I: IntoIterator<Item = (f64, Breakpoint)>>(iter: I) -> Self {
        let mut p = Partial::new();
        for (t, bp) in iter {
            p.insert(t, bp);
        }
        p
    }
}

impl<'a> IntoIterator for &'a Partial {
    type Item = &'a (f64, Breakpoint);
    type IntoIter = core::slice::Iter<'a, (f64, Breakpoint)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
