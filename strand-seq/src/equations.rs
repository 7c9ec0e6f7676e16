//! Pending Equations
//!
//! A stack of frames mirroring the host's scope stack. Each frame holds
//! three parallel arrays `(lhs[i], rhs[i], dep[i])`: the equalities still
//! to be simplified or solved, each with the dependency it was derived
//! under. A push copies the current frame so a pop restores it exactly;
//! within a frame the simplify/solve sweeps compact with swap-removal.

use crate::deps::Dep;
use strand_core::ast::TermId;

#[derive(Debug, Clone, Default)]
struct Frame {
    lhs: Vec<TermId>,
    rhs: Vec<TermId>,
    deps: Vec<Dep>,
}

/// Scope-stacked store of pending equations.
#[derive(Debug)]
pub struct Equations {
    frames: Vec<Frame>,
}

impl Equations {
    /// Create a store with the base frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Append `(l, r, dep)` to the current frame.
    pub fn push(&mut self, l: TermId, r: TermId, dep: Dep) {
        let frame = self.frames.last_mut().expect("equation store has no frame");
        frame.lhs.push(l);
        frame.rhs.push(r);
        frame.deps.push(dep);
    }

    /// Number of pending equations in the current frame.
    pub fn len(&self) -> usize {
        self.frames.last().expect("equation store has no frame").lhs.len()
    }

    /// Whether the current frame is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Equation `i` of the current frame.
    pub fn get(&self, i: usize) -> (TermId, TermId, Dep) {
        let frame = self.frames.last().expect("equation store has no frame");
        (frame.lhs[i], frame.rhs[i], frame.deps[i])
    }

    /// Remove equation `i`, moving the last equation into its slot.
    /// Returns whether a move happened.
    pub fn swap_remove(&mut self, i: usize) -> bool {
        let frame = self.frames.last_mut().expect("equation store has no frame");
        let last = frame.lhs.len() - 1;
        let moved = i != last;
        frame.lhs.swap_remove(i);
        frame.rhs.swap_remove(i);
        frame.deps.swap_remove(i);
        moved
    }

    /// Copy the current frame onto the stack.
    pub fn push_frame(&mut self) {
        let top = self.frames.last().expect("equation store has no frame").clone();
        self.frames.push(top);
    }

    /// Drop the current frame, restoring the previous one.
    pub fn pop_frame(&mut self) {
        assert!(self.frames.len() > 1, "pop of base equation frame");
        self.frames.pop();
    }

    /// Scope depth, counting the base frame.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Iterate the current frame for diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, TermId)> + '_ {
        let frame = self.frames.last().expect("equation store has no frame");
        frame.lhs.iter().copied().zip(frame.rhs.iter().copied())
    }
}

impl Default for Equations {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(i: u32) -> TermId {
        TermId::new(i)
    }

    #[test]
    fn test_push_get_remove() {
        let mut eqs = Equations::new();
        eqs.push(t(0), t(1), None);
        eqs.push(t(2), t(3), None);
        assert_eq!(eqs.len(), 2);
        assert_eq!(eqs.get(0), (t(0), t(1), None));
        assert!(eqs.swap_remove(0));
        assert_eq!(eqs.len(), 1);
        assert_eq!(eqs.get(0), (t(2), t(3), None));
        assert!(!eqs.swap_remove(0));
        assert!(eqs.is_empty());
    }

    #[test]
    fn test_frames_copy_on_push() {
        let mut eqs = Equations::new();
        eqs.push(t(0), t(1), None);
        eqs.push_frame();
        eqs.push(t(2), t(3), None);
        eqs.swap_remove(0);
        assert_eq!(eqs.len(), 1);
        eqs.pop_frame();
        assert_eq!(eqs.len(), 1);
        assert_eq!(eqs.get(0), (t(0), t(1), None));
    }

    #[test]
    #[should_panic(expected = "pop of base equation frame")]
    fn test_base_frame_protected() {
        let mut eqs = Equations::new();
        eqs.pop_frame();
    }
}
