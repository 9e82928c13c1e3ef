//! Two slots whose roles alternate every frame.
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │          PingPong           │
//!                    │                             │
//!                    │  ┌─────────┐  ┌─────────┐  │
//!                    │  │ Slot 0  │  │ Slot 1  │  │
//!                    │  └────┬────┘  └────┬────┘  │
//!                    │       │            │       │
//!                    │  ┌────┴────────────┴────┐  │
//!                    │  │  current index (0/1) │  │
//!                    │  └──────────────────────┘  │
//!                    └─────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//!      ┌──────────────┐                ┌──────────────┐
//!      │   current    │                │   feedback   │
//!      │ (read/draw)  │                │  (capture)   │
//!      └──────────────┘                └──────────────┘
//! ```
//!
//! Owned by a single thread; swapping is a plain index flip.

/// A pair of equally-typed slots with alternating roles.
#[derive(Debug, Clone)]
pub struct PingPong<T> {
    slots: [T; 2],
    current: usize,
}

impl<T> PingPong<T> {
    /// Creates a pair with slot 0 as the current slot.
    #[must_use]
    pub fn new(first: T, second: T) -> Self {
        Self {
            slots: [first, second],
            current: 0,
        }
    }

    /// Index of the slot read this frame.
    #[inline]
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// The slot read this frame.
    #[inline]
    #[must_use]
    pub fn current(&self) -> &T {
        &self.slots[self.current]
    }

    /// The slot written this frame.
    #[inline]
    #[must_use]
    pub fn feedback(&self) -> &T {
        &self.slots[self.current ^ 1]
    }

    /// Flips the roles. Call once per completed frame.
    #[inline]
    pub fn swap(&mut self) {
        self.current ^= 1;
    }

    /// Consumes the pair, returning both slots in index order.
    #[must_use]
    pub fn into_inner(self) -> [T; 2] {
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_and_feedback_differ() {
        let mut pair = PingPong::new("a", "b");
        for _ in 0..5 {
            assert_ne!(pair.current(), pair.feedback());
            pair.swap();
        }
    }

    #[test]
    fn test_index_is_frame_parity() {
        let mut pair = PingPong::new(0_u8, 1_u8);
        for frames in 0..10_u64 {
            assert_eq!(pair.current_index() as u64, frames % 2);
            assert_eq!(u64::from(*pair.current()), frames % 2);
            pair.swap();
        }
    }

    #[test]
    fn test_into_inner_keeps_slot_order() {
        let mut pair = PingPong::new(1, 2);
        pair.swap();
        assert_eq!(*pair.feedback(), 1);
        assert_eq!(pair.into_inner(), [1, 2]);
    }
}
