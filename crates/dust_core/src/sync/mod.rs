//! # Ping-Pong Slots
//!
//! ## The Problem
//!
//! ```text
//! Simulate pass:  READ particles, WRITE particles
//!
//! Same buffer for both:   READ/WRITE HAZARD → GARBAGE
//! ```
//!
//! ## The Solution: Alternate Two Buffers
//!
//! ```text
//! Frame N:
//!   read  slot A (current)
//!   write slot B (feedback)
//!
//! Frame N+1:
//!   SWAP
//!   read  slot B
//!   write slot A
//! ```
//!
//! The slot read in a frame is never the slot written in that frame.

mod ping_pong;

pub use ping_pong::PingPong;
