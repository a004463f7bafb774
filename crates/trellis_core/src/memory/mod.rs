//! # Memory Management
//!
//! Storage for tree elements addressed by generational handles.

mod arena;

pub use arena::{Handle, SlotArena};
