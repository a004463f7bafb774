//! # Trellis Core
//!
//! Leaf primitives shared by every Trellis crate:
//! - A generational slot arena with stable, stale-detecting handles
//! - Small-value 2D math used by the scene graph and the draw list
//!
//! ## Architecture Rules
//!
//! 1. **Handles, not pointers** - tree links are `Handle`s into one arena
//! 2. **Stale handles are detected** - every slot carries a generation
//! 3. **Plain data** - math types are `Copy`, `Pod` and serde-friendly
//!
//! ## Example
//!
//! ```rust
//! use trellis_core::{SlotArena, Vec2};
//!
//! let mut arena = SlotArena::new();
//! let handle = arena.insert(Vec2::new(1.0, 2.0));
//! assert_eq!(arena.get(handle), Some(&Vec2::new(1.0, 2.0)));
//!
//! arena.remove(handle);
//! assert!(arena.get(handle).is_none());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod math;
pub mod memory;

pub use math::{Affine2, Rect, Vec2};
pub use memory::{Handle, SlotArena};
