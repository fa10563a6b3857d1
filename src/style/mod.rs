//! Style registry.
//!
//! Static, read-only tables mapping style ids to geometric rules:
//!
//! - [`modules`]: data-module shapes.
//! - [`finder`]: finder-square and finder-dot shapes.
//! - [`frames`]: frame templates used by the compositor.
//!
//! Every lookup is total. An unknown or stale id resolves to the table's default entry so
//! interactive editing never fails on a garbage style id.

pub mod finder;
pub mod frames;
pub mod geometry;
pub mod modules;

pub use finder::{finder_dot, finder_square, FinderDot, FinderSquare, DOT_RATIO, RING_RATIO};
pub use frames::{frame_kind, BannerPlacement, BorderStyle, CornerClass, FrameKind, FrameTemplate};
pub use geometry::{Bounds, PathCmd, Point, Primitive};
pub use modules::{module_shape, ModuleCell, ModuleShape};
