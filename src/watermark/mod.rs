//! Watermark placement and image composition
//!
//! - `anchor`: named vertical placements and the button grid built from them
//! - `position`: pure placement math (photo size, watermark size, anchor) → rectangle
//! - `compositor`: decode, scale, overlay and re-encode

pub mod anchor;
pub mod compositor;
pub mod position;

pub use anchor::Anchor;
pub use compositor::{render, render_blocking, WatermarkError};
pub use position::{compute, Placement};
