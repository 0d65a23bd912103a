//! Frame drawing: canvas painting for the sphere/HUD and widget panels.

pub mod context;
pub mod hud;
pub mod panels;
pub mod shapes;
pub mod sphere;

pub use context::{RenderContext, Strokes};
