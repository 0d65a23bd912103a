//! Point-cloud sphere painting.

use super::context::RenderContext;
use super::shapes::{fill_dot, stroke_circle};
use crate::geometry::Projected;
use crate::theme::Rgb;
use ratatui::widgets::canvas::Context;

/// Faint outline so the sphere reads as a volume even when quiet.
const OUTLINE_COLOR: Rgb = Rgb::new(10, 10, 20);
const OUTLINE_SHARE: f64 = 0.9;

/// Point radii are tuned for pixel displays; halve them for braille cells.
const DOT_SCALE: f64 = 0.5;

/// Draw the outline and the already depth-sorted points, farthest first.
pub fn draw_sphere(ctx: &mut Context, rc: &RenderContext, projections: &[Projected]) {
    let (cx, cy) = rc.center();
    stroke_circle(ctx, cx, cy, rc.sphere_radius() * OUTLINE_SHARE, 1, OUTLINE_COLOR);

    for p in projections {
        if p.x < 0.0 || p.x >= rc.width || p.y < 0.0 || p.y >= rc.height {
            continue;
        }
        fill_dot(ctx, p.x, p.y, p.radius * DOT_SCALE, p.color);
    }
}
