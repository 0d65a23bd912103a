//! Low-level painters over the ratatui canvas.
//!
//! The canvas only knows points and line segments, so circles and arcs are
//! sampled into short polylines. Stroke width is emulated with concentric or
//! parallel passes spaced half a braille pixel apart.

use crate::theme::Rgb;
use ratatui::widgets::canvas::{Context, Line as CanvasLine, Points};
use std::f64::consts::TAU;

/// Radians per polyline segment when sampling an arc.
const ARC_STEP: f64 = 0.1;

/// Spacing between stroke passes, in canvas pixels.
const PASS_SPACING: f64 = 0.5;

/// Outline circle with emulated stroke width.
pub fn stroke_circle(ctx: &mut Context, cx: f64, cy: f64, radius: f64, width: u16, color: Rgb) {
    stroke_arc(ctx, cx, cy, radius, 0.0, TAU, width, color);
}

/// Arc from `start` to `end` radians, counter-clockwise.
pub fn stroke_arc(
    ctx: &mut Context,
    cx: f64,
    cy: f64,
    radius: f64,
    start: f64,
    end: f64,
    width: u16,
    color: Rgb,
) {
    if radius <= 0.0 || end <= start {
        return;
    }
    for pass in 0..width.max(1) {
        let r = radius + PASS_SPACING * (f64::from(pass) - f64::from(width.max(1) - 1) / 2.0);
        if r <= 0.0 {
            continue;
        }
        let span = end - start;
        let segments = ((span / ARC_STEP).ceil() as usize).max(3);
        let mut prev = (cx + r * start.cos(), cy + r * start.sin());
        for i in 1..=segments {
            let angle = start + span * i as f64 / segments as f64;
            let next = (cx + r * angle.cos(), cy + r * angle.sin());
            ctx.draw(&CanvasLine {
                x1: prev.0,
                y1: prev.1,
                x2: next.0,
                y2: next.1,
                color: color.into(),
            });
            prev = next;
        }
    }
}

/// Straight segment with parallel passes for width.
pub fn stroke_line(
    ctx: &mut Context,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    width: u16,
    color: Rgb,
) {
    let (dx, dy) = (x2 - x1, y2 - y1);
    let len = (dx * dx + dy * dy).sqrt();
    let (nx, ny) = if len > 1e-9 {
        (-dy / len, dx / len)
    } else {
        (0.0, 0.0)
    };
    for pass in 0..width.max(1) {
        let offset = PASS_SPACING * (f64::from(pass) - f64::from(width.max(1) - 1) / 2.0);
        ctx.draw(&CanvasLine {
            x1: x1 + nx * offset,
            y1: y1 + ny * offset,
            x2: x2 + nx * offset,
            y2: y2 + ny * offset,
            color: color.into(),
        });
    }
}

/// Closed polygon outline through `points`.
pub fn stroke_polygon(ctx: &mut Context, points: &[(f64, f64)], width: u16, color: Rgb) {
    if points.len() < 2 {
        return;
    }
    for i in 0..points.len() {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % points.len()];
        stroke_line(ctx, x1, y1, x2, y2, width, color);
    }
}

/// Filled dot of the given pixel radius.
pub fn fill_dot(ctx: &mut Context, x: f64, y: f64, radius: f64, color: Rgb) {
    if radius < 1.0 {
        ctx.draw(&Points {
            coords: &[(x, y)],
            color: color.into(),
        });
        return;
    }
    let r = radius.ceil() as i32;
    let mut coords = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f64 <= radius * radius {
                coords.push((x + f64::from(dx), y + f64::from(dy)));
            }
        }
    }
    ctx.draw(&Points {
        coords: &coords,
        color: color.into(),
    });
}
