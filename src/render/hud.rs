//! The layered circular HUD drawn over the sphere core.
//!
//! Pure function of the render context, the frame clock, the loudness sample
//! and the active pulses; all animation phase derives from the clock, so the
//! HUD holds no state of its own.

use super::context::RenderContext;
use super::shapes::{fill_dot, stroke_arc, stroke_circle, stroke_line, stroke_polygon};
use crate::pulse::PULSE_LIFETIME;
use crate::theme::{FRAME_CYAN, FRAME_CYAN_SOFT};
use ratatui::widgets::canvas::Context;
use std::f64::consts::{PI, TAU};

/// Low levels still move the HUD visibly thanks to gamma compression.
const LOUDNESS_GAMMA: f64 = 0.7;

const GAP_ARC_COUNT: usize = 3;
const GAP_ARC_SPEED: f64 = 0.6;
const GAP_ARC_SPAN: f64 = PI / 7.0;

const REACTIVE_ARC_COUNT: usize = 5;
const TICK_COUNT: usize = 24;
const SCAN_LINE_COUNT: usize = 18;
const MICRO_DOT_COUNT: usize = 12;

const POLYGON_SIDES: usize = 6;
const POLYGON_SPEED: f64 = 1.2;
const TICK_SPEED: f64 = 0.5;
const SCAN_SPEED: f64 = 1.8;
const SWEEP_SPEED: f64 = 1.3;
const SWEEP_SPAN: f64 = PI / 20.0;
const ORBIT_SPEED: f64 = 2.2;
const MICRO_DOT_SPEED: f64 = 0.7;
const FLICKER_FREQ: f64 = 4.0;

pub fn draw_hud(ctx: &mut Context, rc: &RenderContext, now: f64, loudness: f32, pulses: &[f64]) {
    let (cx, cy) = rc.center();
    let base = rc.hud_base();
    let strokes = rc.strokes();

    let amp = f64::from(loudness).clamp(0.0, 1.0);
    let amp_visual = amp.powf(LOUDNESS_GAMMA);

    // Frame rings: constant cyan, a stable reference no theme can move.
    let r_inner_frame = base * 0.85;
    let r_outer_frame = base * 1.4;
    let r_outer_glow = base * 1.6;
    stroke_circle(ctx, cx, cy, r_outer_glow, strokes.glow_ring, FRAME_CYAN_SOFT);
    stroke_circle(ctx, cx, cy, r_outer_frame, strokes.outer_ring, FRAME_CYAN);
    stroke_circle(ctx, cx, cy, r_inner_frame, strokes.inner_ring, FRAME_CYAN);

    // Spinning gap arcs give the outer ring a segmented look.
    for i in 0..GAP_ARC_COUNT {
        let offset = now * GAP_ARC_SPEED + i as f64 * TAU / GAP_ARC_COUNT as f64;
        stroke_arc(
            ctx,
            cx,
            cy,
            r_outer_frame,
            offset,
            offset + GAP_ARC_SPAN,
            strokes.gap_arc,
            FRAME_CYAN_SOFT,
        );
    }

    let inner_color = rc.theme.inner_color(amp_visual);

    // Pulsing core plus its independent flicker ring.
    let core_radius = base * (0.45 + 0.25 * amp_visual);
    stroke_circle(ctx, cx, cy, core_radius, strokes.core_outline, inner_color);
    let flicker_radius = (core_radius * (0.5 + 0.2 * (now * FLICKER_FREQ).sin())).max(2.0);
    stroke_circle(ctx, cx, cy, flicker_radius, strokes.flicker_ring, inner_color);

    // Rotating hexagon "processor".
    let poly_radius = core_radius * 0.75;
    let poly_phase = now * POLYGON_SPEED;
    let hex: Vec<(f64, f64)> = (0..POLYGON_SIDES)
        .map(|i| {
            let angle = poly_phase + TAU * i as f64 / POLYGON_SIDES as f64;
            (cx + poly_radius * angle.cos(), cy + poly_radius * angle.sin())
        })
        .collect();
    stroke_polygon(ctx, &hex, strokes.polygon, inner_color);

    // Reactive arcs widen with loudness.
    let arc_radius = base * 1.05;
    for i in 0..REACTIVE_ARC_COUNT {
        let phase = now * (0.9 + 0.2 * i as f64);
        let span = PI / 7.0 + amp_visual * (PI / 10.0);
        let start = phase + i as f64 * TAU / REACTIVE_ARC_COUNT as f64;
        stroke_arc(ctx, cx, cy, arc_radius, start, start + span, strokes.arc_ring, inner_color);
    }

    // Slowly rotating ticks on the inner frame.
    let tick_phase = now * TICK_SPEED;
    for i in 0..TICK_COUNT {
        let angle = tick_phase + TAU * i as f64 / TICK_COUNT as f64;
        let (sin, cos) = angle.sin_cos();
        stroke_line(
            ctx,
            cx + r_inner_frame * 0.95 * cos,
            cy + r_inner_frame * 0.95 * sin,
            cx + r_inner_frame * 1.02 * cos,
            cy + r_inner_frame * 1.02 * sin,
            strokes.tick,
            FRAME_CYAN_SOFT,
        );
    }

    // Radial scan lines; their reach breathes with loudness.
    let scan_phase = now * SCAN_SPEED;
    let scan_outer = r_inner_frame * (0.9 + 0.2 * amp_visual);
    for i in 0..SCAN_LINE_COUNT {
        let angle = scan_phase + TAU * i as f64 / SCAN_LINE_COUNT as f64;
        let (sin, cos) = angle.sin_cos();
        stroke_line(
            ctx,
            cx + core_radius * 1.05 * cos,
            cy + core_radius * 1.05 * sin,
            cx + scan_outer * cos,
            cy + scan_outer * sin,
            strokes.scan_line,
            inner_color,
        );
    }

    // Sweeping beam, brightened theme color.
    let sweep_angle = now * SWEEP_SPEED;
    stroke_arc(
        ctx,
        cx,
        cy,
        r_outer_frame * 1.02,
        sweep_angle,
        sweep_angle + SWEEP_SPAN,
        strokes.sweep,
        inner_color.brighten(0.4),
    );

    // Orbiting marker dot between dim and bright variants.
    let orbit_radius = r_inner_frame * 1.1;
    let orbit_angle = now * ORBIT_SPEED;
    let orb_color = inner_color
        .brighten(0.2)
        .mix(inner_color.brighten(0.7), amp_visual);
    fill_dot(
        ctx,
        cx + orbit_radius * orbit_angle.cos(),
        cy + orbit_radius * orbit_angle.sin(),
        strokes.orbit_dot_radius,
        orb_color,
    );

    // Micro-dots at staggered radii texture the core.
    for i in 0..MICRO_DOT_COUNT {
        let angle = now * MICRO_DOT_SPEED + i as f64 * TAU / MICRO_DOT_COUNT as f64;
        let r = core_radius * (0.3 + 0.5 * ((i % 3) as f64 / 2.0));
        fill_dot(
            ctx,
            cx + r * angle.cos(),
            cy + r * angle.sin(),
            strokes.micro_dot_radius,
            inner_color,
        );
    }

    // Voice pulses expand from the core and fade into the frame color.
    let pulse_start = core_radius * 1.2;
    let pulse_end = r_outer_frame * 0.95;
    for &created in pulses {
        let age = now - created;
        if !(0.0..=PULSE_LIFETIME).contains(&age) {
            continue;
        }
        let progress = age / PULSE_LIFETIME;
        let radius = pulse_start + progress * (pulse_end - pulse_start);
        let color = inner_color.mix(FRAME_CYAN_SOFT, progress);
        stroke_circle(ctx, cx, cy, radius, strokes.pulse, color);
    }
}
