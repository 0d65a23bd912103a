//! Per-frame render context threaded through every draw call.
//!
//! All size-derived values are percentages of the current frame, recomputed
//! whenever the terminal is resized; nothing here is a fixed pixel constant.

use crate::geometry::Viewpoint;
use crate::theme::ThemeId;
use ratatui::layout::Rect;

/// Braille subpixels per terminal cell, horizontal and vertical.
const CELL_PX_X: f64 = 2.0;
const CELL_PX_Y: f64 = 4.0;

/// Sphere radius as a share of the smaller canvas dimension.
const SPHERE_RADIUS_SHARE: f64 = 0.32;

/// Field of view scales with the sphere for a consistent depth feel.
const FOV_FACTOR: f64 = 2.3;

/// HUD base size as a share of the smaller canvas dimension.
const HUD_BASE_SHARE: f64 = 0.12;

#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// Canvas size in braille pixel units.
    pub width: f64,
    pub height: f64,
    pub theme: ThemeId,
    pub bold: bool,
}

impl RenderContext {
    pub fn new(area: Rect, theme: ThemeId, bold: bool) -> Self {
        Self {
            width: f64::from(area.width) * CELL_PX_X,
            height: f64::from(area.height) * CELL_PX_Y,
            theme,
            bold,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    fn min_dimension(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn sphere_radius(&self) -> f64 {
        self.min_dimension() * SPHERE_RADIUS_SHARE
    }

    pub fn fov(&self) -> f64 {
        self.sphere_radius() * FOV_FACTOR
    }

    /// HUD base length; every ring radius is a multiple of this.
    pub fn hud_base(&self) -> f64 {
        self.min_dimension() * HUD_BASE_SHARE
    }

    pub fn viewpoint(&self, yaw: f64, pitch: f64) -> Viewpoint {
        let (cx, cy) = self.center();
        Viewpoint {
            yaw,
            pitch,
            sphere_radius: self.sphere_radius(),
            fov: self.fov(),
            center_x: cx,
            center_y: cy,
        }
    }

    pub fn strokes(&self) -> Strokes {
        if self.bold {
            Strokes::BOLD
        } else {
            Strokes::NORMAL
        }
    }
}

/// Stroke widths (passes) and dot radii for every HUD element.
///
/// Bold mode widens strokes uniformly for legibility; radii and colors are
/// untouched by the toggle.
#[derive(Debug, Clone, Copy)]
pub struct Strokes {
    pub glow_ring: u16,
    pub outer_ring: u16,
    pub inner_ring: u16,
    pub gap_arc: u16,
    pub core_outline: u16,
    pub flicker_ring: u16,
    pub polygon: u16,
    pub arc_ring: u16,
    pub tick: u16,
    pub scan_line: u16,
    pub sweep: u16,
    pub pulse: u16,
    pub micro_dot_radius: f64,
    pub orbit_dot_radius: f64,
}

impl Strokes {
    pub const NORMAL: Strokes = Strokes {
        glow_ring: 1,
        outer_ring: 2,
        inner_ring: 1,
        gap_arc: 2,
        core_outline: 3,
        flicker_ring: 1,
        polygon: 1,
        arc_ring: 2,
        tick: 1,
        scan_line: 1,
        sweep: 3,
        pulse: 2,
        micro_dot_radius: 1.0,
        orbit_dot_radius: 2.5,
    };

    pub const BOLD: Strokes = Strokes {
        glow_ring: 2,
        outer_ring: 5,
        inner_ring: 3,
        gap_arc: 3,
        core_outline: 6,
        flicker_ring: 3,
        polygon: 3,
        arc_ring: 4,
        tick: 2,
        scan_line: 2,
        sweep: 6,
        pulse: 4,
        micro_dot_radius: 1.5,
        orbit_dot_radius: 3.5,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeId;

    fn context(width: u16, height: u16) -> RenderContext {
        RenderContext::new(Rect::new(0, 0, width, height), ThemeId::OrangeGold, false)
    }

    #[test]
    fn layout_scales_with_the_frame() {
        let small = context(80, 24);
        let large = context(200, 60);
        assert!(large.sphere_radius() > small.sphere_radius());
        assert!(large.hud_base() > small.hud_base());
        assert!((small.fov() - small.sphere_radius() * FOV_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn sphere_radius_tracks_smaller_dimension() {
        let wide = context(400, 24);
        let tall = context(24, 400);
        // 24 rows = 96 px vertical, 24 cols = 48 px horizontal.
        assert!((wide.sphere_radius() - 96.0 * SPHERE_RADIUS_SHARE).abs() < 1e-9);
        assert!((tall.sphere_radius() - 48.0 * SPHERE_RADIUS_SHARE).abs() < 1e-9);
    }

    #[test]
    fn bold_changes_strokes_not_geometry() {
        let normal = context(80, 24);
        let bold = RenderContext::new(Rect::new(0, 0, 80, 24), ThemeId::OrangeGold, true);
        assert_eq!(normal.sphere_radius(), bold.sphere_radius());
        assert_eq!(normal.hud_base(), bold.hud_base());
        assert!(bold.strokes().outer_ring > normal.strokes().outer_ring);
    }

    #[test]
    fn viewpoint_is_centered() {
        let ctx = context(100, 40);
        let view = ctx.viewpoint(0.0, 0.0);
        assert_eq!(view.center_x, ctx.width / 2.0);
        assert_eq!(view.center_y, ctx.height / 2.0);
    }
}
