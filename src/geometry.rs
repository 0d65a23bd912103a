//! Point-on-sphere simulation and camera projection.
//!
//! Each point lives on the unit sphere as a pair of angles plus slow,
//! per-point angular velocities. The 3D position is derived every frame:
//! angles onto a sphere of the current radius, rotated by the global
//! yaw/pitch, then pushed through a pinhole projection.

use crate::theme::Rgb;
use rand::Rng;
use std::f64::consts::PI;

/// Base point color before depth shading.
pub const POINT_GOLD: Rgb = Rgb::new(255, 215, 0);

/// Distance of the camera behind the sphere, in sphere radii.
const CAMERA_OFFSET: f64 = 2.2;

/// Per-point angular velocity bounds, radians per second.
const AZIMUTH_SPEED_RANGE: f64 = 0.4;
const POLAR_SPEED_RANGE: f64 = 0.25;

/// A single point drifting on the sphere surface.
#[derive(Debug, Clone)]
pub struct SpherePoint {
    pub azimuth: f64,
    pub polar: f64,
    d_azimuth: f64,
    d_polar: f64,
}

/// Camera/view parameters for one frame, all in canvas pixel units.
#[derive(Debug, Clone, Copy)]
pub struct Viewpoint {
    pub yaw: f64,
    pub pitch: f64,
    pub sphere_radius: f64,
    pub fov: f64,
    pub center_x: f64,
    pub center_y: f64,
}

/// Screen-space result of projecting one point.
#[derive(Debug, Clone, Copy)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Rgb,
    pub depth: f64,
}

impl SpherePoint {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            azimuth: rng.gen_range(0.0..2.0 * PI),
            polar: rng.gen_range(0.0..PI),
            d_azimuth: rng.gen_range(-AZIMUTH_SPEED_RANGE..AZIMUTH_SPEED_RANGE),
            d_polar: rng.gen_range(-POLAR_SPEED_RANGE..POLAR_SPEED_RANGE),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_velocity(polar: f64, d_polar: f64) -> Self {
        Self {
            azimuth: 0.0,
            polar,
            d_azimuth: 0.0,
            d_polar,
        }
    }

    /// Advance the angular position by `dt` seconds.
    ///
    /// The polar angle is reflected back into [0, PI] with its velocity sign
    /// flipped, so points bounce at the poles instead of wrapping through.
    pub fn advance(&mut self, dt: f64) {
        self.azimuth += self.d_azimuth * dt;
        self.polar += self.d_polar * dt;

        // Reflection loop keeps the invariant even for very large dt.
        loop {
            if self.polar < 0.0 {
                self.polar = -self.polar;
                self.d_polar = -self.d_polar;
            } else if self.polar > PI {
                self.polar = 2.0 * PI - self.polar;
                self.d_polar = -self.d_polar;
            } else {
                break;
            }
        }
    }

    /// Rotated camera-space position for the current view.
    fn rotated(&self, view: &Viewpoint) -> (f64, f64, f64) {
        let r = view.sphere_radius;
        let x = r * self.polar.sin() * self.azimuth.cos();
        let y = r * self.polar.cos();
        let z = r * self.polar.sin() * self.azimuth.sin();

        // Yaw around the vertical axis, then pitch around the horizontal.
        let (sin_y, cos_y) = view.yaw.sin_cos();
        let xz = x * cos_y + z * sin_y;
        let zz = -x * sin_y + z * cos_y;

        let (sin_x, cos_x) = view.pitch.sin_cos();
        let yz = y * cos_x - zz * sin_x;
        let zz = y * sin_x + zz * cos_x;

        (xz, yz, zz)
    }

    /// Project to screen space with depth-derived size and brightness.
    pub fn project(&self, view: &Viewpoint) -> Projected {
        let (x, y, z) = self.rotated(view);

        // Clamp avoids a divide-by-zero blowup when a point grazes the camera.
        let z_cam = (z + view.sphere_radius * CAMERA_OFFSET).max(1.0);
        let factor = view.fov / z_cam;

        let depth = (1.0 - z_cam / (view.sphere_radius * 3.0)).clamp(0.0, 1.0);
        let radius = (1.0 + depth * 3.0).max(2.0);
        let brightness = 0.5 + depth * 0.7;

        Projected {
            x: view.center_x + x * factor,
            y: view.center_y + y * factor,
            radius,
            color: POINT_GOLD.scale(brightness),
            depth,
        }
    }

    /// Camera-space depth used for back-to-front ordering.
    pub fn sort_key(&self, view: &Viewpoint) -> f64 {
        self.rotated(view).2
    }
}

/// Order points farthest-first so nearer points occlude by paint order.
/// Larger camera-space z means farther from the camera here.
pub fn depth_sort(points: &mut [SpherePoint], view: &Viewpoint) {
    points.sort_by(|a, b| {
        b.sort_key(view)
            .partial_cmp(&a.sort_key(view))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn view() -> Viewpoint {
        Viewpoint {
            yaw: 0.3,
            pitch: 0.1,
            sphere_radius: 100.0,
            fov: 230.0,
            center_x: 160.0,
            center_y: 120.0,
        }
    }

    #[test]
    fn polar_stays_in_range_under_small_steps() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut points: Vec<_> = (0..64).map(|_| SpherePoint::random(&mut rng)).collect();
        for _ in 0..10_000 {
            for p in &mut points {
                p.advance(1.0 / 60.0);
                assert!((0.0..=PI).contains(&p.polar), "polar {} out of range", p.polar);
            }
        }
    }

    #[test]
    fn polar_stays_in_range_under_large_steps() {
        let mut p = SpherePoint::with_velocity(0.5, 0.25);
        for dt in [3.0, 47.0, 1000.0, 12345.6] {
            p.advance(dt);
            assert!((0.0..=PI).contains(&p.polar));
        }
    }

    #[test]
    fn reflection_flips_velocity_sign() {
        let mut p = SpherePoint::with_velocity(PI - 0.01, 0.25);
        p.advance(1.0);
        assert!(p.polar <= PI);
        // The point crossed the pole, so it must now move back.
        let before = p.polar;
        p.advance(0.1);
        assert!(p.polar < before);
    }

    #[test]
    fn depth_is_clamped_and_scales_size() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let view = view();
        for _ in 0..256 {
            let p = SpherePoint::random(&mut rng);
            let proj = p.project(&view);
            assert!((0.0..=1.0).contains(&proj.depth));
            assert!(proj.radius >= 2.0 && proj.radius <= 4.0);
        }
    }

    #[test]
    fn near_camera_projection_is_finite() {
        // A view small enough that the clamp path is exercised.
        let view = Viewpoint {
            sphere_radius: 0.1,
            ..view()
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        for _ in 0..64 {
            let proj = SpherePoint::random(&mut rng).project(&view);
            assert!(proj.x.is_finite() && proj.y.is_finite());
        }
    }

    #[test]
    fn depth_sort_orders_far_to_near() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(23);
        let view = view();
        let mut points: Vec<_> = (0..128).map(|_| SpherePoint::random(&mut rng)).collect();
        depth_sort(&mut points, &view);
        let depths: Vec<f64> = points.iter().map(|p| p.project(&view).depth).collect();
        assert!(depths.windows(2).all(|w| w[0] <= w[1]), "far points must come first");
    }
}
