use glam::{Mat4, Quat, Vec3, Vec4};
use rand::Rng;

use crate::config::CameraJitter;

/// Maps a world point to `(screen_x, screen_y, depth)`.
///
/// Screen coordinates are pixels with the origin at the bottom-left corner; depth is the distance
/// in front of the camera along its view axis and is non-positive behind it.
pub trait CameraProjector {
    fn world_to_screen(&self, world: Vec3) -> Vec3;
}

impl<F> CameraProjector for F
where
    F: Fn(Vec3) -> Vec3,
{
    fn world_to_screen(&self, world: Vec3) -> Vec3 {
        self(world)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PinholeCamera {
    view: Mat4,
    view_proj: Mat4,
    width: f32,
    height: f32,
}

impl PinholeCamera {
    /// `dir` and `up` need not be unit length.
    pub fn new(eye: Vec3, dir: Vec3, up: Vec3, fov_y_deg: f32, width: u32, height: u32) -> Self {
        let dir = dir.normalize_or(Vec3::NEG_Z);
        let up = up.normalize_or(Vec3::Y);
        let view = Mat4::look_to_rh(eye, dir, up);
        let aspect = width as f32 / height as f32;
        let proj = Mat4::perspective_rh(fov_y_deg.to_radians(), aspect, 0.01, 100.0);
        Self {
            view,
            view_proj: proj * view,
            width: width as f32,
            height: height as f32,
        }
    }

    /// A seated player's view of the board at `target`.
    ///
    /// Picks the white or black side, then perturbs distance, eye height and azimuth, tilts the
    /// gaze down by 5..15 degrees plus a little head pitch and roll.
    pub fn random_viewpoint<R: Rng + ?Sized>(
        rng: &mut R,
        target: Vec3,
        jitter: &CameraJitter,
        width: u32,
        height: u32,
    ) -> Self {
        let white_side = rng.random_bool(0.5);
        let base_distance = rng.random_range(jitter.min_distance..=jitter.max_distance);
        let base_height = rng.random_range(jitter.min_height..=jitter.max_height);
        let base_angle: f32 = if white_side { 90.0 } else { 270.0 };

        let distance = base_distance + rng.random_range(-0.3..=0.3);
        let eye_height = base_height + rng.random_range(-0.2..=0.2);
        let angle = (base_angle + rng.random_range(-10.0..=10.0)).to_radians();

        let eye = Vec3::new(
            target.x + angle.cos() * distance,
            eye_height,
            target.z + angle.sin() * distance,
        );

        let mut dir = (target - eye).normalize_or(Vec3::NEG_Y);
        let right = dir.cross(Vec3::Y).normalize_or(Vec3::X);
        let pitch = rng.random_range(5.0f32..=15.0) + rng.random_range(-5.0f32..=5.0);
        dir = Quat::from_axis_angle(right, -pitch.to_radians()) * dir;

        let roll = rng.random_range(-2.0f32..=2.0).to_radians();
        let up = Quat::from_axis_angle(dir, roll) * right.cross(dir);

        Self::new(eye, dir, up, jitter.fov_y_deg, width, height)
    }

    pub fn resolution(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

impl CameraProjector for PinholeCamera {
    fn world_to_screen(&self, world: Vec3) -> Vec3 {
        let depth = -(self.view.transform_point3(world)).z;
        let clip = self.view_proj * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w.abs() < 1e-6 {
            return Vec3::new(0.0, 0.0, depth);
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Vec3::new(
            (ndc_x + 1.0) * 0.5 * self.width,
            (ndc_y + 1.0) * 0.5 * self.height,
            depth,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};

    impl PinholeCamera {
        fn looking_at(eye: Vec3, target: Vec3, fov_y_deg: f32, width: u32, height: u32) -> Self {
            Self::new(eye, target - eye, Vec3::Y, fov_y_deg, width, height)
        }

        fn eye(&self) -> Vec3 {
            self.view.inverse().transform_point3(Vec3::ZERO)
        }
    }

    #[test]
    fn target_lands_in_the_middle() {
        let cam = PinholeCamera::looking_at(Vec3::new(0.0, 2.0, 2.0), Vec3::ZERO, 60.0, 640, 480);
        let p = cam.world_to_screen(Vec3::ZERO);
        assert!((p.x - 320.0).abs() < 1e-3);
        assert!((p.y - 240.0).abs() < 1e-3);
        assert!((p.z - 8.0f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn view_direction_length_does_not_matter() {
        let eye = Vec3::new(0.3, 1.5, 2.0);
        let dir = Vec3::new(-0.1, -0.6, -1.0);
        let unit = PinholeCamera::new(eye, dir.normalize(), Vec3::Y, 50.0, 320, 240);
        let long = PinholeCamera::new(eye, dir * 7.5, Vec3::Y * 3.0, 50.0, 320, 240);
        for p in [Vec3::ZERO, Vec3::new(0.2, 0.75, -0.2), Vec3::new(-1.0, 0.0, 0.5)] {
            let a = unit.world_to_screen(p);
            let b = long.world_to_screen(p);
            assert!((a - b).length() < 1e-3, "{a} vs {b}");
        }
        assert!((long.eye() - eye).length() < 1e-4);
    }

    #[test]
    fn screen_y_grows_upwards() {
        let cam = PinholeCamera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60.0, 512, 512);
        let low = cam.world_to_screen(Vec3::new(0.0, -1.0, 0.0));
        let high = cam.world_to_screen(Vec3::new(0.0, 1.0, 0.0));
        assert!(high.y > low.y);
        let left = cam.world_to_screen(Vec3::new(-1.0, 0.0, 0.0));
        assert!(left.x < 256.0);
    }

    #[test]
    fn points_behind_have_negative_depth() {
        let cam = PinholeCamera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 60.0, 512, 512);
        assert!(cam.world_to_screen(Vec3::new(0.0, 0.0, 10.0)).z < 0.0);
        assert!(cam.world_to_screen(Vec3::new(0.0, 0.0, -10.0)).z > 0.0);
    }

    #[test]
    fn random_viewpoints_see_the_board() {
        let mut rng = SmallRng::seed_from_u64(11);
        let target = Vec3::new(0.0, 0.75, 0.0);
        let jitter = CameraJitter::default();
        for _ in 0..100 {
            let cam = PinholeCamera::random_viewpoint(&mut rng, target, &jitter, 512, 512);
            let p = cam.world_to_screen(target);
            assert!(p.z > 0.0);
            assert!(p.x > 0.0 && p.x < 512.0, "x = {}", p.x);
            assert!(p.y > 0.0 && p.y < 512.0, "y = {}", p.y);
            assert!((cam.eye().y - 1.6).abs() <= 0.4 + 1e-4);
        }
    }

    #[test]
    fn closures_are_projectors() {
        let flat = |p: Vec3| Vec3::new(p.x, p.z, 1.0);
        assert_eq!(flat.world_to_screen(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 3.0, 1.0));
    }
}
