use glam::{Quat, Vec3};

/// Normalized YOLO box: center and size as fractions of the image, origin top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox2D {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox2D {
    pub fn new(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self { cx, cy, w, h }
    }
}

/// Translation, rotation and scale of an object in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.translation + self.transform_vector(p)
    }

    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.rotation * (v * self.scale)
    }
}

/// Axis-aligned box given by its corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// World-space box enclosing this local box under `t`.
    ///
    /// Each local half-axis is carried through the transform and the absolute components summed,
    /// so a rotated box grows rather than being fitted tightly.
    pub fn transformed(&self, t: &Transform) -> Aabb {
        let center = t.transform_point(self.center());
        let e = self.extents();
        let ax = t.transform_vector(Vec3::new(e.x, 0.0, 0.0)).abs();
        let ay = t.transform_vector(Vec3::new(0.0, e.y, 0.0)).abs();
        let az = t.transform_vector(Vec3::new(0.0, 0.0, e.z)).abs();
        Aabb::from_center_extents(center, ax + ay + az)
    }
}
