use glam::Vec3;
use position::PieceKind;

use crate::{
    camera::CameraProjector,
    geom::{BoundingBox2D, Transform},
    pool::BoardGeometry,
    proxy::ProxyGeometry,
};

/// One detector label: class plus normalized box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Label {
    pub class_id: u8,
    pub bbox: BoundingBox2D,
}

/// Approximates a piece by an upright tapered cylinder and boxes its projected outline.
#[derive(Clone, Copy, Debug)]
pub struct BoundingBoxProjector {
    pub render_width: f32,
    pub render_height: f32,
}

impl BoundingBoxProjector {
    pub fn new(render_width: u32, render_height: u32) -> Self {
        Self {
            render_width: render_width as f32,
            render_height: render_height as f32,
        }
    }

    /// The eight world points standing in for the piece: a base ring and a narrower top ring,
    /// both aligned with the board's own axes.
    pub fn proxy_points(
        proxy: &ProxyGeometry,
        transform: &Transform,
        board: &BoardGeometry,
    ) -> [Vec3; 8] {
        let size = proxy.local.transformed(transform).size();
        let base = transform.translation;
        let height = size.max_element();
        let radius = 0.9 * size.min_element() / 2.0;
        let top_radius = 0.75 * radius;

        let forward = board.forward();
        let right = board.right();
        let top = base + Vec3::Y * height;

        [
            base + forward * radius,
            base - forward * radius,
            base + right * radius,
            base - right * radius,
            top + forward * top_radius,
            top - forward * top_radius,
            top + right * top_radius,
            top - right * top_radius,
        ]
    }

    pub fn project<C: CameraProjector + ?Sized>(
        &self,
        kind: PieceKind,
        proxy: &ProxyGeometry,
        transform: &Transform,
        board: &BoardGeometry,
        camera: &C,
    ) -> Option<Label> {
        let points = Self::proxy_points(proxy, transform, board);
        let bbox = self.screen_box(&points, camera)?;
        Some(Label {
            class_id: kind.class_id(),
            bbox,
        })
    }

    /// Boxes the points that are in front of the camera.
    ///
    /// Returns `None` when no point is in front, or when the box center leaves the image; width
    /// and height are clamped but the center is never pulled back in.
    pub fn screen_box<C: CameraProjector + ?Sized>(
        &self,
        points: &[Vec3],
        camera: &C,
    ) -> Option<BoundingBox2D> {
        let (min, max) = points
            .iter()
            .map(|p| camera.world_to_screen(*p))
            .filter(|s| s.z > 0.0)
            .fold(None, |acc: Option<(Vec3, Vec3)>, s| match acc {
                None => Some((s, s)),
                Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
            })?;

        let cx = (min.x + max.x) / 2.0 / self.render_width;
        let cy = 1.0 - (min.y + max.y) / 2.0 / self.render_height;
        let w = (max.x - min.x) / self.render_width;
        let h = (max.y - min.y) / self.render_height;

        if !(0.0..=1.0).contains(&cx) || !(0.0..=1.0).contains(&cy) {
            return None;
        }

        Some(BoundingBox2D::new(
            cx.clamp(0.0, 1.0),
            cy.clamp(0.0, 1.0),
            w.clamp(0.0, 1.0),
            h.clamp(0.0, 1.0),
        ))
    }
}
