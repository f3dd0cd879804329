use glam::Vec3;
use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_polygon_mut, geometry::convex_hull, point::Point};
use position::{Color, PieceKind};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    camera::{CameraProjector, PinholeCamera},
    config::CameraJitter,
    geom::Transform,
    pool::BoardGeometry,
    project::BoundingBoxProjector,
    proxy::ProxyGeometry,
};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot render a {width}x{height} frame")]
    Degenerate { width: u32, height: u32 },
}

#[derive(Clone, Debug)]
pub struct PieceView {
    pub kind: PieceKind,
    pub transform: Transform,
    pub proxy: ProxyGeometry,
}

/// Everything a renderer needs to draw one frame.
#[derive(Clone, Debug)]
pub struct SceneState {
    /// Per-image seed; renderers derive their own randomization from it.
    pub seed: u64,
    pub board: BoardGeometry,
    pub pieces: Vec<PieceView>,
    pub width: u32,
    pub height: u32,
}

pub struct RenderedFrame {
    pub image: RgbImage,
    pub camera: Box<dyn CameraProjector>,
}

pub trait Renderer {
    fn render(&mut self, scene: &SceneState) -> Result<RenderedFrame, RenderError>;

    /// Hook for dropping caches between batches of images.
    fn release_transient(&mut self) {}
}

const CAMERA_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Flat-shaded software preview: checkerboard plus piece silhouettes from a random seat.
pub struct PreviewRenderer {
    pub camera: CameraJitter,
}

impl PreviewRenderer {
    pub fn new(camera: CameraJitter) -> Self {
        Self { camera }
    }

    fn draw_board(
        img: &mut RgbImage,
        board: &BoardGeometry,
        camera: &PinholeCamera,
        light: f32,
        rng: &mut SmallRng,
    ) {
        let dark = shade([rng.random_range(60..110), rng.random_range(40..80), 30], light);
        let bright = shade([rng.random_range(200..240), rng.random_range(180..220), 160], light);
        let sq = board.square_size();

        for rank in 0..8 {
            for file in 0..8 {
                let corner = |df: f32, dr: f32| {
                    board.top_left + Vec3::new(sq.x * (file as f32 + df), 0.0, sq.z * (rank as f32 + dr))
                };
                let quad = [
                    corner(0.0, 0.0),
                    corner(1.0, 0.0),
                    corner(1.0, 1.0),
                    corner(0.0, 1.0),
                ];
                let color = if (file + rank) % 2 == 0 { dark } else { bright };
                fill_outline(img, camera, &quad, color);
            }
        }
    }
}

impl Renderer for PreviewRenderer {
    fn render(&mut self, scene: &SceneState) -> Result<RenderedFrame, RenderError> {
        if scene.width == 0 || scene.height == 0 {
            return Err(RenderError::Degenerate {
                width: scene.width,
                height: scene.height,
            });
        }

        let mut rng = SmallRng::seed_from_u64(scene.seed ^ CAMERA_STREAM);
        let camera = PinholeCamera::random_viewpoint(
            &mut rng,
            scene.board.center(),
            &self.camera,
            scene.width,
            scene.height,
        );

        let sky = [
            rng.random_range(90..200),
            rng.random_range(90..200),
            rng.random_range(90..220),
        ];
        let mut img = RgbImage::from_pixel(scene.width, scene.height, Rgb(sky));
        let light = rng.random_range(1.0..=1.5);

        Self::draw_board(&mut img, &scene.board, &camera, light, &mut rng);

        let mut pieces: Vec<(&PieceView, f32)> = scene
            .pieces
            .iter()
            .map(|p| (p, camera.world_to_screen(p.transform.translation).z))
            .collect();
        pieces.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (piece, _) in pieces {
            let outline =
                BoundingBoxProjector::proxy_points(&piece.proxy, &piece.transform, &scene.board);
            let base = match piece.kind.color {
                Color::White => [215, 205, 185],
                Color::Black => [45, 40, 38],
            };
            fill_outline(&mut img, &camera, &outline, shade(base, light));
        }

        Ok(RenderedFrame {
            image: img,
            camera: Box::new(camera),
        })
    }
}

fn shade(rgb: [u8; 3], light: f32) -> Rgb<u8> {
    Rgb(rgb.map(|c| (c as f32 * light).min(255.0) as u8))
}

/// Fills the convex hull of the projected points; skipped if any point is behind the camera.
fn fill_outline(img: &mut RgbImage, camera: &PinholeCamera, points: &[Vec3], color: Rgb<u8>) {
    let (w, h) = camera.resolution();
    let limit = 4.0 * w.max(h);
    let mut pixels = Vec::with_capacity(points.len());
    for p in points {
        let s = camera.world_to_screen(*p);
        if s.z <= 0.0 {
            return;
        }
        let x = s.x.clamp(-limit, limit).round() as i32;
        let y = (h - s.y).clamp(-limit, limit).round() as i32;
        pixels.push(Point::new(x, y));
    }
    pixels.sort_by_key(|p| (p.x, p.y));
    pixels.dedup();

    let hull = convex_hull(pixels.as_slice());
    if hull.len() >= 3 && hull.first() != hull.last() {
        draw_polygon_mut(img, &hull, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxyCatalog;
    use glam::Quat;

    fn scene(seed: u64) -> SceneState {
        let board = BoardGeometry::new(Vec3::new(-0.2, 0.75, -0.2), Vec3::new(0.2, 0.75, 0.2), 0.0);
        let catalog = ProxyCatalog::standard(board.square_width());
        let pieces = [PieceKind::WHITE_KING, PieceKind::BLACK_KING]
            .into_iter()
            .enumerate()
            .map(|(i, kind)| PieceView {
                kind,
                transform: Transform::from_translation_rotation(
                    board.cell_center(4, (i * 7) as u8),
                    Quat::IDENTITY,
                ),
                proxy: *catalog.get(kind).unwrap(),
            })
            .collect();
        SceneState {
            seed,
            board,
            pieces,
            width: 96,
            height: 64,
        }
    }

    #[test]
    fn frame_has_requested_size() {
        let mut renderer = PreviewRenderer::new(CameraJitter::default());
        let frame = renderer.render(&scene(1)).unwrap();
        assert_eq!(frame.image.dimensions(), (96, 64));
        let center = frame.camera.world_to_screen(Vec3::new(0.0, 0.75, 0.0));
        assert!(center.z > 0.0);
    }

    #[test]
    fn same_seed_same_pixels() {
        let mut renderer = PreviewRenderer::new(CameraJitter::default());
        let a = renderer.render(&scene(3)).unwrap().image;
        let b = renderer.render(&scene(3)).unwrap().image;
        assert_eq!(a, b);
    }

    #[test]
    fn zero_sized_frames_fail() {
        let mut renderer = PreviewRenderer::new(CameraJitter::default());
        let mut s = scene(0);
        s.width = 0;
        assert!(matches!(
            renderer.render(&s),
            Err(RenderError::Degenerate { width: 0, .. })
        ));
    }
}
