use std::collections::{HashMap, VecDeque};

use glam::{EulerRot, Quat, Vec3};
use log::warn;
use position::{PieceKind, Placement};
use rand::Rng;

use crate::{config::PlacementJitter, geom::Transform, proxy::ProxyCatalog};

/// Placement of a physical board: two opposite corners on the board plane plus its orientation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardGeometry {
    pub top_left: Vec3,
    pub bottom_right: Vec3,
    pub rotation: Quat,
}

impl BoardGeometry {
    pub fn new(top_left: Vec3, bottom_right: Vec3, yaw_deg: f32) -> Self {
        Self {
            top_left,
            bottom_right,
            rotation: Quat::from_rotation_y(yaw_deg.to_radians()),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.top_left + self.bottom_right) * 0.5
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Cell size along x and z; the vertical component is always zero.
    pub fn square_size(&self) -> Vec3 {
        let size = self.bottom_right - self.top_left;
        Vec3::new(size.x / 8.0, 0.0, size.z / 8.0)
    }

    pub fn square_width(&self) -> f32 {
        (self.bottom_right.x - self.top_left.x) / 8.0
    }

    /// World position of the middle of a display square.
    pub fn cell_center(&self, file: u8, rank: u8) -> Vec3 {
        let sq = self.square_size();
        self.top_left
            + Vec3::new(
                sq.x * (file as f32 + 0.5),
                0.0,
                sq.z * (rank as f32 + 0.5),
            )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(usize);

/// A reusable piece instance; its kind is fixed at creation.
#[derive(Clone, Debug)]
pub struct PieceHandle {
    pub kind: PieceKind,
    pub transform: Transform,
    pub active: bool,
}

/// Arena of piece instances with per-kind recycling.
///
/// Handles are never freed while the pool lives; deactivation puts them back in their kind's queue.
#[derive(Debug, Default)]
pub struct PiecePlacementPool {
    handles: Vec<PieceHandle>,
    pooled: HashMap<PieceKind, VecDeque<HandleId>>,
    active: Vec<HandleId>,
}

impl PiecePlacementPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current scene with `placements`, reusing pooled instances first.
    ///
    /// Placements whose kind has no proxy model are skipped.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        placements: &[Placement],
        board: &BoardGeometry,
        catalog: &ProxyCatalog,
        jitter: &PlacementJitter,
        rng: &mut R,
    ) -> &[HandleId] {
        self.deactivate_all();

        for placement in placements {
            if catalog.get(placement.kind).is_none() {
                warn!("no proxy model for {}, placement skipped", placement.kind);
                continue;
            }
            let id = self.acquire(placement.kind);
            let transform = Self::place(placement, board, jitter, rng);
            let handle = &mut self.handles[id.0];
            handle.transform = transform;
            handle.active = true;
            self.active.push(id);
        }

        &self.active
    }

    /// Returns every active instance to its kind's queue.
    pub fn deactivate_all(&mut self) {
        for id in self.active.drain(..) {
            let handle = &mut self.handles[id.0];
            handle.active = false;
            self.pooled.entry(handle.kind).or_default().push_back(id);
        }
    }

    pub fn active(&self) -> impl Iterator<Item = &PieceHandle> {
        self.active.iter().map(|id| &self.handles[id.0])
    }

    /// Number of instances ever created, active or pooled.
    pub fn total_allocated(&self) -> usize {
        self.handles.len()
    }

    fn acquire(&mut self, kind: PieceKind) -> HandleId {
        if let Some(id) = self.pooled.get_mut(&kind).and_then(VecDeque::pop_front) {
            return id;
        }
        let id = HandleId(self.handles.len());
        self.handles.push(PieceHandle {
            kind,
            transform: Transform::default(),
            active: false,
        });
        id
    }

    fn place<R: Rng + ?Sized>(
        placement: &Placement,
        board: &BoardGeometry,
        jitter: &PlacementJitter,
        rng: &mut R,
    ) -> Transform {
        let offset = Vec3::new(
            symmetric(rng, jitter.max_position_offset),
            0.0,
            symmetric(rng, jitter.max_position_offset),
        );
        let position = board.cell_center(placement.file, placement.rank) + offset;

        let yaw = symmetric(rng, jitter.max_rotation_offset).to_radians();
        let rotation = if jitter.pitch_offset != 0.0 {
            Quat::from_euler(EulerRot::YXZ, 0.0, jitter.pitch_offset.to_radians(), yaw)
        } else {
            Quat::from_rotation_y(yaw)
        };

        Transform::from_translation_rotation(position, rotation)
    }
}

/// Uniform draw in `[-bound, bound]`; zero when the bound is not positive.
fn symmetric<R: Rng + ?Sized>(rng: &mut R, bound: f32) -> f32 {
    if bound > 0.0 {
        rng.random_range(-bound..=bound)
    } else {
        0.0
    }
}
