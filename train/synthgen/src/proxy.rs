use std::collections::HashMap;

use glam::Vec3;
use log::warn;
use position::PieceKind;
use serde::Deserialize;

use crate::geom::Aabb;

/// Local mesh bounds of a piece model, as named in a model catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct NamedProxy {
    pub name: String,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProxyGeometry {
    /// Model-space bounds; the model origin sits on the board plane.
    pub local: Aabb,
}

/// Read-only proxy geometry for every piece kind that has a model.
#[derive(Clone, Debug, Default)]
pub struct ProxyCatalog {
    entries: HashMap<PieceKind, ProxyGeometry>,
}

impl ProxyCatalog {
    /// Cylinder-like stand-ins sized relative to a board square.
    pub fn standard(square_width: f32) -> Self {
        let radius = 0.35 * square_width.abs();
        let entries = PieceKind::all()
            .map(|kind| {
                let height = square_width.abs() * kind.role.height_multiplier();
                let local = Aabb::new(
                    Vec3::new(-radius, 0.0, -radius),
                    Vec3::new(radius, height, radius),
                );
                (kind, ProxyGeometry { local })
            })
            .collect();
        Self { entries }
    }

    /// Builds a catalog from named model bounds; names that are not pieces are skipped.
    pub fn from_named(models: &[NamedProxy]) -> Self {
        let mut entries = HashMap::new();
        for model in models {
            match PieceKind::from_name(&model.name) {
                Ok(kind) => {
                    let local = Aabb::new(Vec3::from_array(model.min), Vec3::from_array(model.max));
                    entries.insert(kind, ProxyGeometry { local });
                }
                Err(err) => warn!("skipping proxy model: {err}"),
            }
        }
        if entries.is_empty() {
            warn!("no proxy model names a piece; every placement will be skipped");
        }
        Self { entries }
    }

    pub fn get(&self, kind: PieceKind) -> Option<&ProxyGeometry> {
        self.entries.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
