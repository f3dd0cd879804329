use log::{debug, warn};
use position::RandomPositionGenerator;
use rand::Rng;

use crate::{
    config::{GenConfig, PlacementJitter},
    pool::{BoardGeometry, PiecePlacementPool},
    proxy::ProxyCatalog,
    render::{PieceView, SceneState},
};

/// One physical board, the proxy sizes of its piece set and the piece instances that live on it.
#[derive(Debug)]
pub struct BoardRig {
    pub geometry: BoardGeometry,
    pub catalog: ProxyCatalog,
    pub pool: PiecePlacementPool,
}

impl BoardRig {
    pub fn new(geometry: BoardGeometry, catalog: ProxyCatalog) -> Self {
        Self {
            geometry,
            catalog,
            pool: PiecePlacementPool::new(),
        }
    }
}

/// What a call to [`SceneContext::randomize`] produced.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSample {
    pub board_index: usize,
    pub fen: String,
    pub pieces: usize,
}

/// All long-lived scene state, owned by the orchestrator and passed explicitly.
pub struct SceneContext {
    pub rigs: Vec<BoardRig>,
    pub jitter: PlacementJitter,
    pub generator: RandomPositionGenerator,
    active: usize,
}

impl SceneContext {
    pub fn new(
        rigs: Vec<BoardRig>,
        jitter: PlacementJitter,
        generator: RandomPositionGenerator,
    ) -> Self {
        Self {
            rigs,
            jitter,
            generator,
            active: 0,
        }
    }

    /// Named proxies are shared by every board; otherwise each board gets stand-ins sized from
    /// its own squares.
    pub fn from_config(cfg: &GenConfig) -> Self {
        let named = (!cfg.proxies.is_empty()).then(|| ProxyCatalog::from_named(&cfg.proxies));
        let rigs: Vec<BoardRig> = cfg
            .boards
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let geometry = BoardGeometry::new(b.top_left(), b.bottom_right(), b.yaw_deg);
                let catalog = match &named {
                    Some(catalog) => catalog.clone(),
                    None => ProxyCatalog::standard(geometry.square_width()),
                };
                if catalog.is_empty() {
                    warn!("board {i} has no piece models");
                }
                debug!(
                    "board {i}: square {:.4}, {} piece models",
                    geometry.square_width(),
                    catalog.len()
                );
                BoardRig::new(geometry, catalog)
            })
            .collect();
        Self::new(
            rigs,
            cfg.placement.clone(),
            RandomPositionGenerator::new(cfg.max_moves),
        )
    }

    /// Picks a board, clears the others and lays out a fresh random position on it.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SceneSample {
        if self.rigs.is_empty() {
            return SceneSample {
                board_index: 0,
                fen: String::new(),
                pieces: 0,
            };
        }
        self.active = rng.random_range(0..self.rigs.len());
        for (i, rig) in self.rigs.iter_mut().enumerate() {
            if i != self.active {
                rig.pool.deactivate_all();
            }
        }

        let board = self.generator.generate_board(rng);
        let placements = position::generator::placements(&board);
        let rig = &mut self.rigs[self.active];
        let pieces = rig
            .pool
            .apply(&placements, &rig.geometry, &rig.catalog, &self.jitter, rng)
            .len();

        SceneSample {
            board_index: self.active,
            fen: board.to_fen_placement(),
            pieces,
        }
    }

    pub fn active_rig(&self) -> Option<&BoardRig> {
        self.rigs.get(self.active)
    }

    /// Active pieces of the current board, with their proxy geometry.
    pub fn pieces(&self) -> Vec<PieceView> {
        let Some(rig) = self.active_rig() else {
            return Vec::new();
        };
        rig.pool
            .active()
            .filter_map(|handle| {
                rig.catalog.get(handle.kind).map(|proxy| PieceView {
                    kind: handle.kind,
                    transform: handle.transform,
                    proxy: *proxy,
                })
            })
            .collect()
    }

    pub fn snapshot(&self, seed: u64, width: u32, height: u32) -> Option<SceneState> {
        let rig = self.active_rig()?;
        Some(SceneState {
            seed,
            board: rig.geometry,
            pieces: self.pieces(),
            width,
            height,
        })
    }
}
