use anyhow::{Context, anyhow};
use log::{debug, info};
use rand::{RngCore, SeedableRng, rngs::SmallRng};
use rand_xoshiro::SplitMix64;

use crate::{
    camera::CameraProjector,
    config::{ConfigError, GenConfig},
    io::{self, DatasetWriter},
    project::{BoundingBoxProjector, Label},
    record::{DatasetRecord, JsonRecord},
    render::Renderer,
    scene::SceneContext,
    split::{Split, SplitPlan},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub images: u32,
    pub boxes: usize,
    /// Images saved with an empty label file.
    pub empty_images: u32,
}

/// Drives the per-image loop: scene, render, label, write.
pub struct DatasetOrchestrator<R: Renderer> {
    config: GenConfig,
    plan: SplitPlan,
    master_seed: u64,
    seeder: SplitMix64,
    scene: SceneContext,
    renderer: R,
    projector: BoundingBoxProjector,
    writer: DatasetWriter,
}

impl<R: Renderer> DatasetOrchestrator<R> {
    /// Validates the configuration; nothing touches the disk until [`Self::run`].
    pub fn new(config: GenConfig, renderer: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let plan = SplitPlan::for_run(config.total_images, config.train_split, config.valid_split)?;
        let master_seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self {
            plan,
            master_seed,
            seeder: SplitMix64::seed_from_u64(master_seed),
            scene: SceneContext::from_config(&config),
            renderer,
            projector: BoundingBoxProjector::new(config.render_width, config.render_height),
            writer: DatasetWriter::new(&config.out_dir, config.jpeg_quality),
            config,
        })
    }

    pub fn run(&mut self) -> anyhow::Result<DatasetSummary> {
        info!(
            "generating {} images into {} (train {}, valid {}, test {}, seed {})",
            self.plan.total(),
            self.writer.out_dir().display(),
            self.plan.train,
            self.plan.valid,
            self.plan.test,
            self.master_seed
        );
        self.writer.init_output(self.config.clean_output)?;
        self.writer
            .write_dataset_record(&DatasetRecord::new(self.plan, self.master_seed))?;

        let plan = self.plan;
        let mut summary = DatasetSummary::default();
        for (split, count) in plan.iter() {
            if count == 0 {
                continue;
            }
            info!("{split}: {count} images");
            self.generate_split(split, count, &mut summary)?;
        }
        self.writer.finalize_output()?;

        for (i, rig) in self.scene.rigs.iter().enumerate() {
            debug!("board {i}: {} piece instances allocated", rig.pool.total_allocated());
        }
        info!(
            "dataset complete: {} images, {} boxes, {} without labels",
            summary.images, summary.boxes, summary.empty_images
        );
        Ok(summary)
    }

    fn generate_split(
        &mut self,
        split: Split,
        count: u32,
        summary: &mut DatasetSummary,
    ) -> anyhow::Result<()> {
        for index in 0..count {
            let boxes = self
                .generate_sample(split, index)
                .with_context(|| format!("{split} image {index:06}"))?;
            summary.images += 1;
            summary.boxes += boxes;
            if boxes == 0 {
                summary.empty_images += 1;
            }
            if self.config.release_every > 0 && index % self.config.release_every == 0 {
                self.renderer.release_transient();
            }
        }
        Ok(())
    }

    /// Builds, renders and writes one image; returns the number of boxes written.
    pub fn generate_sample(&mut self, split: Split, index: u32) -> anyhow::Result<usize> {
        let seed = self.seeder.next_u64();
        let mut rng = SmallRng::seed_from_u64(seed);
        let sample = self.scene.randomize(&mut rng);

        let state = self
            .scene
            .snapshot(seed, self.config.render_width, self.config.render_height)
            .ok_or_else(|| anyhow!("no board to render"))?;
        let frame = self.renderer.render(&state)?;
        let labels = self.label_active(frame.camera.as_ref());

        self.writer.save_jpeg(split, index, &frame.image)?;
        self.writer.write_labels(split, index, &labels)?;
        self.writer.append_record(
            split,
            &JsonRecord {
                schema: "v1",
                image: format!("images/{}", io::image_name(index)),
                label: format!("labels/{}", io::label_name(index)),
                seed,
                fen: sample.fen.clone(),
                board: sample.board_index,
                pieces: sample.pieces,
                boxes: labels.len(),
            },
        )?;

        debug!(
            "{split}/{index:06}: seed {seed:#018x}, board {}, {} pieces, {} boxes, {}",
            sample.board_index,
            sample.pieces,
            labels.len(),
            sample.fen
        );
        Ok(labels.len())
    }

    /// One label per active piece that has a box in this camera.
    pub fn label_active(&self, camera: &dyn CameraProjector) -> Vec<Label> {
        let Some(rig) = self.scene.active_rig() else {
            return Vec::new();
        };
        rig.pool
            .active()
            .filter_map(|handle| {
                let proxy = rig.catalog.get(handle.kind)?;
                self.projector
                    .project(handle.kind, proxy, &handle.transform, &rig.geometry, camera)
            })
            .collect()
    }
}
