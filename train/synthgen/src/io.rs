use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufWriter, Error, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use image::{RgbImage, codecs::jpeg::JpegEncoder};
use log::warn;

use crate::{
    project::Label,
    record::{self, DatasetRecord, JsonRecord},
    split::Split,
};

/// Writes images, label files and manifests under `<out>/<split>/{images,labels}`.
pub struct DatasetWriter {
    out_dir: PathBuf,
    jpeg_quality: u8,
    manifests: HashMap<Split, BufWriter<File>>,
}

pub fn image_name(index: u32) -> String {
    format!("image_{index:06}.jpg")
}

pub fn label_name(index: u32) -> String {
    format!("image_{index:06}.txt")
}

impl DatasetWriter {
    pub fn new(out_dir: impl Into<PathBuf>, jpeg_quality: u8) -> Self {
        Self {
            out_dir: out_dir.into(),
            jpeg_quality,
            manifests: HashMap::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn image_path(&self, split: Split, index: u32) -> PathBuf {
        self.out_dir
            .join(split.as_str())
            .join("images")
            .join(image_name(index))
    }

    pub fn label_path(&self, split: Split, index: u32) -> PathBuf {
        self.out_dir
            .join(split.as_str())
            .join("labels")
            .join(label_name(index))
    }

    /// Creates the split folders, wiping a previous run first when `clean` is set.
    pub fn init_output(&mut self, clean: bool) -> anyhow::Result<()> {
        if clean && self.out_dir.exists() {
            fs::remove_dir_all(&self.out_dir)
                .with_context(|| format!("removing {}", self.out_dir.display()))?;
        }
        for split in Split::ALL {
            for leaf in ["images", "labels"] {
                let dir = self.out_dir.join(split.as_str()).join(leaf);
                fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
            }
            let path = self.out_dir.join(split.as_str()).join("manifest.jsonl");
            let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            self.manifests
                .insert(split, BufWriter::with_capacity(1 << 16, file));
        }
        Ok(())
    }

    pub fn save_jpeg(&self, split: Split, index: u32, img: &RgbImage) -> anyhow::Result<()> {
        let path = self.image_path(split, index);
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut out = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut out, self.jpeg_quality)
            .encode_image(img)
            .with_context(|| format!("encoding {}", path.display()))?;
        out.flush()?;
        Ok(())
    }

    pub fn write_labels(&self, split: Split, index: u32, labels: &[Label]) -> anyhow::Result<()> {
        let path = self.label_path(split, index);
        fs::write(&path, record::label_file(labels))
            .with_context(|| format!("writing {}", path.display()))
    }

    pub fn append_record(&mut self, split: Split, rec: &JsonRecord) -> anyhow::Result<()> {
        let json = serde_json::to_string(rec)?;
        if let Some(writer) = self.manifests.get_mut(&split) {
            writeln!(writer, "{json}")?;
        }
        Ok(())
    }

    pub fn write_dataset_record(&self, rec: &DatasetRecord) -> anyhow::Result<()> {
        let path = self.out_dir.join("dataset.json");
        let json = serde_json::to_string_pretty(rec)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))
    }

    pub fn finalize_output(&mut self) -> Result<(), Error> {
        for (_, writer) in self.manifests.drain() {
            writer.into_inner()?.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for DatasetWriter {
    fn drop(&mut self) {
        if let Err(err) = self.finalize_output() {
            warn!("flushing manifests under {}: {err}", self.out_dir.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::BoundingBox2D;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("synthgen-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(image_name(42), "image_000042.jpg");
        assert_eq!(label_name(123456), "image_123456.txt");
        let writer = DatasetWriter::new("out", 90);
        assert_eq!(
            writer.label_path(Split::Valid, 7),
            Path::new("out/valid/labels/image_000007.txt")
        );
    }

    #[test]
    fn writes_layout_and_files() {
        let dir = scratch_dir("io");
        let mut writer = DatasetWriter::new(&dir, 85);
        writer.init_output(true).unwrap();
        for split in ["train", "valid", "test"] {
            assert!(dir.join(split).join("images").is_dir());
            assert!(dir.join(split).join("labels").is_dir());
        }

        let img = RgbImage::from_pixel(16, 8, image::Rgb([10, 20, 30]));
        writer.save_jpeg(Split::Test, 3, &img).unwrap();
        let decoded = image::open(writer.image_path(Split::Test, 3)).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));

        let label = Label {
            class_id: 4,
            bbox: BoundingBox2D::new(0.5, 0.5, 0.25, 0.25),
        };
        writer.write_labels(Split::Test, 3, &[label]).unwrap();
        writer.write_labels(Split::Test, 4, &[]).unwrap();
        assert_eq!(
            fs::read_to_string(writer.label_path(Split::Test, 3)).unwrap(),
            "4 0.500000 0.500000 0.250000 0.250000\n"
        );
        assert_eq!(fs::read_to_string(writer.label_path(Split::Test, 4)).unwrap(), "");

        writer
            .append_record(
                Split::Test,
                &JsonRecord {
                    schema: "v1",
                    image: "images/image_000003.jpg".into(),
                    label: "labels/image_000003.txt".into(),
                    seed: 1,
                    fen: "8/8/8/8/8/8/8/8".into(),
                    board: 0,
                    pieces: 1,
                    boxes: 1,
                },
            )
            .unwrap();
        writer.finalize_output().unwrap();
        let manifest = fs::read_to_string(dir.join("test").join("manifest.jsonl")).unwrap();
        assert_eq!(manifest.lines().count(), 1);
        assert!(manifest.contains("\"seed\":1"));

        let stale = dir.join("train").join("images").join("stale.jpg");
        fs::write(&stale, b"x").unwrap();
        let mut again = DatasetWriter::new(&dir, 85);
        again.init_output(true).unwrap();
        assert!(!stale.exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn dropping_an_unfinished_writer_flushes_manifests() {
        let dir = scratch_dir("io-drop");
        let mut writer = DatasetWriter::new(&dir, 90);
        writer.init_output(true).unwrap();
        let rec = JsonRecord {
            schema: "v1",
            image: "images/image_000000.jpg".into(),
            label: "labels/image_000000.txt".into(),
            seed: 42,
            fen: "4k3/8/8/8/8/8/8/4K3".into(),
            board: 0,
            pieces: 2,
            boxes: 0,
        };
        writer.append_record(Split::Valid, &rec).unwrap();
        drop(writer);

        let manifest = fs::read_to_string(dir.join("valid").join("manifest.jsonl")).unwrap();
        assert!(manifest.contains("\"seed\":42"));

        let mut finished = DatasetWriter::new(&dir, 90);
        finished.finalize_output().unwrap();
        drop(finished);
        fs::remove_dir_all(&dir).unwrap();
    }
}
