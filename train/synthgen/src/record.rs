use std::fmt::Write as _;

use position::PieceKind;
use serde::Serialize;

use crate::{project::Label, split::SplitPlan};

/// `classId cx cy w h` with six decimals.
pub fn label_line(label: &Label) -> String {
    let b = &label.bbox;
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        label.class_id, b.cx, b.cy, b.w, b.h
    )
}

/// Newline-terminated label lines; empty for an image without visible pieces.
pub fn label_file(labels: &[Label]) -> String {
    let mut out = String::with_capacity(labels.len() * 40);
    for label in labels {
        let _ = writeln!(out, "{}", label_line(label));
    }
    out
}

/// One line of a split's `manifest.jsonl`.
#[derive(Serialize, Debug)]
pub struct JsonRecord {
    pub schema: &'static str,
    pub image: String,
    pub label: String,
    pub seed: u64,
    pub fen: String,
    pub board: usize,
    pub pieces: usize,
    pub boxes: usize,
}

/// Dataset-level description written next to the split folders.
#[derive(Serialize, Debug)]
pub struct DatasetRecord {
    pub schema: &'static str,
    pub names: Vec<String>,
    pub nc: usize,
    pub splits: SplitPlan,
    pub seed: u64,
}

impl DatasetRecord {
    pub fn new(splits: SplitPlan, seed: u64) -> Self {
        let names: Vec<String> = PieceKind::all().map(|k| k.to_string()).collect();
        Self {
            schema: "v1",
            nc: names.len(),
            names,
            splits,
            seed,
        }
    }
}
