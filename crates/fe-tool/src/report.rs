use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fe_metrics::ScoreVector;
use serde::Serialize;

use crate::error::EvalError;

pub const SCORES_FILE: &str = "scores.csv";

/// One line of the score table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub row: String,
    pub src: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub seg_iur: f64,
    pub flip: i32,
    pub accuracy: Vec<f64>,
}

impl ReportRow {
    pub fn new(
        row: impl Into<String>,
        src: impl Into<String>,
        reference: impl Into<String>,
        score: &ScoreVector,
        flip: i32,
    ) -> Self {
        Self {
            row: row.into(),
            src: src.into(),
            reference: reference.into(),
            seg_iur: score.iou(),
            flip,
            accuracy: score.accuracy().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalSummary {
    pub cases: usize,
    pub rows: Vec<ReportRow>,
    pub average: ReportRow,
    pub without_flip: ReportRow,
}

/// Element-wise mean of `count` summed score vectors; all NaN when empty.
pub fn mean_score(sum: &ScoreVector, count: usize) -> ScoreVector {
    if count == 0 {
        return sum.scaled(f64::NAN);
    }
    sum.scaled(1.0 / count as f64)
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "nan".to_owned()
    } else {
        format!("{v:.6}")
    }
}

pub fn header_line(num_thresholds: usize) -> String {
    let mut line = String::from("Row,Src,Ref,SegIUR,Flip");
    for i in 1..=num_thresholds {
        line.push_str(&format!(",T{i}"));
    }
    line
}

pub fn format_row(row: &ReportRow) -> String {
    let mut line = format!(
        "{},{},{},{},{}",
        row.row,
        row.src,
        row.reference,
        format_value(row.seg_iur),
        row.flip
    );
    for &v in &row.accuracy {
        line.push(',');
        line.push_str(&format_value(v));
    }
    line
}

/// `scores.csv` writer. Creating it is the first step of a run.
pub struct ScoreTable {
    path: PathBuf,
    out: BufWriter<File>,
}

impl ScoreTable {
    pub fn create(path: &Path, num_thresholds: usize) -> Result<Self, EvalError> {
        let file = File::create(path).map_err(EvalError::io(path))?;
        let mut table = Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        };
        table.write_line(&header_line(num_thresholds))?;
        Ok(table)
    }

    pub fn write_row(&mut self, row: &ReportRow) -> Result<(), EvalError> {
        self.write_line(&format_row(row))
    }

    pub fn finish(mut self) -> Result<(), EvalError> {
        self.out.flush().map_err(EvalError::io(&self.path))
    }

    fn write_line(&mut self, line: &str) -> Result<(), EvalError> {
        writeln!(self.out, "{line}").map_err(EvalError::io(&self.path))
    }
}

pub fn write_json_summary(path: &Path, summary: &EvalSummary) -> Result<(), EvalError> {
    let bytes = serde_json::to_vec_pretty(summary)?;
    fs::write(path, bytes).map_err(EvalError::io(path))
}

/// Prints IoU and the first five accuracy values of `row`.
pub fn print_summary(row: &ReportRow) {
    println!("------------- Score Summary ----------------------");
    println!(
        "{:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "IUR", "FA1", "FA2", "FA3", "FA4", "FA5"
    );
    let mut line = format!("{:8.3}", row.seg_iur);
    for v in row.accuracy.iter().take(5) {
        line.push_str(&format!(" {v:8.3}"));
    }
    println!("{line}");
}
