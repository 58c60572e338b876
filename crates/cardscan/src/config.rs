//! JSON configuration and report helpers for scanning.

use crate::catalog::CardInfo;
use crate::pipeline::{Detection, PipelineParams};
use crate::scan_loop::ScanSummary;
use cardscan_fingerprint::FingerprintParams;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_capture_retries() -> u32 {
    1
}

/// Configuration for a scan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory of `<identifier>.<ext>` reference images.
    pub references: PathBuf,
    /// Directory of frames to scan, read in file name order.
    #[serde(default)]
    pub frames: Option<PathBuf>,
    /// Where annotated frames are written; omitted frames are dropped.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub report_path: Option<PathBuf>,
    /// JSON card catalog (identifier → metadata).
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Frame budget; zero is rejected when parsing.
    #[serde(default)]
    pub max_frames: Option<NonZeroUsize>,
    #[serde(default = "default_capture_retries")]
    pub capture_retries: u32,
    #[serde(default)]
    pub fingerprint: FingerprintParams,
    #[serde(default)]
    pub pipeline: PipelineParams,
}

impl ScanConfig {
    pub fn new(references: impl Into<PathBuf>) -> Self {
        Self {
            references: references.into(),
            frames: None,
            output_dir: None,
            report_path: None,
            catalog: None,
            max_frames: None,
            capture_retries: default_capture_retries(),
            fingerprint: FingerprintParams::default(),
            pipeline: PipelineParams::default(),
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("cardscan_report.json"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Quad corners in frame pixels, as located.
    pub corners: [[f32; 2]; 4],
    #[serde(default)]
    pub identifier: Option<String>,
    pub distance: u32,
    #[serde(default)]
    pub metadata: Option<CardInfo>,
}

impl From<&Detection> for DetectionReport {
    fn from(d: &Detection) -> Self {
        Self {
            corners: d.quad.map(|p| [p.x, p.y]),
            identifier: d.identifier.clone(),
            distance: d.distance,
            metadata: d.metadata.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub index: usize,
    pub detections: Vec<DetectionReport>,
    pub elapsed_ms: f64,
}

impl FrameReport {
    pub fn new(index: usize, detections: &[Detection], elapsed_ms: f64) -> Self {
        Self {
            index,
            detections: detections.iter().map(DetectionReport::from).collect(),
            elapsed_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub references: PathBuf,
    pub database_size: usize,
    pub hash_size: u32,
    #[serde(flatten)]
    pub summary: ScanSummary,
}

impl ScanReport {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
