//! Trading card recognition for video frames.
//!
//! This crate provides:
//! - re-exports of the geometry, locator and fingerprint crates,
//! - the per-frame [`CardPipeline`] (locate → rectify → deglare → match →
//!   annotate),
//! - the capture/display loop [`run_scan_loop`] and its collaborator traits,
//! - JSON configuration and reports.
//!
//! ## Quickstart
//!
//! ```no_run
//! use cardscan::{build_database, CardPipeline, DisplayState, FingerprintParams, LogInfoPanel, NoCatalog};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = build_database(Path::new("references"), &FingerprintParams::default())?;
//! let pipeline = CardPipeline::new(&db, &NoCatalog, Default::default())?;
//!
//! let mut frame = image::open("frame.png")?.to_rgb8();
//! let mut state = DisplayState::default();
//! for d in pipeline.process_frame(&mut frame, &mut state, &mut LogInfoPanel) {
//!     println!("{:?} at distance {}", d.identifier, d.distance);
//! }
//! # Ok(())
//! # }
//! ```

pub use cardscan_core as core;
pub use cardscan_fingerprint as fingerprint;
pub use cardscan_locate as locate;

pub use cardscan_fingerprint::{build_database, FingerprintDatabase, FingerprintParams};
pub use cardscan_locate::LocateParams;

mod catalog;
mod config;
mod error;
mod glare;
mod io;
mod pipeline;
mod scan_loop;
mod session;

pub use catalog::{CardCatalog, CardInfo, CatalogError, JsonCatalog, NoCatalog};
pub use config::{ConfigError, DetectionReport, FrameReport, ScanConfig, ScanReport};
pub use error::ScanError;
pub use glare::{remove_glare, saturation_value, GlareParams};
pub use io::{
    DirectoryFrameSink, FrameIoError, FrameLimit, FrameSink, FrameSource, ImageSequenceSource,
    InfoPanel, LogInfoPanel, NullFrameSink, StopSignal,
};
pub use pipeline::{draw_outline, CardPipeline, Detection, PipelineParams, OUTLINE_COLOR};
pub use scan_loop::{run_scan_loop, ScanDevices, ScanSummary, ScriptedSource, StopReason};
pub use session::DisplayState;

/// Route `log` records into `tracing` and install a formatting subscriber.
///
/// `default_level` applies when `RUST_LOG` is unset. Errors from an already
/// installed logger or subscriber are ignored.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, default_level: log::LevelFilter) {
    let _ = tracing_log::LogTracer::init();
    cardscan_core::init_tracing(json, default_level);
}
