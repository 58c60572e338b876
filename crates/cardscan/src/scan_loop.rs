//! Capture → recognize → display loop.

use crate::config::FrameReport;
use crate::io::{FrameIoError, FrameSink, FrameSource, InfoPanel, StopSignal};
use crate::pipeline::CardPipeline;
use crate::session::DisplayState;
use crate::ScanError;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// The collaborators a scan loop talks to.
pub struct ScanDevices<'a> {
    pub source: &'a mut dyn FrameSource,
    pub sink: &'a mut dyn FrameSink,
    pub panel: &'a mut dyn InfoPanel,
    pub stop: &'a mut dyn StopSignal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndOfStream,
    Requested,
}

/// Outcome of [`run_scan_loop`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub frames_processed: usize,
    pub detections: usize,
    /// Identifiers shown in the info panel, in first-shown order.
    pub distinct_shown: Vec<String>,
    pub stop_reason: StopReason,
    pub frames: Vec<FrameReport>,
}

fn capture(source: &mut dyn FrameSource, retries: u32) -> Result<Option<RgbImage>, ScanError> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match source.next_frame() {
            Ok(frame) => return Ok(frame),
            Err(err) if attempts <= retries => {
                log::warn!("frame capture failed (attempt {attempts}): {err}; retrying");
            }
            Err(source) => return Err(ScanError::Capture { attempts, source }),
        }
    }
}

/// Process frames until the source ends or the stop signal fires.
///
/// A failed capture is retried `capture_retries` times before the loop gives
/// up. The stop signal is polled after each frame has been displayed.
pub fn run_scan_loop(
    pipeline: &CardPipeline<'_>,
    devices: ScanDevices<'_>,
    state: &mut DisplayState,
    capture_retries: u32,
) -> Result<ScanSummary, ScanError> {
    let ScanDevices {
        source,
        sink,
        panel,
        stop,
    } = devices;

    let mut frames = Vec::new();
    let mut distinct_shown: Vec<String> = Vec::new();
    let mut detections = 0;

    let stop_reason = loop {
        let Some(mut frame) = capture(source, capture_retries)? else {
            break StopReason::EndOfStream;
        };

        let started = Instant::now();
        let found = pipeline.process_frame(&mut frame, state, panel);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;

        for id in found.iter().filter(|d| d.shown).filter_map(|d| d.identifier.as_ref()) {
            if !distinct_shown.contains(id) {
                distinct_shown.push(id.clone());
            }
        }
        detections += found.len();
        frames.push(FrameReport::new(frames.len(), &found, elapsed_ms));

        sink.show(&frame).map_err(ScanError::Display)?;

        if stop.should_stop() {
            break StopReason::Requested;
        }
    };

    log::info!(
        "scan finished after {} frame(s), {} detection(s), stop: {:?}",
        frames.len(),
        detections,
        stop_reason
    );

    Ok(ScanSummary {
        frames_processed: frames.len(),
        detections,
        distinct_shown,
        stop_reason,
        frames,
    })
}

/// Source that replays a scripted sequence; used by tests and benches.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: std::collections::VecDeque<Result<RgbImage, FrameIoError>>,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Result<RgbImage, FrameIoError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FrameIoError> {
        self.script.pop_front().transpose()
    }
}
