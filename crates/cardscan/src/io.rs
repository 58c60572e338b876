//! Frame sources, display sinks and stop signals for the scan loop.

use crate::catalog::CardInfo;
use image::{ImageFormat, RgbImage};
use std::collections::VecDeque;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum FrameIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Supplies frames to the scan loop. `Ok(None)` ends the stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FrameIoError>;
}

/// Receives every annotated frame.
pub trait FrameSink {
    fn show(&mut self, frame: &RgbImage) -> Result<(), FrameIoError>;
}

/// Shown whenever the recognized card changes.
pub trait InfoPanel {
    fn show(&mut self, identifier: &str, info: Option<&CardInfo>);
}

/// Polled once after every frame.
pub trait StopSignal {
    fn should_stop(&mut self) -> bool;
}

impl<F: FnMut() -> bool> StopSignal for F {
    fn should_stop(&mut self) -> bool {
        self()
    }
}

fn is_image_path(path: &Path) -> bool {
    path.is_file()
        && ImageFormat::from_path(path)
            .map(|f| f.reading_enabled())
            .unwrap_or(false)
}

/// Frames read from a directory of images, in file name order.
#[derive(Clone, Debug)]
pub struct ImageSequenceSource {
    pending: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, FrameIoError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| is_image_path(p))
            .collect();
        paths.sort();
        Ok(Self::from_paths(paths))
    }

    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            pending: paths.into_iter().collect(),
        }
    }

    /// Frames not yet delivered.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, FrameIoError> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };
        log::trace!("reading frame {}", path.display());
        Ok(Some(image::open(&path)?.to_rgb8()))
    }
}

/// Writes annotated frames as `frame_00000.png`, `frame_00001.png`, ...
#[derive(Clone, Debug)]
pub struct DirectoryFrameSink {
    dir: PathBuf,
    next_index: usize,
}

impl DirectoryFrameSink {
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, FrameIoError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, next_index: 0 })
    }

    pub fn written(&self) -> usize {
        self.next_index
    }
}

impl FrameSink for DirectoryFrameSink {
    fn show(&mut self, frame: &RgbImage) -> Result<(), FrameIoError> {
        let path = self.dir.join(format!("frame_{:05}.png", self.next_index));
        frame.save(&path)?;
        self.next_index += 1;
        Ok(())
    }
}

/// Drops every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullFrameSink;

impl FrameSink for NullFrameSink {
    fn show(&mut self, _frame: &RgbImage) -> Result<(), FrameIoError> {
        Ok(())
    }
}

/// Logs whichever card fields are available.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogInfoPanel;

impl InfoPanel for LogInfoPanel {
    fn show(&mut self, identifier: &str, info: Option<&CardInfo>) {
        let Some(info) = info else {
            log::info!("card {identifier}");
            return;
        };
        let mut line = format!("card {identifier}: {}", info.name);
        if !info.set_name.is_empty() {
            line.push_str(&format!(" [{}]", info.set_name));
        }
        if !info.rarity.is_empty() {
            line.push_str(&format!(" ({})", info.rarity));
        }
        if let Some(price) = info.market_price {
            line.push_str(&format!(" ${price:.2}"));
        }
        if let Some(url) = &info.image_url {
            line.push_str(&format!(" {url}"));
        }
        log::info!("{line}");
    }
}

/// Stops once `limit` frames have been processed.
///
/// The signal is polled after each frame, so the limit is non-zero.
#[derive(Clone, Copy, Debug)]
pub struct FrameLimit {
    limit: NonZeroUsize,
    seen: usize,
}

impl FrameLimit {
    pub fn new(limit: NonZeroUsize) -> Self {
        Self { limit, seen: 0 }
    }
}

impl StopSignal for FrameLimit {
    fn should_stop(&mut self) -> bool {
        self.seen += 1;
        self.seen >= self.limit.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn sequence_yields_sorted_images_then_ends() {
        let dir = tempfile::tempdir().expect("tempdir");
        RgbImage::from_pixel(4, 3, Rgb([9, 9, 9]))
            .save(dir.path().join("b.png"))
            .expect("save");
        RgbImage::from_pixel(2, 2, Rgb([1, 1, 1]))
            .save(dir.path().join("a.png"))
            .expect("save");
        fs::write(dir.path().join("notes.txt"), "skip").expect("write");

        let mut src = ImageSequenceSource::open(dir.path()).expect("open");
        assert_eq!(src.remaining(), 2);
        assert_eq!(src.next_frame().expect("a").map(|f| f.dimensions()), Some((2, 2)));
        assert_eq!(src.next_frame().expect("b").map(|f| f.dimensions()), Some((4, 3)));
        assert!(src.next_frame().expect("end").is_none());
    }

    #[test]
    fn directory_sink_numbers_frames() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("annotated");
        let mut sink = DirectoryFrameSink::create(&out).expect("sink");
        let frame = RgbImage::new(3, 3);
        sink.show(&frame).expect("show");
        sink.show(&frame).expect("show");
        assert_eq!(sink.written(), 2);
        assert!(out.join("frame_00001.png").is_file());
    }

    #[test]
    fn frame_limit_and_closures_stop() {
        let mut limit = FrameLimit::new(NonZeroUsize::new(2).expect("non-zero"));
        assert!(!limit.should_stop());
        assert!(limit.should_stop());

        let mut single = FrameLimit::new(NonZeroUsize::MIN);
        assert!(single.should_stop());

        let mut calls = 0;
        let mut third = || {
            calls += 1;
            calls == 3
        };
        assert!(!third.should_stop());
        assert!(!third.should_stop());
        assert!(third.should_stop());
    }
}
