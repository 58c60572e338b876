//! Perceptual fingerprints for card identification.
//!
//! This crate focuses on:
//! - a DCT perceptual hash packed into `u64` words,
//! - building a reference database from a directory of card images,
//! - nearest-neighbor matching under the Hamming distance.
//!
//! It does **not** locate or rectify cards; callers pass rectified images.

mod database;
mod matcher;
mod phash;

use std::path::PathBuf;

pub use database::{
    build_database, build_database_from_paths, identifier_from_path, reference_fingerprint,
    FingerprintDatabase, FingerprintParams, ReferenceFingerprint,
};
pub use matcher::{Match, Matcher};
pub use phash::{phash, Fingerprint};

/// Errors produced while building a reference database.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    #[error("cannot read reference directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
