//! Nearest-neighbor matching against a fingerprint database.

use crate::phash::{phash, Fingerprint};
use crate::FingerprintDatabase;
use image::RgbImage;

/// Nearest reference for an observed fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match<'db> {
    pub identifier: &'db str,
    /// Hamming distance between observed and reference bits.
    pub distance: u32,
}

/// Brute-force matcher over a borrowed database.
///
/// Every reference is compared; card collections of a few thousand
/// entries scan well within a frame.
#[derive(Clone, Copy, Debug)]
pub struct Matcher<'db> {
    db: &'db FingerprintDatabase,
    max_distance: Option<u32>,
}

impl<'db> Matcher<'db> {
    /// `max_distance` gates acceptance; `None` accepts every nearest neighbor.
    pub fn new(db: &'db FingerprintDatabase, max_distance: Option<u32>) -> Self {
        Self { db, max_distance }
    }

    #[inline]
    pub fn database(&self) -> &'db FingerprintDatabase {
        self.db
    }

    #[inline]
    pub fn max_distance(&self) -> Option<u32> {
        self.max_distance
    }

    /// Candidate fingerprint of a rectified card image (no binarization).
    pub fn fingerprint(&self, image: &RgbImage) -> Fingerprint {
        let gray = image::imageops::grayscale(image);
        phash(&gray, self.db.hash_size())
    }

    /// Closest reference; ties go to the earliest entry. `None` only for an
    /// empty database.
    pub fn nearest(&self, observed: &Fingerprint) -> Option<Match<'db>> {
        let mut best: Option<Match<'db>> = None;

        for entry in self.db.iter() {
            let d = observed.distance(&entry.fingerprint);
            if best.map_or(true, |b| d < b.distance) {
                best = Some(Match {
                    identifier: &entry.identifier,
                    distance: d,
                });
                if d == 0 {
                    break;
                }
            }
        }

        best
    }

    /// Fingerprint `image` and return its nearest reference.
    pub fn match_image(&self, image: &RgbImage) -> Option<Match<'db>> {
        self.nearest(&self.fingerprint(image))
    }

    /// Whether a match passes the distance gate.
    #[inline]
    pub fn accepts(&self, m: &Match<'_>) -> bool {
        self.max_distance.map_or(true, |max| m.distance <= max)
    }
}
