//! Reference fingerprint database built from a directory of card images.

use crate::phash::{phash, Fingerprint};
use crate::FingerprintError;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Fingerprint computation settings shared by the database and the matcher.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintParams {
    /// Hash side; fingerprints carry `hash_size²` bits.
    pub hash_size: u32,
    /// Canonical reference width in pixels.
    ///
    /// The canonical size is usually quoted as `(600, 400)`, height first.
    /// Cards are portrait after rectification, so that means 400 wide.
    pub reference_width: u32,
    /// Canonical reference height in pixels (600, see `reference_width`).
    pub reference_height: u32,
    /// Gray level above which reference pixels become white.
    pub binarize_threshold: u8,
}

impl Default for FingerprintParams {
    fn default() -> Self {
        Self {
            hash_size: 16,
            reference_width: 400,
            reference_height: 600,
            binarize_threshold: 150,
        }
    }
}

/// One known card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceFingerprint {
    pub identifier: String,
    pub fingerprint: Fingerprint,
}

/// Identifier → fingerprint map that iterates in insertion order.
#[derive(Clone, Debug, Default)]
pub struct FingerprintDatabase {
    hash_size: u32,
    entries: Vec<ReferenceFingerprint>,
    index: HashMap<String, usize>,
}

impl FingerprintDatabase {
    pub fn new(hash_size: u32) -> Self {
        Self {
            hash_size,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    #[inline]
    pub fn hash_size(&self) -> u32 {
        self.hash_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or overwrite. An overwritten entry keeps its original position
    /// and the previous fingerprint is returned.
    pub fn insert(&mut self, identifier: String, fingerprint: Fingerprint) -> Option<Fingerprint> {
        if let Some(&i) = self.index.get(&identifier) {
            return Some(std::mem::replace(&mut self.entries[i].fingerprint, fingerprint));
        }
        self.index.insert(identifier.clone(), self.entries.len());
        self.entries.push(ReferenceFingerprint {
            identifier,
            fingerprint,
        });
        None
    }

    pub fn get(&self, identifier: &str) -> Option<&Fingerprint> {
        self.index
            .get(identifier)
            .map(|&i| &self.entries[i].fingerprint)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceFingerprint> {
        self.entries.iter()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.identifier.as_str())
    }
}

/// Card identifier for a reference image path: the file name up to its
/// first `.`.
///
/// Returns `None` for names without an extension, with an empty stem, or
/// whose extension is not a readable raster format.
pub fn identifier_from_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let (stem, _) = name.split_once('.')?;
    if stem.is_empty() {
        return None;
    }
    let format = ImageFormat::from_path(path).ok()?;
    if !format.reading_enabled() {
        return None;
    }
    Some(stem.to_string())
}

/// Fingerprint of a reference image: canonical resize, grayscale, binarize,
/// perceptual hash.
pub fn reference_fingerprint(img: &DynamicImage, params: &FingerprintParams) -> Fingerprint {
    let (w, h) = (params.reference_width, params.reference_height);
    let gray: GrayImage = if img.width() == w && img.height() == h {
        img.to_luma8()
    } else {
        img.resize_exact(w, h, FilterType::Triangle).to_luma8()
    };

    let t = params.binarize_threshold;
    let binary = GrayImage::from_fn(w, h, |x, y| {
        let v = gray.get_pixel(x, y)[0];
        image::Luma([if v > t { 255 } else { 0 }])
    });

    phash(&binary, params.hash_size)
}

fn load_reference(path: &Path) -> Option<DynamicImage> {
    let decoded = ImageReader::open(path)
        .map_err(image::ImageError::IoError)
        .and_then(|r| r.with_guessed_format().map_err(image::ImageError::IoError))
        .and_then(|r| r.decode());
    match decoded {
        Ok(img) => Some(img),
        Err(err) => {
            log::warn!("skipping reference {}: {err}", path.display());
            None
        }
    }
}

/// Build a database from an explicit list of reference image paths.
///
/// Paths are processed in the given order; a later path with an already
/// seen identifier overwrites the earlier fingerprint.
pub fn build_database_from_paths<I, P>(paths: I, params: &FingerprintParams) -> FingerprintDatabase
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut db = FingerprintDatabase::new(params.hash_size);
    for path in paths {
        let path = path.as_ref();
        let Some(identifier) = identifier_from_path(path) else {
            log::debug!("ignoring non-reference file {}", path.display());
            continue;
        };
        let Some(img) = load_reference(path) else {
            continue;
        };
        let fingerprint = reference_fingerprint(&img, params);
        if db.insert(identifier.clone(), fingerprint).is_some() {
            log::debug!("reference {identifier} overwritten by {}", path.display());
        }
    }
    db
}

/// Build a database from every reference image in `dir`.
///
/// Files are visited sorted by name, so the result does not depend on the
/// platform's directory enumeration order.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(params), fields(hash_size = params.hash_size)))]
pub fn build_database(
    dir: &Path,
    params: &FingerprintParams,
) -> Result<FingerprintDatabase, FingerprintError> {
    let read_dir = fs::read_dir(dir).map_err(|source| FingerprintError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let db = build_database_from_paths(&paths, params);
    log::info!(
        "built {} reference fingerprint(s) from {}",
        db.len(),
        dir.display()
    );
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_reference_size_is_portrait() {
        let params = FingerprintParams::default();
        assert_eq!((params.reference_width, params.reference_height), (400, 600));
        assert!(params.reference_height > params.reference_width);
    }

    #[test]
    fn identifier_is_name_up_to_first_dot() {
        assert_eq!(
            identifier_from_path(Path::new("refs/sv4pt5-36-Dedenne.png")).as_deref(),
            Some("sv4pt5-36-Dedenne")
        );
        assert_eq!(
            identifier_from_path(Path::new("xy1-1.front.jpg")).as_deref(),
            Some("xy1-1")
        );
    }

    #[test]
    fn malformed_names_are_not_references() {
        assert!(identifier_from_path(Path::new("README")).is_none());
        assert!(identifier_from_path(Path::new(".hidden.png")).is_none());
        assert!(identifier_from_path(Path::new("notes.txt")).is_none());
    }

    #[test]
    fn overwrite_keeps_position_and_replaces_bits() {
        let a = Fingerprint::from_bools([true, false]);
        let b = Fingerprint::from_bools([false, true]);
        let c = Fingerprint::from_bools([true, true]);

        let mut db = FingerprintDatabase::new(2);
        assert!(db.insert("a".into(), a.clone()).is_none());
        assert!(db.insert("b".into(), b).is_none());
        assert_eq!(db.insert("a".into(), c.clone()), Some(a));

        assert_eq!(db.len(), 2);
        assert_eq!(db.identifiers().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(db.get("a"), Some(&c));
        assert!(db.get("missing").is_none());
    }

    #[test]
    fn binary_reference_hash_ignores_threshold_choice() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(400, 600, |x, y| {
            image::Luma([if (x / 50 + y / 75) % 2 == 0 { 0 } else { 255 }])
        }));
        let params = FingerprintParams {
            hash_size: 8,
            ..FingerprintParams::default()
        };
        let low = FingerprintParams {
            binarize_threshold: 10,
            ..params.clone()
        };
        assert_eq!(
            reference_fingerprint(&img, &params),
            reference_fingerprint(&img, &low)
        );
    }
}
