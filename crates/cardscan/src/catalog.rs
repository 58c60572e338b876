//! Card metadata lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Display metadata for a recognized card. Missing text fields are empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardInfo {
    pub name: String,
    #[serde(default)]
    pub set_name: String,
    #[serde(default)]
    pub rarity: String,
    #[serde(default)]
    pub market_price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("no catalog entry for {0}")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Resolves card identifiers to metadata.
pub trait CardCatalog {
    fn lookup(&self, identifier: &str) -> Result<CardInfo, CatalogError>;
}

/// Catalog loaded from a JSON object mapping identifiers to [`CardInfo`].
#[derive(Clone, Debug, Default)]
pub struct JsonCatalog {
    entries: HashMap<String, CardInfo>,
}

impl JsonCatalog {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        Ok(Self {
            entries: serde_json::from_str(&raw)?,
        })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, CardInfo)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CardCatalog for JsonCatalog {
    fn lookup(&self, identifier: &str) -> Result<CardInfo, CatalogError> {
        self.entries
            .get(identifier)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(identifier.to_string()))
    }
}

/// Catalog with no entries.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCatalog;

impl CardCatalog for NoCatalog {
    fn lookup(&self, identifier: &str) -> Result<CardInfo, CatalogError> {
        Err(CatalogError::NotFound(identifier.to_string()))
    }
}
