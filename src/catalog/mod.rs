//! Option catalog contract: the asynchronous lookup that resolves a package
//! selection into its option fields.
//!
//! Wire field names match the serving side exactly: the response carries a
//! `package_options` list whose items hold `id`, `name`, and `options_json`
//! (the enumerated allowed values). An unknown package id answers an empty
//! list rather than an error.
//!
//! Fetches are generation-tagged: a [`FetchRequest`] records the owning
//! entry's identity and a per-entry sequence number at dispatch time, and the
//! matching [`FetchOutcome`] is discarded unless both still apply when it
//! arrives. This is what makes overlapping and out-of-order completions safe.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a selectable package.
pub type PackageId = i64;

/// One fetched option for a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageOption {
    pub id: i64,
    pub name: String,
    #[serde(rename = "options_json")]
    pub allowed_values: Vec<String>,
}

/// Response payload of the option lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageOptionsResponse {
    pub package_options: Vec<PackageOption>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog transport failure: {0}")]
    Transport(String),
    #[error("malformed catalog payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type CatalogResult = Result<PackageOptionsResponse, CatalogError>;

/// External collaborator resolving a package id into its options.
///
/// Idempotent and side-effect free on the serving side; the request is keyed
/// solely by the package id. Implementations own transport concerns,
/// including bounding how long a lookup may take.
pub trait OptionCatalog {
    fn fetch_options(&self, package: PackageId) -> CatalogResult;
}

/// A dispatched lookup, tagged with the owning entry and its request
/// generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub entry: Uuid,
    pub seq: u64,
    pub package: PackageId,
}

impl FetchRequest {
    /// Pairs this request with a transport result.
    pub fn resolve(self, result: CatalogResult) -> FetchOutcome {
        FetchOutcome {
            entry: self.entry,
            seq: self.seq,
            package: self.package,
            result,
        }
    }

    /// Runs the lookup against a catalog and packages the outcome.
    pub fn dispatch(self, catalog: &dyn OptionCatalog) -> FetchOutcome {
        let result = catalog.fetch_options(self.package);
        self.resolve(result)
    }
}

/// A completed lookup ready to be applied back onto its entry.
#[derive(Debug)]
pub struct FetchOutcome {
    pub entry: Uuid,
    pub seq: u64,
    pub package: PackageId,
    pub result: CatalogResult,
}

/// In-memory catalog keyed by package id. Unknown packages answer an empty
/// option list, mirroring the serving side.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    options: BTreeMap<PackageId, Vec<PackageOption>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, package: PackageId, options: Vec<PackageOption>) {
        self.options.insert(package, options);
    }
}

impl OptionCatalog for StaticCatalog {
    fn fetch_options(&self, package: PackageId) -> CatalogResult {
        let package_options = self.options.get(&package).cloned().unwrap_or_default();
        Ok(PackageOptionsResponse { package_options })
    }
}
