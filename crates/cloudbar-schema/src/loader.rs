// crates/cloudbar-schema/src/loader.rs
// ============================================================================
// Module: Schema Loader
// Description: On-disk mirror of the remote API schema document.
// Purpose: Load, fetch-on-miss, and dereference the OpenAPI document.
// Dependencies: serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`SchemaLoader`] reads the cached schema file, fetching it once through a
//! [`SchemaFetcher`] when the file is absent, then dereferences it with the
//! file's own URI as base.
//! Invariants:
//! - The cache is written only when no file exists; an existing file is
//!   never refreshed.
//! - Every [`SchemaLoader::load`] call re-reads the file; nothing is memoized.
//! - Concurrent first-run writers are not coordinated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;
use tracing::info;
use url::Url;

use crate::deref::dereference;
use crate::document::SchemaDocument;
use crate::error::SchemaError;

// ============================================================================
// SECTION: Fetcher Interface
// ============================================================================

/// Source of the raw schema text when no cached copy exists.
pub trait SchemaFetcher {
    /// Fetches the schema document from the service.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the document cannot be fetched.
    fn fetch_schema(&self) -> Result<String, String>;
}

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Loads the API schema document from its cache location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLoader {
    /// Cache file location.
    path: PathBuf,
}

impl SchemaLoader {
    /// Creates a loader for the given cache file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Returns the cache file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and dereferences the cached document, fetching it first when
    /// the cache file is missing and a fetcher is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Unavailable`] when neither a cached copy nor a
    /// fetch produces a document, [`SchemaError::Parse`] for invalid JSON, and
    /// [`SchemaError::UnresolvableRef`] when dereferencing fails.
    pub fn load(&self, fetcher: Option<&dyn SchemaFetcher>) -> Result<SchemaDocument, SchemaError> {
        self.ensure_cached(fetcher)?;
        let raw = fs::read_to_string(&self.path).map_err(|err| SchemaError::Unavailable {
            path: self.path.clone(),
            reason: err.to_string(),
        })?;
        let root: Value = serde_json::from_str(&raw).map_err(|source| SchemaError::Parse {
            path: self.path.clone(),
            source,
        })?;
        let base = self.base_uri()?;
        let expanded = dereference(&root, &base)?;
        debug!(path = %self.path.display(), "schema document loaded");
        Ok(SchemaDocument::new(expanded))
    }

    /// Writes the fetched document to the cache path when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Unavailable`] when the file is missing and the
    /// fetch is impossible or fails, and [`SchemaError::Io`] when the fetched
    /// document cannot be persisted.
    pub fn ensure_cached(&self, fetcher: Option<&dyn SchemaFetcher>) -> Result<(), SchemaError> {
        if self.path.is_file() {
            return Ok(());
        }
        let Some(fetcher) = fetcher else {
            return Err(SchemaError::Unavailable {
                path: self.path.clone(),
                reason: "no cached copy and no fetcher configured".to_string(),
            });
        };
        let body = fetcher.fetch_schema().map_err(|reason| SchemaError::Unavailable {
            path: self.path.clone(),
            reason,
        })?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| SchemaError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, body).map_err(|source| SchemaError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "schema document fetched and cached");
        Ok(())
    }

    /// Returns the `file:` URI used as dereferencing base.
    fn base_uri(&self) -> Result<Url, SchemaError> {
        let absolute = std::path::absolute(&self.path).map_err(|source| SchemaError::Io {
            path: self.path.clone(),
            source,
        })?;
        Url::from_file_path(&absolute).map_err(|()| SchemaError::Unavailable {
            path: absolute.clone(),
            reason: "cache path cannot be expressed as a file uri".to_string(),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
