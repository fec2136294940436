//! One interactive dashboard session.
//!
//! The session owns the uploaded bytes, the parse cache and the active
//! dataset. The dataset is shared read-only; filters and aggregates are
//! recomputed from it on demand and never written back.

use crate::cache::ParseCache;
use crate::config::SourceConfig;
use crate::error::{FleetError, Result};
use crate::filter::{self, Dimension, FilterOptions, FilterSelection};
use crate::loader::{self, LoadReport};
use crate::reports;
use crate::status::StatusScope;
use crate::types::{DashboardSummary, FleetDataset, FleetRecord};
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// Filtered records plus their aggregates, ready for rendering.
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub records: Vec<&'a FleetRecord>,
    pub summary: DashboardSummary,
    pub has_origin: bool,
}

#[derive(Debug)]
pub struct Session {
    source: SourceConfig,
    cache: ParseCache,
    upload: Option<Upload>,
    dataset: Option<Arc<FleetDataset>>,
    report: Option<LoadReport>,
    loaded_at: Option<DateTime<Local>>,
    scope: StatusScope,
    selection: FilterSelection,
}

impl Session {
    pub fn new(source: SourceConfig) -> Self {
        Self {
            source,
            cache: ParseCache::new(),
            upload: None,
            dataset: None,
            report: None,
            loaded_at: None,
            scope: StatusScope::default(),
            selection: FilterSelection::default(),
        }
    }

    /// Ingest an uploaded file. On failure the previously loaded dataset,
    /// if any, stays active.
    pub fn upload(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<&LoadReport> {
        let source = &self.source;
        let parsed = self
            .cache
            .get_or_parse(&bytes, |b| loader::load_and_clean(b, file_name, source))?;
        self.upload = Some(Upload {
            file_name: file_name.to_string(),
            bytes,
        });
        self.dataset = Some(parsed.dataset);
        self.loaded_at = Some(Local::now());
        self.reset_selection();
        Ok(self.report.insert(parsed.report))
    }

    /// Read `path` from disk and ingest it.
    pub fn load_path(&mut self, path: &Path) -> Result<&LoadReport> {
        let bytes = std::fs::read(path).map_err(|e| {
            FleetError::MalformedSpreadsheet(format!("cannot read {}: {}", path.display(), e))
        })?;
        let name = path.to_string_lossy().into_owned();
        self.upload(&name, bytes)
    }

    /// Discard cached parses and re-ingest the current upload's bytes.
    /// Returns `Ok(None)` when nothing has been uploaded yet.
    pub fn refresh(&mut self) -> Result<Option<&LoadReport>> {
        self.cache.invalidate();
        let Some(upload) = self.upload.take() else {
            return Ok(None);
        };
        info!(file = %upload.file_name, "re-ingesting upload");
        let name = upload.file_name.clone();
        match self.upload(&name, upload.bytes.clone()).map(|_| ()) {
            Ok(()) => Ok(self.report.as_ref()),
            Err(e) => {
                // Keep the bytes so a later refresh can retry.
                self.upload = Some(upload);
                Err(e)
            }
        }
    }

    pub fn dataset(&self) -> Option<&FleetDataset> {
        self.dataset.as_deref()
    }

    pub fn report(&self) -> Option<&LoadReport> {
        self.report.as_ref()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Local>> {
        self.loaded_at
    }

    pub fn file_name(&self) -> Option<&str> {
        self.upload.as_ref().map(|u| u.file_name.as_str())
    }

    pub fn scope(&self) -> StatusScope {
        self.scope
    }

    /// Switch scope; the selection goes back to "everything in scope".
    pub fn set_scope(&mut self, scope: StatusScope) {
        if self.scope != scope {
            self.scope = scope;
            self.reset_selection();
        }
    }

    fn has_origin(&self) -> bool {
        self.dataset.as_ref().is_some_and(|d| d.has_origin_region())
    }

    /// Records inside the active status scope.
    pub fn scoped_records(&self) -> Vec<&FleetRecord> {
        match &self.dataset {
            Some(d) => filter::restrict_to_scope(d, self.scope),
            None => Vec::new(),
        }
    }

    pub fn options(&self) -> FilterOptions {
        FilterOptions::from_records(&self.scoped_records(), self.has_origin())
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn reset_selection(&mut self) {
        self.selection = FilterSelection::all_of(&self.options());
    }

    /// Replace the allowed set of one dimension. Only offered values are
    /// accepted; the rejected ones are returned.
    pub fn set_selection(&mut self, dim: Dimension, values: BTreeSet<String>) -> Vec<String> {
        let options = self.options();
        let offered = options.get(dim);
        let (accepted, rejected): (BTreeSet<String>, BTreeSet<String>) =
            values.into_iter().partition(|v| offered.contains(v));
        self.selection.set(dim, accepted);
        rejected.into_iter().collect()
    }

    pub fn filtered(&self) -> Vec<&FleetRecord> {
        filter::apply(&self.scoped_records(), &self.selection, self.has_origin())
    }

    /// Current dashboard, or `None` before a successful upload.
    pub fn view(&self) -> Option<DashboardView<'_>> {
        self.dataset.as_ref()?;
        let records = self.filtered();
        let has_origin = self.has_origin();
        let summary = reports::summarize(&records, has_origin);
        Some(DashboardView {
            records,
            summary,
            has_origin,
        })
    }
}
