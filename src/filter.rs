//! Sidebar filters over the normalized dataset.
//!
//! The dashboard works on a view restricted to the active status scope.
//! Each filter dimension offers the distinct values present in that view,
//! and the default selection picks all of them.

use crate::status::StatusScope;
use crate::types::{FleetDataset, FleetRecord};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Filterable columns, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dimension {
    Status,
    VehicleType,
    Position,
    OriginRegion,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Status,
        Dimension::VehicleType,
        Dimension::Position,
        Dimension::OriginRegion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Status => "STATUS",
            Dimension::VehicleType => "TIPO DE VEÍCULO",
            Dimension::Position => "POSIÇÃO ATUAL",
            Dimension::OriginRegion => "UF DE ORIGEM",
        }
    }

    pub fn value_of(self, r: &FleetRecord) -> Option<&str> {
        match self {
            Dimension::Status => Some(r.status.as_str()),
            Dimension::VehicleType => r.vehicle_type.as_deref(),
            Dimension::Position => r.current_position.as_deref(),
            Dimension::OriginRegion => r.origin_region.as_deref(),
        }
    }
}

/// Records whose status lies in `scope`.
pub fn restrict_to_scope(dataset: &FleetDataset, scope: StatusScope) -> Vec<&FleetRecord> {
    dataset
        .records
        .iter()
        .filter(|r| scope.allows(&r.status))
        .collect()
}

/// Values offered for each dimension, sorted. `origin_regions` stays empty
/// when the sheet has no origin column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub statuses: Vec<String>,
    pub vehicle_types: Vec<String>,
    pub positions: Vec<String>,
    pub origin_regions: Vec<String>,
}

fn distinct(base: &[&FleetRecord], dim: Dimension) -> Vec<String> {
    base.iter()
        .filter_map(|r| dim.value_of(r))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl FilterOptions {
    pub fn from_records(base: &[&FleetRecord], has_origin: bool) -> Self {
        Self {
            statuses: distinct(base, Dimension::Status),
            vehicle_types: distinct(base, Dimension::VehicleType),
            positions: distinct(base, Dimension::Position),
            origin_regions: if has_origin {
                distinct(base, Dimension::OriginRegion)
            } else {
                Vec::new()
            },
        }
    }

    pub fn get(&self, dim: Dimension) -> &[String] {
        match dim {
            Dimension::Status => &self.statuses,
            Dimension::VehicleType => &self.vehicle_types,
            Dimension::Position => &self.positions,
            Dimension::OriginRegion => &self.origin_regions,
        }
    }
}

/// Allowed values per dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub statuses: BTreeSet<String>,
    pub vehicle_types: BTreeSet<String>,
    pub positions: BTreeSet<String>,
    pub origin_regions: BTreeSet<String>,
}

impl FilterSelection {
    /// Everything offered is selected.
    pub fn all_of(options: &FilterOptions) -> Self {
        Self {
            statuses: options.statuses.iter().cloned().collect(),
            vehicle_types: options.vehicle_types.iter().cloned().collect(),
            positions: options.positions.iter().cloned().collect(),
            origin_regions: options.origin_regions.iter().cloned().collect(),
        }
    }

    pub fn get(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::Status => &self.statuses,
            Dimension::VehicleType => &self.vehicle_types,
            Dimension::Position => &self.positions,
            Dimension::OriginRegion => &self.origin_regions,
        }
    }

    pub fn set(&mut self, dim: Dimension, values: BTreeSet<String>) {
        match dim {
            Dimension::Status => self.statuses = values,
            Dimension::VehicleType => self.vehicle_types = values,
            Dimension::Position => self.positions = values,
            Dimension::OriginRegion => self.origin_regions = values,
        }
    }

    /// Status, type and position must be allowed (a missing value never is).
    /// Origin only constrains when the column exists and something is
    /// selected for it; an empty origin set means "any origin".
    pub fn matches(&self, r: &FleetRecord, has_origin: bool) -> bool {
        let allowed = |dim: Dimension| {
            dim.value_of(r)
                .is_some_and(|v| self.get(dim).contains(v))
        };
        if !(allowed(Dimension::Status)
            && allowed(Dimension::VehicleType)
            && allowed(Dimension::Position))
        {
            return false;
        }
        if has_origin && !self.origin_regions.is_empty() {
            return allowed(Dimension::OriginRegion);
        }
        true
    }
}

pub fn apply<'a>(
    base: &[&'a FleetRecord],
    selection: &FilterSelection,
    has_origin: bool,
) -> Vec<&'a FleetRecord> {
    let out: Vec<&FleetRecord> = base
        .iter()
        .copied()
        .filter(|r| selection.matches(r, has_origin))
        .collect();
    debug!(base = base.len(), kept = out.len(), "filters applied");
    out
}
