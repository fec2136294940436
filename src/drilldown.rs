// KPI drill-down: the vehicles behind one KPI card, with a status picker
// and a free-text search across every column.
use crate::filter::Dimension;
use crate::reports::count_by;
use crate::status::KpiBucket;
use crate::types::{CountRow, FleetRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillDown {
    pub bucket: KpiBucket,
    /// Exact status to keep; `None` shows every status in the bucket.
    pub status: Option<String>,
    pub query: String,
}

impl DrillDown {
    pub fn new(bucket: KpiBucket) -> Self {
        Self {
            bucket,
            status: None,
            query: String::new(),
        }
    }
}

/// Vehicles of the filtered view that fall in `bucket`.
pub fn members<'a>(filtered: &[&'a FleetRecord], bucket: KpiBucket) -> Vec<&'a FleetRecord> {
    filtered
        .iter()
        .copied()
        .filter(|r| bucket.contains(&r.status))
        .collect()
}

/// Per-status counts, most frequent first. Empty when the members share a
/// single status, since the breakdown adds nothing then.
pub fn status_breakdown(members: &[&FleetRecord]) -> Vec<CountRow> {
    let rows = count_by(members, Dimension::Status);
    if rows.len() > 1 {
        rows
    } else {
        Vec::new()
    }
}

/// Sorted distinct statuses among the members, for the status picker.
pub fn status_choices(members: &[&FleetRecord]) -> Vec<String> {
    let mut v: Vec<String> = members.iter().map(|r| r.status.clone()).collect();
    v.sort();
    v.dedup();
    v
}

/// Case-insensitive substring match against every field, extras included.
pub fn matches_query(r: &FleetRecord, query: &str) -> bool {
    let needle = query.trim().to_uppercase();
    if needle.is_empty() {
        return true;
    }
    let text_hit = [
        r.plate.as_deref(),
        Some(r.status.as_str()),
        r.vehicle_type.as_deref(),
        r.current_position.as_deref(),
        r.driver.as_deref(),
        r.operation.as_deref(),
        r.origin_region.as_deref(),
        r.destination_region.as_deref(),
        r.final_destination.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|v| v.contains(&needle));
    text_hit
        || r
            .extras
            .iter()
            .any(|(_, c)| c.to_string().to_uppercase().contains(&needle))
}

pub fn apply<'a>(filtered: &[&'a FleetRecord], dd: &DrillDown) -> Vec<&'a FleetRecord> {
    members(filtered, dd.bucket)
        .into_iter()
        .filter(|r| dd.status.as_deref().map_or(true, |s| r.status == s))
        .filter(|r| matches_query(r, &dd.query))
        .collect()
}
