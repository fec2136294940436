use crate::filter::Dimension;
use crate::status::{KpiBucket, ORDERED_STATUSES};
use crate::types::{CountRow, DashboardSummary, FleetRecord, KpiCounts, KpiRow};
use std::collections::HashMap;

/// Count tables, KPIs and availability for one filtered view.
pub fn summarize(filtered: &[&FleetRecord], has_origin: bool) -> DashboardSummary {
    let kpis = kpi_counts(filtered);
    DashboardSummary {
        status_table: status_table(filtered),
        type_table: count_by(filtered, Dimension::VehicleType),
        position_table: count_by(filtered, Dimension::Position),
        origin_table: has_origin.then(|| count_by(filtered, Dimension::OriginRegion)),
        availability_rate: availability_rate(&kpis),
        kpis,
    }
}

/// Counts in taxonomy order. Statuses with no vehicles, and statuses
/// outside the taxonomy, are left out.
pub fn status_table(records: &[&FleetRecord]) -> Vec<CountRow> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.status.as_str()).or_default() += 1;
    }
    ORDERED_STATUSES
        .iter()
        .filter_map(|s| {
            counts.get(s).filter(|c| **c > 0).map(|c| CountRow {
                value: s.to_string(),
                count: *c,
            })
        })
        .collect()
}

/// Distinct non-missing values of `dim`, most frequent first. Ties keep
/// the order in which values were first seen.
pub fn count_by(records: &[&FleetRecord], dim: Dimension) -> Vec<CountRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<CountRow> = Vec::new();
    for v in records.iter().filter_map(|r| dim.value_of(r)) {
        match index.get(v) {
            Some(&i) => rows[i].count += 1,
            None => {
                index.insert(v, rows.len());
                rows.push(CountRow {
                    value: v.to_string(),
                    count: 1,
                });
            }
        }
    }
    // sort_by is stable, so first-seen order survives among equal counts.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

pub fn kpi_counts(records: &[&FleetRecord]) -> KpiCounts {
    let count = |b: KpiBucket| records.iter().filter(|r| b.contains(&r.status)).count();
    KpiCounts {
        total: records.len(),
        in_operation: count(KpiBucket::InOperation),
        available: count(KpiBucket::Available),
        maintenance: count(KpiBucket::Maintenance),
    }
}

/// Share of vehicles not in maintenance, in percent. Anything that is not
/// MANUTENÇÃO counts as available here, which is wider than the
/// `Available` bucket.
pub fn availability_rate(kpis: &KpiCounts) -> f64 {
    if kpis.total == 0 {
        return 0.0;
    }
    (kpis.total - kpis.maintenance) as f64 / kpis.total as f64 * 100.0
}

impl KpiCounts {
    pub fn get(&self, bucket: KpiBucket) -> usize {
        match bucket {
            KpiBucket::Total => self.total,
            KpiBucket::InOperation => self.in_operation,
            KpiBucket::Available => self.available,
            KpiBucket::Maintenance => self.maintenance,
        }
    }

    pub fn rows(&self) -> Vec<KpiRow> {
        KpiBucket::ALL
            .iter()
            .map(|b| KpiRow {
                kpi: b.label().to_string(),
                count: self.get(*b),
            })
            .collect()
    }
}
