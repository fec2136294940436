// Header reconciliation.
//
// The fleet sheet carries two columns both titled "UF". By convention the
// first one is the origin state and the second the destination state, so a
// pair of "UF" headers is renamed positionally. Every other duplicate gets a
// numeric suffix so labels end up unique.
use crate::types::{COL_DESTINATION, COL_ORIGIN};
use std::collections::HashSet;

pub const REGION_LABEL: &str = "UF";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnReport {
    pub labels: Vec<String>,
    /// Set to the number of "UF" columns when there are more than two; the
    /// origin/destination pairing is skipped in that case.
    pub ambiguous_region_columns: Option<usize>,
}

/// Make `labels` unique, applying the origin/destination convention.
pub fn reconcile(labels: &[String]) -> ColumnReport {
    let mut out: Vec<String> = labels.to_vec();
    let mut ambiguous_region_columns = None;

    // Duplicated labels in first-seen order.
    let mut seen: HashSet<&str> = HashSet::new();
    let mut dups: Vec<&str> = Vec::new();
    for l in labels {
        if !seen.insert(l.as_str()) && !dups.contains(&l.as_str()) {
            dups.push(l.as_str());
        }
    }

    for dup in dups {
        let positions: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.as_str() == dup)
            .map(|(i, _)| i)
            .collect();

        if dup == REGION_LABEL && positions.len() == 2 {
            out[positions[0]] = COL_ORIGIN.to_string();
            out[positions[1]] = COL_DESTINATION.to_string();
            continue;
        }
        if dup == REGION_LABEL {
            ambiguous_region_columns = Some(positions.len());
        }

        let mut suffix = 1usize;
        for &pos in positions.iter().skip(1) {
            let mut candidate = format!("{}_{}", dup, suffix);
            while out.contains(&candidate) {
                suffix += 1;
                candidate = format!("{}_{}", dup, suffix);
            }
            out[pos] = candidate;
            suffix += 1;
        }
    }

    ColumnReport {
        labels: out,
        ambiguous_region_columns,
    }
}
