//! Status taxonomy and KPI classification.
//!
//! Status literals are matched exactly (after normalization they are already
//! trimmed and upper-cased). Diacritics are part of the literal.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub const MAINTENANCE: &str = "MANUTENÇÃO";
pub const AVAILABLE_UNCREWED: &str = "DISPONÍVEIS NÃO TRIPULADO";
pub const LOADED: &str = "CARREGADO";
pub const RETURNING_AVAILABLE: &str = "RETORNANDO DISPONÍVEIS";
pub const AVAILABLE_CREWED: &str = "DISPONÍVEIS TRIPULADO";
pub const BRANCH_SUPPORT: &str = "APOIO FILIAL";
pub const UNAVAILABLE: &str = "INDISPONÍVEIS";
pub const OUT_OF_SERVICE: &str = "FORA DE OPERAÇÃO";
pub const RETURNING_UNAVAILABLE: &str = "RETORNANDO INDISPONÍVEIS";

pub const CORE_STATUSES: [&str; 6] = [
    MAINTENANCE,
    AVAILABLE_UNCREWED,
    LOADED,
    RETURNING_AVAILABLE,
    AVAILABLE_CREWED,
    BRANCH_SUPPORT,
];

pub const ADDITIONAL_STATUSES: [&str; 3] = [UNAVAILABLE, OUT_OF_SERVICE, RETURNING_UNAVAILABLE];

/// Display order: core statuses followed by the additional ones.
pub const ORDERED_STATUSES: [&str; 9] = [
    MAINTENANCE,
    AVAILABLE_UNCREWED,
    LOADED,
    RETURNING_AVAILABLE,
    AVAILABLE_CREWED,
    BRANCH_SUPPORT,
    UNAVAILABLE,
    OUT_OF_SERVICE,
    RETURNING_UNAVAILABLE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Core,
    Additional,
}

static GROUPS: Lazy<HashMap<&'static str, Group>> = Lazy::new(|| {
    CORE_STATUSES
        .iter()
        .map(|s| (*s, Group::Core))
        .chain(ADDITIONAL_STATUSES.iter().map(|s| (*s, Group::Additional)))
        .collect()
});

static BUCKETS: Lazy<HashMap<&'static str, KpiBucket>> = Lazy::new(|| {
    HashMap::from([
        (LOADED, KpiBucket::InOperation),
        (RETURNING_AVAILABLE, KpiBucket::InOperation),
        (AVAILABLE_CREWED, KpiBucket::Available),
        (AVAILABLE_UNCREWED, KpiBucket::Available),
        (MAINTENANCE, KpiBucket::Maintenance),
    ])
});

pub fn is_core(status: &str) -> bool {
    GROUPS.get(status) == Some(&Group::Core)
}

pub fn is_additional(status: &str) -> bool {
    GROUPS.get(status) == Some(&Group::Additional)
}

pub fn is_recognized(status: &str) -> bool {
    GROUPS.contains_key(status)
}

/// Position of a status in `ORDERED_STATUSES`.
pub fn display_rank(status: &str) -> Option<usize> {
    ORDERED_STATUSES.iter().position(|s| *s == status)
}

/// Summary categories shown as the four KPI cards. Buckets overlap: every
/// status is in `Total`, and some statuses are in no other bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KpiBucket {
    Total,
    InOperation,
    Available,
    Maintenance,
}

impl KpiBucket {
    pub const ALL: [KpiBucket; 4] = [
        KpiBucket::Total,
        KpiBucket::InOperation,
        KpiBucket::Available,
        KpiBucket::Maintenance,
    ];

    pub fn contains(self, status: &str) -> bool {
        match self {
            KpiBucket::Total => true,
            other => bucket_of(status) == Some(other),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KpiBucket::Total => "TOTAL DE VEÍCULOS",
            KpiBucket::InOperation => "EM OPERAÇÃO",
            KpiBucket::Available => "DISPONÍVEIS",
            KpiBucket::Maintenance => "MANUTENÇÃO",
        }
    }
}

impl fmt::Display for KpiBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The narrowest bucket a status belongs to, `None` if only `Total` applies.
pub fn bucket_of(status: &str) -> Option<KpiBucket> {
    BUCKETS.get(status).copied()
}

/// Which part of the taxonomy the dashboard works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StatusScope {
    #[default]
    Core,
    All,
}

impl StatusScope {
    /// Unrecognized statuses are outside every scope.
    pub fn allows(self, status: &str) -> bool {
        match self {
            StatusScope::Core => is_core(status),
            StatusScope::All => is_recognized(status),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            StatusScope::Core => StatusScope::All,
            StatusScope::All => StatusScope::Core,
        }
    }
}

/// Row highlight category for table views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StyleTag {
    Maintenance,
    Available,
    Neutral,
}

impl StyleTag {
    pub fn as_str(self) -> &'static str {
        match self {
            StyleTag::Maintenance => "maintenance",
            StyleTag::Available => "available",
            StyleTag::Neutral => "neutral",
        }
    }
}

pub fn style_tag(status: &str) -> StyleTag {
    match bucket_of(status) {
        Some(KpiBucket::Maintenance) => StyleTag::Maintenance,
        Some(KpiBucket::Available) => StyleTag::Available,
        _ => StyleTag::Neutral,
    }
}
