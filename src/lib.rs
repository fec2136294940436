//! Fleet control tower: ingest the fleet status sheet, normalize it and
//! compute the filtered dashboard aggregates.
//!
//! Pipeline: [`loader::read_sheet`] → [`columns::reconcile`] →
//! [`loader::normalize`] → [`filter::apply`] → [`reports::summarize`].
//! [`session::Session`] ties the steps together with a parse cache.

pub mod cache;
pub mod columns;
pub mod config;
pub mod drilldown;
pub mod error;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod output;
pub mod reports;
pub mod session;
pub mod status;
pub mod types;
pub mod util;

pub use error::{FleetError, Result};
pub use types::{DashboardSummary, FleetDataset, FleetRecord, RawTable};
