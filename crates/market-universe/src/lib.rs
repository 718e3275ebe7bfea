//! Market Universe
//!
//! Turns raw brokerage payloads into typed snapshot records and derives the
//! per-symbol views the opportunity engine consumes: the freshest metrics
//! record and a clean price series, both as of a target date.

pub mod ingest;
pub mod select;

pub use ingest::{panel_rows, record_from_panel, record_from_quote};
pub use select::{latest_metrics_by_symbol, price_series_by_symbol};
