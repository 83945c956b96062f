//! Service layer for the ingestion pipeline.
//!
//! Domain logic separated from CLI concerns: entity resolution and the
//! bundle orchestrator.

pub mod ingest;
pub mod resolve;

pub use ingest::{IngestError, IngestReport, IngestService};
pub use resolve::{detect_year, resolve_company};
