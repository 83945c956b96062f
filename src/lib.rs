//! contpal - business report ingestion and word frequency analysis.
//!
//! Core library exposing the ingestion pipeline: text extraction with OCR
//! fallback, company and fiscal year resolution, stopword-filtered word
//! counting, and year-scoped count accumulation backed by SQLite.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod models;
pub mod ocr;
pub mod repository;
pub mod services;
