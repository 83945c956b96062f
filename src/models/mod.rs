//! Domain models for documents, companies, and word counts.

mod company;
mod document;

pub use company::{Company, ResolvedCompany};
pub use document::{Document, DocumentFormat};
