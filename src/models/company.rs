//! Company catalog model and resolution result.

use serde::{Deserialize, Serialize};

/// A known legal entity from the company catalog.
///
/// Immutable during pipeline execution; the pipeline only reads the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Database row ID.
    pub id: i64,
    /// Tax identifier (RUC), unique per company.
    pub ruc: String,
    /// Canonical legal name.
    pub name: String,
}

/// Outcome of company resolution for one document.
///
/// `Unknown` is a dedicated marker rather than a magic catalog name, and is
/// persisted as a NULL company reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedCompany {
    Known(Company),
    Unknown,
}

impl ResolvedCompany {
    /// Company row ID to persist, or `None` for the unknown sentinel.
    pub fn company_id(&self) -> Option<i64> {
        match self {
            Self::Known(company) => Some(company.id),
            Self::Unknown => None,
        }
    }

    /// Display name for logs and CLI output.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Known(company) => &company.name,
            Self::Unknown => "desconocido",
        }
    }
}
