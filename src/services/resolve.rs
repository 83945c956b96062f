//! Fiscal year detection and fuzzy company resolution.
//!
//! A report rarely names its company in a clean, canonical form: OCR noise,
//! punctuation and legal suffixes ("CIA LTDA") get in the way of exact
//! substring matching. Resolution therefore uses a normalized similarity
//! ratio over single tokens first, then over sliding windows as wide as the
//! company name itself.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Company, ResolvedCompany};

/// Four-digit year tokens in the 1900-2099 range.
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(20\d{2}|19\d{2})\b").unwrap());

/// Detect the fiscal year from extracted text.
///
/// The first 19xx/20xx token wins. Returns 0 when no year token is present;
/// that is the explicit "undetected" marker, not an error.
pub fn detect_year(text: &str) -> u32 {
    YEAR_RE
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Resolve the best-matching company from the catalog.
///
/// Companies are scanned in catalog order and the first one clearing the
/// similarity threshold wins. Per candidate: every whitespace token of the
/// text is compared against the lowercased company name; if none matches, a
/// window of the name's own token width slides over the text. Falls back to
/// the unknown sentinel when no candidate reaches the threshold.
pub fn resolve_company(text: &str, companies: &[Company], threshold: f64) -> ResolvedCompany {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    for company in companies {
        let name = company.name.to_lowercase();
        if name_matches(&tokens, &name, threshold) {
            return ResolvedCompany::Known(company.clone());
        }
    }

    ResolvedCompany::Unknown
}

/// Two-pass fuzzy match of a company name against tokenized text.
fn name_matches(tokens: &[&str], name: &str, threshold: f64) -> bool {
    // Pass 1: single tokens, catches one-word company names.
    for token in tokens {
        if strsim::normalized_levenshtein(name, token) >= threshold {
            return true;
        }
    }

    // Pass 2: windows as wide as the name's own token count, catches
    // multi-word names split across the text.
    let width = name.split_whitespace().count();
    if width < 2 || tokens.len() < width {
        return false;
    }
    for window in tokens.windows(width) {
        let fragment = window.join(" ");
        if strsim::normalized_levenshtein(name, &fragment) >= threshold {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Company> {
        vec![
            Company {
                id: 1,
                ruc: "1790012345001".to_string(),
                name: "Plasticos Rival".to_string(),
            },
            Company {
                id: 2,
                ruc: "0990054321001".to_string(),
                name: "Telconet".to_string(),
            },
        ]
    }

    #[test]
    fn test_detect_year_first_match_wins() {
        assert_eq!(detect_year("informe del año 2021 sobre el ejercicio 2020"), 2021);
    }

    #[test]
    fn test_detect_year_nineteen_hundreds() {
        assert_eq!(detect_year("acta fundacional de 1987"), 1987);
    }

    #[test]
    fn test_detect_year_absent() {
        assert_eq!(detect_year("informe sin fecha alguna"), 0);
    }

    #[test]
    fn test_detect_year_ignores_out_of_range_tokens() {
        assert_eq!(detect_year("serie 1899 lote 2100"), 0);
    }

    #[test]
    fn test_resolve_multi_word_name_via_window() {
        let resolved = resolve_company(
            "INFORME ANUAL PLASTICOS RIVAL CIA LTDA EJERCICIO 2021",
            &catalog(),
            0.8,
        );
        assert_eq!(resolved.display_name(), "Plasticos Rival");
    }

    #[test]
    fn test_resolve_single_word_name_via_token() {
        let resolved = resolve_company("memoria anual de telconet s.a.", &catalog(), 0.8);
        assert_eq!(resolved.display_name(), "Telconet");
    }

    #[test]
    fn test_resolve_falls_back_to_sentinel() {
        let resolved = resolve_company("texto sin ninguna entidad conocida", &catalog(), 0.8);
        assert_eq!(resolved, ResolvedCompany::Unknown);
        assert_eq!(resolved.company_id(), None);
    }

    #[test]
    fn test_resolve_tolerates_minor_noise() {
        // One OCR-mangled character still clears the 0.8 threshold.
        let resolved = resolve_company("proveedor telc0net factura", &catalog(), 0.8);
        assert_eq!(resolved.display_name(), "Telconet");
    }

    #[test]
    fn test_catalog_order_breaks_ties() {
        let companies = vec![
            Company {
                id: 1,
                ruc: "1".to_string(),
                name: "Andina".to_string(),
            },
            Company {
                id: 2,
                ruc: "2".to_string(),
                name: "Andina".to_string(),
            },
        ];
        let resolved = resolve_company("grupo andina", &companies, 0.8);
        assert_eq!(resolved.company_id(), Some(1));
    }
}
