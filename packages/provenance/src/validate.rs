//! Consistency checks between place references and provenance text.

use std::fmt;

use gazetteer_provenance_models::ProvenanceDatum;
use gazetteer_resolver_models::LookupOptions;
use thiserror::Error;

const RULE: &str = "--------------------------------";

/// A problem with a single place reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvenanceIssue {
    #[error("Missing URI for {label}")]
    MissingUri { label: String },

    #[error("Could not find {label} in provenance text")]
    LabelNotInText { label: String },
}

/// Every issue found in one datum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub id: String,
    pub title: String,
    pub issues: Vec<ProvenanceIssue>,
}

impl ValidationReport {
    /// Checks every reference of `datum`.
    #[must_use]
    pub fn for_datum(datum: &ProvenanceDatum) -> Self {
        let mut issues = Vec::new();

        for (label, uri) in datum.references() {
            if uri.is_empty() {
                issues.push(ProvenanceIssue::MissingUri {
                    label: label.to_string(),
                });
            }
            if !datum.provenance.contains(label) {
                issues.push(ProvenanceIssue::LabelNotInText {
                    label: label.to_string(),
                });
            }
        }

        Self {
            id: datum.id.clone(),
            title: datum.title.clone(),
            issues,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Renders nothing for a valid datum, otherwise a header, a rule line, and
/// one issue per line followed by a blank line.
impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return Ok(());
        }

        writeln!(f, "Errors for {} ({}):", self.title, self.id)?;
        writeln!(f, "{RULE}")?;
        for issue in &self.issues {
            writeln!(f, "{issue}")?;
        }
        writeln!(f)
    }
}

/// Returns whether every reference of `datum` has a URI and a label that
/// occurs in its provenance text.
///
/// When `options.verbose` is set, a failing report is logged.
#[must_use]
pub fn validate(datum: &ProvenanceDatum, options: &LookupOptions) -> bool {
    let report = ValidationReport::for_datum(datum);
    if !report.is_valid() && options.verbose {
        log::warn!("{report}");
    }
    report.is_valid()
}

/// Validates every datum, returning the failing reports.
///
/// An empty result means all data are valid.
#[must_use]
pub fn validate_all(data: &[ProvenanceDatum], options: &LookupOptions) -> Vec<ValidationReport> {
    data.iter()
        .map(ValidationReport::for_datum)
        .filter(|report| !report.is_valid())
        .inspect(|report| {
            if options.verbose {
                log::warn!("{report}");
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use gazetteer_resolver::testing;

    use super::*;

    fn datum(provenance: &str, references: &[(&str, Option<&str>)]) -> ProvenanceDatum {
        ProvenanceDatum {
            id: "7".to_string(),
            title: "Still Life".to_string(),
            provenance: provenance.to_string(),
            places: references
                .iter()
                .map(|(label, uri)| {
                    BTreeMap::from([((*label).to_string(), uri.map(String::from))])
                })
                .collect(),
        }
    }

    #[test]
    fn valid_datum_has_empty_report() {
        let datum = datum(
            "Sold in Paris, France, 1901.",
            &[("Paris, France", Some("https://example.org/101/751/119/101751119.geojson"))],
        );
        let report = ValidationReport::for_datum(&datum);

        assert!(report.is_valid());
        assert_eq!(report.to_string(), "");
        assert!(validate(&datum, &testing::options("validate_ok")));
    }

    #[test]
    fn missing_label_and_uri_are_reported_together() {
        let datum = datum(
            "Sold in Paris.",
            &[
                ("Lyon", Some("https://example.org/101/751/127/101751127.geojson")),
                ("Paris", None),
            ],
        );
        let report = ValidationReport::for_datum(&datum);

        assert_eq!(
            report.issues,
            vec![
                ProvenanceIssue::LabelNotInText {
                    label: "Lyon".to_string()
                },
                ProvenanceIssue::MissingUri {
                    label: "Paris".to_string()
                },
            ]
        );
        assert_eq!(
            report.to_string(),
            "Errors for Still Life (7):\n\
             --------------------------------\n\
             Could not find Lyon in provenance text\n\
             Missing URI for Paris\n\n"
        );
        assert!(!validate(&datum, &testing::options("validate_bad")));
    }

    #[test]
    fn validate_all_keeps_only_failures() {
        let good = datum("Paris", &[("Paris", Some("https://example.org/1.geojson"))]);
        let bad = datum("Paris", &[("Oakland", Some("https://example.org/2.geojson"))]);
        let options = testing::options("validate_all");

        assert!(validate_all(&[good.clone()], &options).is_empty());

        let failures = validate_all(&[good, bad], &options);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].issues.len(), 1);
    }
}
