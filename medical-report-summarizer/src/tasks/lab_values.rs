use crate::error::{ReportError, Result};
use crate::models::LabValues;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::debug;

/// One row of the lab pattern table. Capture group 1 holds the value.
#[derive(Debug, Clone, Copy)]
pub struct LabPattern {
    pub name: &'static str,
    pub pattern: &'static str,
}

/// Lab markers recognised in report text, searched in this order.
pub const DEFAULT_LAB_PATTERNS: &[LabPattern] = &[
    LabPattern {
        name: "Hemoglobin",
        pattern: r"Hemoglobin\s*[:\-]?\s*(\d+\.?\d*)",
    },
    LabPattern {
        name: "WBC",
        pattern: r"WBC\s*[:\-]?\s*(\d+\.?\d*)",
    },
    LabPattern {
        name: "Platelets",
        pattern: r"Platelets?\s*[:\-]?\s*(\d+\.?\d*)",
    },
    LabPattern {
        name: "RBC",
        pattern: r"RBC\s*[:\-]?\s*(\d+\.?\d*)",
    },
];

static DEFAULT_EXTRACTOR: LazyLock<LabValueExtractor> = LazyLock::new(|| {
    LabValueExtractor::new(DEFAULT_LAB_PATTERNS.iter().copied())
        .expect("default lab patterns must compile")
});

/// Searches text with a compiled, case-insensitive pattern table.
#[derive(Debug, Clone)]
pub struct LabValueExtractor {
    patterns: Vec<(String, Regex)>,
}

impl LabValueExtractor {
    pub fn new(patterns: impl IntoIterator<Item = LabPattern>) -> Result<Self> {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                RegexBuilder::new(p.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (p.name.to_string(), re))
                    .map_err(|source| ReportError::InvalidPattern {
                        name: p.name.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// First match per pattern, recorded verbatim. Unmatched names are absent.
    pub fn extract(&self, text: &str) -> LabValues {
        let mut results = LabValues::new();
        for (name, re) in &self.patterns {
            let value = re
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str());
            if let Some(value) = value {
                debug!("Found lab value {} = {}", name, value);
                results.insert(name.as_str(), value);
            }
        }
        results
    }
}

/// Extracts the default lab markers from report text.
pub fn extract_lab_values(text: &str) -> LabValues {
    DEFAULT_EXTRACTOR.extract(text)
}
