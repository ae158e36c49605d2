//! Per-row diagnostics collected over a run.
//!
//! Row issues never abort the batch. Fatal ones exclude their row from
//! output; the rest are warnings attached to a row that is still emitted.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowIssue {
    #[error("Row {line}: Missing {field}")]
    MissingField { line: usize, field: &'static str },

    #[error("Row {line}: No valid services (must match the service catalog)")]
    NoValidServices { line: usize },

    #[error("Row {line}: Invalid service '{service}' dropped (check spelling/capitalization)")]
    InvalidService { line: usize, service: String },

    #[error("Row {line}: Failed to geocode {postal_code}, contractor may not receive mission notifications")]
    GeocodeNotFound { line: usize, postal_code: String },
}

impl RowIssue {
    pub fn line(&self) -> usize {
        match self {
            RowIssue::MissingField { line, .. }
            | RowIssue::NoValidServices { line }
            | RowIssue::InvalidService { line, .. }
            | RowIssue::GeocodeNotFound { line, .. } => *line,
        }
    }

    /// Fatal issues exclude the row from output.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RowIssue::MissingField { .. } | RowIssue::NoValidServices { .. }
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub rows_read: usize,
    pub errors: Vec<RowIssue>,
    pub warnings: Vec<RowIssue>,
}

impl RunReport {
    pub fn push(&mut self, issue: RowIssue) {
        if issue.is_fatal() {
            self.errors.push(issue);
        } else {
            self.warnings.push(issue);
        }
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = RowIssue>) {
        for issue in issues {
            self.push(issue);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of distinct rows excluded from output.
    pub fn rejected_rows(&self) -> usize {
        let mut lines: Vec<usize> = self.errors.iter().map(RowIssue::line).collect();
        lines.dedup();
        lines.len()
    }

    pub fn geocode_misses(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, RowIssue::GeocodeNotFound { .. }))
            .count()
    }

    pub fn log(&self) {
        for warning in &self.warnings {
            tracing::warn!("⚠️  {}", warning);
        }
        for error in &self.errors {
            tracing::error!("❌ {}", error);
        }
    }
}
