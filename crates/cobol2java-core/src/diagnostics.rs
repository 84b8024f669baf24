//! Conversion log trail
//!
//! Every transformation decision is recorded as a human-readable entry. The
//! trail is append-only and keeps entries in the order they were recorded;
//! it is returned to the caller alongside the generated code. Each entry is
//! also mirrored to the `log` facade so it shows up in diagnostic output.

use std::fmt;

const LOG_TARGET: &str = "cobol2java::trail";

/// Append-only, ordered record of conversion decisions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionLog {
    entries: Vec<String>,
}

impl ConversionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry
    pub fn record<S: Into<String>>(&mut self, entry: S) {
        let entry = entry.into();
        log::debug!(target: LOG_TARGET, "{}", entry);
        self.entries.push(entry);
    }

    /// Append entries from another stage, preserving their order
    pub fn extend<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for entry in entries {
            self.record(entry);
        }
    }

    /// Append the whole trail of another log
    pub fn append(&mut self, other: ConversionLog) {
        self.extend(other.entries);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries joined by newlines
    pub fn joined(&self) -> String {
        self.entries.join("\n")
    }
}

impl fmt::Display for ConversionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}
