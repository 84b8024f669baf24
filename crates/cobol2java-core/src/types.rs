//! Data model for COBOL to Java conversion

use crate::naming::normalize_identifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One line of COBOL source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    index: usize,
    raw: String,
    trimmed: String,
}

impl SourceLine {
    pub fn new<S: Into<String>>(index: usize, raw: S) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim().to_string();
        Self { index, raw, trimmed }
    }

    /// Split newline-delimited source text into lines, keeping empty ones
    pub fn split(source: &str) -> Vec<SourceLine> {
        source
            .split('\n')
            .enumerate()
            .map(|(index, raw)| SourceLine::new(index, raw.strip_suffix('\r').unwrap_or(raw)))
            .collect()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn trimmed(&self) -> &str {
        &self.trimmed
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed.is_empty()
    }

    /// Comment lines carry a `*` indicator once the sequence area is stripped
    pub fn is_comment(&self) -> bool {
        self.trimmed.starts_with('*')
    }
}

/// Storage class of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// `PIC 9(n)`
    Numeric { digits: u32 },
    /// `PIC X(n)`
    Text { length: u32 },
}

impl FieldKind {
    /// Java type emitted for this kind
    pub fn java_type(&self) -> &'static str {
        match self {
            FieldKind::Numeric { .. } => "int",
            FieldKind::Text { .. } => "String",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Numeric { .. })
    }
}

/// A recognized data-division field declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    /// Nesting level number (01, 05, 77 ...)
    pub level: u32,
    /// Data name as written in the source
    pub source_name: String,
    /// Normalized Java identifier
    pub identifier: String,
    pub kind: FieldKind,
    /// Initial value from the VALUE clause, already in Java literal form
    pub initial_value: Option<String>,
}

impl FieldDeclaration {
    pub fn new<S: Into<String>>(level: u32, source_name: S, kind: FieldKind) -> Self {
        let source_name = source_name.into();
        let identifier = normalize_identifier(&source_name);
        Self {
            level,
            source_name,
            identifier,
            kind,
            initial_value: None,
        }
    }

    pub fn with_initial_value<S: Into<String>>(mut self, value: S) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// Initial value used in the emitted field, falling back to the kind's default
    pub fn effective_initial_value(&self) -> String {
        match (&self.initial_value, self.kind) {
            (Some(value), _) => value.clone(),
            (None, FieldKind::Numeric { .. }) => "0".to_string(),
            (None, FieldKind::Text { .. }) => "\"\"".to_string(),
        }
    }

    /// Render the Java field statement, with a trailing comment on its origin
    pub fn to_java_field(&self) -> String {
        let comment = match self.kind {
            FieldKind::Numeric { .. } => format!("Level {:02} numeric variable", self.level),
            FieldKind::Text { length } => format!("Level {:02} string variable, length {}", self.level, length),
        };
        format!(
            "    private {} {} = {}; // {}",
            self.kind.java_type(),
            self.identifier,
            self.effective_initial_value(),
            comment
        )
    }
}

/// Identifiers referenced in the procedure division but never declared.
///
/// Deduplicated and always iterated in sorted order, whatever order the
/// references were found in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndeclaredIdentifierSet {
    names: BTreeSet<String>,
}

impl UndeclaredIdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the name was not already present
    pub fn insert<S: Into<String>>(&mut self, name: S) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Source names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Normalized Java identifiers, in the order of their source names
    pub fn identifiers(&self) -> impl Iterator<Item = String> + '_ {
        self.names.iter().map(|name| normalize_identifier(name))
    }
}

impl<S: Into<String>> FromIterator<S> for UndeclaredIdentifierSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl fmt::Display for UndeclaredIdentifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Final output of one conversion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Generated Java source
    pub java_code: String,
    /// Log trail, one entry per line in the order the entries were recorded
    pub log: String,
}

impl ConversionResult {
    pub fn new<C: Into<String>, L: Into<String>>(java_code: C, log: L) -> Self {
        Self {
            java_code: java_code.into(),
            log: log.into(),
        }
    }

    pub fn log_lines(&self) -> impl Iterator<Item = &str> {
        self.log.lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_line_split_keeps_indices() {
        let lines = SourceLine::split("  01 A PIC 9(1).\r\n\n* note");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].trimmed(), "01 A PIC 9(1).");
        assert_eq!(lines[0].raw(), "  01 A PIC 9(1).");
        assert!(lines[1].is_blank());
        assert!(lines[2].is_comment());
        assert_eq!(lines[2].index(), 2);
    }

    #[test]
    fn test_numeric_field_rendering() {
        let field = FieldDeclaration::new(1, "WS-COUNT", FieldKind::Numeric { digits: 3 })
            .with_initial_value("5");
        assert_eq!(field.identifier, "ws_count");
        assert_eq!(field.to_java_field(), "    private int ws_count = 5; // Level 01 numeric variable");
    }

    #[test]
    fn test_text_field_defaults_to_empty() {
        let field = FieldDeclaration::new(5, "WS-NAME", FieldKind::Text { length: 10 });
        assert_eq!(
            field.to_java_field(),
            "    private String ws_name = \"\"; // Level 05 string variable, length 10"
        );
    }

    #[test]
    fn test_undeclared_set_sorted_and_deduplicated() {
        let set: UndeclaredIdentifierSet = ["CUST-ID", "ACCT-NO", "CUST-ID"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "ACCT-NO, CUST-ID");
        assert_eq!(set.identifiers().collect::<Vec<_>>(), vec!["acct_no", "cust_id"]);
    }
}
