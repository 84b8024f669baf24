//! Recognizers for COBOL declaration and statement shapes
//!
//! Each rule pairs a name with a compiled pattern and an extractor that turns
//! the pattern's captures into a [`Construct`]. Rules are pure: one trimmed
//! source line in, a construct or nothing out. [`PatternRules`] keeps them in
//! the fixed priority order the scanner tries them in, so supporting a new
//! construct means adding a row to the catalog.

use cobol2java_core::{Cobol2JavaError, Cobol2JavaResult, FieldDeclaration, FieldKind, SourceLine};
use cobol2java_core::naming::normalize_identifier;
use regex::{Captures, Regex};

pub const COPY_REPLACING: &str = "copy-replacing";
pub const NUMERIC_DECLARATION: &str = "numeric-declaration";
pub const TEXT_DECLARATION: &str = "text-declaration";
pub const NUMERIC_MOVE: &str = "numeric-move";

/// Keywords that fill a text field with blanks
const BLANK_FILL_KEYWORDS: &[&str] = &["SPACES", "SPACE"];

/// `COPY <book> REPLACING ==:<token>:== BY ==<replacement>==`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyDirective {
    pub copybook: String,
    pub token: String,
    pub replacement: String,
}

/// `MOVE "<digits>" TO <target>`: a quoted number moved into a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericMove {
    pub literal: String,
    pub target: String,
}

impl NumericMove {
    pub fn target_identifier(&self) -> String {
        normalize_identifier(&self.target)
    }
}

/// A construct recognized on a single source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    CopyReplacing(CopyDirective),
    Field(FieldDeclaration),
    NumericMove(NumericMove),
}

type Extractor = fn(&Captures<'_>) -> Option<Construct>;

/// A named pattern and the extractor for its captures
pub struct PatternRule {
    name: &'static str,
    pattern: Regex,
    extract: Extractor,
}

impl PatternRule {
    fn new(name: &'static str, pattern: &str, extract: Extractor) -> Cobol2JavaResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Cobol2JavaError::pattern(name, e))?;
        Ok(Self { name, pattern, extract })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Try this rule against one line of trimmed source text
    pub fn recognize(&self, text: &str) -> Option<Construct> {
        let captures = self.pattern.captures(text)?;
        (self.extract)(&captures)
    }
}

impl std::fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// The fixed catalog of line recognizers, in priority order
#[derive(Debug)]
pub struct PatternRules {
    rules: Vec<PatternRule>,
}

impl PatternRules {
    /// Build the catalog: copy-with-substitution, numeric declaration, text
    /// declaration, then numeric move.
    pub fn new() -> Cobol2JavaResult<Self> {
        let rules = vec![
            PatternRule::new(
                COPY_REPLACING,
                r"(?i)^COPY\s+([A-Z0-9][A-Z0-9\-]*)\s+REPLACING\s+==:([A-Z0-9\-]+):==\s+BY\s+==([A-Z0-9\-]+)==",
                extract_copy_replacing,
            )?,
            PatternRule::new(
                NUMERIC_DECLARATION,
                r"(?i)^(\d+)\s+([A-Z0-9\-]+)\s+PIC\s+9\((\d+)\)(?:\s+VALUE\s+(\d+))?\s*\.",
                extract_numeric_declaration,
            )?,
            PatternRule::new(
                TEXT_DECLARATION,
                r#"(?i)^(\d+)\s+([A-Z0-9\-]+)\s+PIC\s+X\((\d+)\)(?:\s+VALUE\s+("[^"]*"|'[^']*'|[A-Z0-9]+))?\s*\."#,
                extract_text_declaration,
            )?,
            PatternRule::new(
                NUMERIC_MOVE,
                r#"(?i)\bMOVE\s+['"](\d+)['"]\s+TO\s+([A-Z0-9\-]+)"#,
                extract_numeric_move,
            )?,
        ];

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Look up a rule by name
    pub fn get(&self, name: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// First rule that recognizes the line, with what it recognized
    pub fn recognize(&self, line: &SourceLine) -> Option<(&PatternRule, Construct)> {
        self.rules
            .iter()
            .find_map(|rule| rule.recognize(line.trimmed()).map(|construct| (rule, construct)))
    }
}

fn extract_copy_replacing(caps: &Captures<'_>) -> Option<Construct> {
    Some(Construct::CopyReplacing(CopyDirective {
        copybook: caps.get(1)?.as_str().to_string(),
        token: caps.get(2)?.as_str().to_string(),
        replacement: caps.get(3)?.as_str().to_string(),
    }))
}

fn extract_numeric_declaration(caps: &Captures<'_>) -> Option<Construct> {
    let level = caps.get(1)?.as_str().parse().ok()?;
    let digits = caps.get(3)?.as_str().parse().ok()?;
    let mut field = FieldDeclaration::new(level, caps.get(2)?.as_str(), FieldKind::Numeric { digits });
    if let Some(value) = caps.get(4) {
        field = field.with_initial_value(value.as_str());
    }
    Some(Construct::Field(field))
}

fn extract_text_declaration(caps: &Captures<'_>) -> Option<Construct> {
    let level = caps.get(1)?.as_str().parse().ok()?;
    let length = caps.get(3)?.as_str().parse().ok()?;
    let mut field = FieldDeclaration::new(level, caps.get(2)?.as_str(), FieldKind::Text { length });
    if let Some(value) = caps.get(4) {
        field = field.with_initial_value(java_string_literal(value.as_str()));
    }
    Some(Construct::Field(field))
}

fn extract_numeric_move(caps: &Captures<'_>) -> Option<Construct> {
    Some(Construct::NumericMove(NumericMove {
        literal: caps.get(1)?.as_str().to_string(),
        target: caps.get(2)?.as_str().to_string(),
    }))
}

/// Turn a VALUE clause operand into a Java string literal
fn java_string_literal(value: &str) -> String {
    if BLANK_FILL_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(value)) {
        return "\"\"".to_string();
    }

    let inner = if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    };

    format!("\"{}\"", inner.replace('\\', "\\\\").replace('"', "\\\""))
}
