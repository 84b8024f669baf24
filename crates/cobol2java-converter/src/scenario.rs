//! Rule-based line scanner
//!
//! Walks the source one line at a time, hands each line to the first
//! [`PatternRule`](crate::patterns::PatternRule) that recognizes it and emits
//! Java fragments plus a log entry per decision. A second pass over the
//! procedure division collects data names that are used but never declared.

use crate::patterns::{Construct, CopyDirective, NumericMove, PatternRules};
use cobol2java_core::naming::normalize_identifier;
use cobol2java_core::{
    Cobol2JavaError, Cobol2JavaResult, ConversionLog, FieldDeclaration, SourceLine, UndeclaredIdentifierSet,
};
use regex::Regex;
use std::collections::HashSet;

/// Header that opens the executable part of a program
pub const PROCEDURE_DIVISION_MARKER: &str = "PROCEDURE DIVISION";

/// Statements whose operands are checked for undeclared data names
pub const STATEMENT_KEYWORDS: &[&str] = &["MOVE", "IF", "PERFORM"];

/// Words that look like data names but never are
pub const RESERVED_KEYWORDS: &[&str] = &[
    "COPY", "REPLACING", "MOVE", "TO", "IF", "ELSE", "END-IF", "PERFORM",
    "UNTIL", "WHILE", "DISPLAY", "ACCEPT", "COMPUTE", "ADD", "SUBTRACT",
    "MULTIPLY", "DIVIDE", "PIC", "VALUE", "SPACES", "ZERO", "ZEROS",
    "IDENTIFICATION", "DATA", "PROCEDURE", "DIVISION", "SECTION",
    "WORKING-STORAGE", "PROGRAM-ID", "STOP", "RUN", "BY", "EQUAL",
];

const SYSVARS_HEADER: &str = "    // === SYSVARS copybook - Undeclared variables ===";
const SYSVARS_FOOTER: &str = "    // === End SYSVARS ===";

/// Everything the scanner produced for one source text
#[derive(Debug, Clone, Default)]
pub struct ScenarioOutput {
    /// Emitted Java fragments joined by newlines
    pub code: String,
    pub log: ConversionLog,
    /// Declarations in source order
    pub declarations: Vec<FieldDeclaration>,
    pub undeclared: UndeclaredIdentifierSet,
}

impl ScenarioOutput {
    /// Whether the scan produced anything besides whitespace
    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }
}

/// Per-call scan state. Never shared between conversions.
#[derive(Debug, Default)]
struct ScanState {
    cursor: usize,
    in_procedure_division: bool,
    fragments: Vec<String>,
    log: ConversionLog,
    declarations: Vec<FieldDeclaration>,
    /// Normalized names of everything declared so far, paragraphs included
    declared: HashSet<String>,
}

impl ScanState {
    fn emit(&mut self, line: &SourceLine, construct: Construct) {
        match construct {
            Construct::CopyReplacing(copy) => self.emit_copy(line, copy),
            Construct::Field(field) => self.emit_field(field),
            Construct::NumericMove(mv) => self.emit_cast(mv),
        }
    }

    fn emit_copy(&mut self, line: &SourceLine, copy: CopyDirective) {
        let CopyDirective { copybook, token, replacement } = copy;
        self.log.record(format!(
            "COPY REPLACING found: {}, replacing :{}: with {}",
            copybook, token, replacement
        ));
        self.fragments.push(format!("    // {}", line.trimmed()));
        self.fragments.push(format!(
            "    // === Copybook {copybook} content (:{token}: replaced with {replacement}) ===\n\n    // === End of copybook {copybook} ==="
        ));
    }

    fn emit_field(&mut self, field: FieldDeclaration) {
        self.log.record(format!(
            "Converted {} variable: {} -> {} {}",
            if field.kind.is_numeric() { "numeric" } else { "string" },
            field.source_name,
            field.kind.java_type(),
            field.identifier
        ));
        self.fragments.push(field.to_java_field());
        self.declared.insert(field.identifier.clone());
        self.declarations.push(field);
    }

    fn emit_cast(&mut self, mv: NumericMove) {
        self.log.record(format!("Applied type casting: MOVE '{}' TO {}", mv.literal, mv.target));
        self.fragments.push(format!(
            "    {} = Integer.parseInt(\"{}\"); // Type cast string to int",
            mv.target_identifier(),
            mv.literal
        ));
    }

    fn emit_unrecognized(&mut self, line: &SourceLine) {
        if !line.is_blank() && !line.is_comment() {
            self.fragments.push(format!("    // {}", line.trimmed()));
        }
    }
}

/// Stateless line scanner. Each call to [`convert`](Self::convert) allocates
/// its own scan state, so one converter can serve concurrent requests.
#[derive(Debug)]
pub struct ScenarioConverter {
    rules: PatternRules,
    data_name: Regex,
    paragraph_label: Regex,
    string_literal: Regex,
    reserved: HashSet<&'static str>,
}

impl ScenarioConverter {
    pub fn new() -> Cobol2JavaResult<Self> {
        Ok(Self {
            rules: PatternRules::new()?,
            data_name: compile("data-name", r"\b[A-Za-z][A-Za-z0-9\-]*[A-Za-z0-9]\b")?,
            paragraph_label: compile(
                "paragraph-label",
                r"(?i)^([A-Z0-9][A-Z0-9\-]*)(?:\s+SECTION)?\s*\.$",
            )?,
            string_literal: compile("string-literal", r#""[^"]*"|'[^']*'"#)?,
            reserved: RESERVED_KEYWORDS.iter().copied().collect(),
        })
    }

    pub fn rules(&self) -> &PatternRules {
        &self.rules
    }

    /// Convert source text into Java fragments and a log trail
    pub fn convert(&self, source: &str) -> ScenarioOutput {
        let lines = SourceLine::split(source);
        let mut state = ScanState::default();

        while state.cursor < lines.len() {
            let line = &lines[state.cursor];
            self.scan_line(&mut state, line);
            state.cursor += 1;
        }

        let undeclared = self.find_undeclared(&lines, &state.declared);
        let mut fragments = Vec::with_capacity(state.fragments.len() + undeclared.len() + 2);

        if !undeclared.is_empty() {
            state.log.record(format!("Undeclared variables found: {}", undeclared));
            fragments.push(SYSVARS_HEADER.to_string());
            for identifier in undeclared.identifiers() {
                fragments.push(format!("    private String {}; // Undeclared variable from SYSVARS", identifier));
            }
            fragments.push(SYSVARS_FOOTER.to_string());
        }
        fragments.append(&mut state.fragments);

        log::debug!(
            "Scanned {} line(s): {} declaration(s), {} undeclared identifier(s)",
            lines.len(),
            state.declarations.len(),
            undeclared.len()
        );

        ScenarioOutput {
            code: fragments.join("\n"),
            log: state.log,
            declarations: state.declarations,
            undeclared,
        }
    }

    /// Dispatch one line to the first matching rule, or keep it as a comment
    fn scan_line(&self, state: &mut ScanState, line: &SourceLine) {
        if is_procedure_division_header(line.trimmed()) {
            state.in_procedure_division = true;
        } else if state.in_procedure_division {
            if let Some(caps) = self.paragraph_label.captures(line.trimmed()) {
                state.declared.insert(normalize_identifier(&caps[1]));
            }
        }

        match self.rules.recognize(line) {
            Some((rule, construct)) => {
                log::trace!("line {}: {} matched {:?}", line.index() + 1, rule.name(), line.raw());
                state.emit(line, construct);
            }
            None => state.emit_unrecognized(line),
        }
    }

    /// Collect data names used by procedure-division statements that were
    /// never declared
    fn find_undeclared(&self, lines: &[SourceLine], declared: &HashSet<String>) -> UndeclaredIdentifierSet {
        let mut undeclared = UndeclaredIdentifierSet::new();
        let mut in_procedure_division = false;

        for line in lines {
            if is_procedure_division_header(line.trimmed()) {
                in_procedure_division = true;
                continue;
            }
            if !in_procedure_division {
                continue;
            }

            let text = self.string_literal.replace_all(line.trimmed(), "\"\"");
            let tokens: Vec<String> = self
                .data_name
                .find_iter(&text)
                .map(|m| m.as_str().to_ascii_uppercase())
                .collect();

            if !tokens.iter().any(|token| STATEMENT_KEYWORDS.contains(&token.as_str())) {
                continue;
            }

            for token in tokens {
                if self.looks_like_data_name(&token) && !declared.contains(&normalize_identifier(&token)) {
                    undeclared.insert(token);
                }
            }
        }

        undeclared
    }

    fn looks_like_data_name(&self, token: &str) -> bool {
        token.len() > 3
            && token.contains('-')
            && !self.reserved.contains(token)
            && !token.ends_with("-DIVISION")
            && !token.ends_with("-SECTION")
    }
}

fn is_procedure_division_header(text: &str) -> bool {
    text.to_ascii_uppercase().contains(PROCEDURE_DIVISION_MARKER)
}

fn compile(name: &str, pattern: &str) -> Cobol2JavaResult<Regex> {
    Regex::new(pattern).map_err(|e| Cobol2JavaError::pattern(name, e))
}
