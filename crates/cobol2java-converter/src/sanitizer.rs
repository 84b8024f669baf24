//! Cleanup of free-form generator output
//!
//! Model responses mix Java with markdown fences and chatty explanations.
//! The sanitizer keeps only lines that look like Java source.

/// Phrases that mark a line as explanation rather than code
pub const DEFAULT_SKIP_PHRASES: &[&str] = &[
    "here is the converted",
    "note that",
    "i've used",
    "the logic of",
    "fibonacci",
    "scanner",
    "console",
];

/// Keywords whose first appearance switches the sanitizer into code mode
pub const CODE_KEYWORDS: &[&str] = &["class ", "public ", "private ", "protected "];

/// Markers that make a line worth keeping once in code mode
pub const STRUCTURAL_MARKERS: &[&str] = &[
    "{", "}", ";", "System.out", "return", "if ", "else", "for", "while",
];

const FENCE: &str = "```";

#[derive(Debug, Clone)]
pub struct ResponseSanitizer {
    skip_phrases: Vec<String>,
}

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self::with_skip_phrases(DEFAULT_SKIP_PHRASES.iter().copied())
    }

    /// Use a custom explanatory-phrase list, matched case-insensitively
    pub fn with_skip_phrases<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            skip_phrases: phrases.into_iter().map(|p| p.as_ref().to_lowercase()).collect(),
        }
    }

    pub fn skip_phrases(&self) -> &[String] {
        &self.skip_phrases
    }

    /// Reduce a raw response to the lines that look like Java
    pub fn sanitize(&self, raw: &str) -> String {
        let text = strip_fences(raw);
        let mut in_code = false;
        let mut kept = Vec::new();

        for line in text.split('\n') {
            if self.is_explanation(line) {
                continue;
            }

            if CODE_KEYWORDS.iter().any(|k| line.contains(k)) {
                in_code = true;
                kept.push(line);
            } else if in_code && (is_comment(line) || has_structural_marker(line)) {
                kept.push(line);
            }
        }

        log::debug!("Sanitizer kept {} line(s) of generator output", kept.len());
        kept.join("\n").trim().to_string()
    }

    fn is_explanation(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.skip_phrases.iter().any(|phrase| lower.contains(phrase.as_str()))
    }
}

impl Default for ResponseSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove markdown code fences, with an optional `java` tag and the
/// whitespace that follows each fence
fn strip_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        rest = rest.strip_prefix("java").unwrap_or(rest);
        rest = rest.trim_start();
    }
    out.push_str(rest);
    out
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*')
}

fn has_structural_marker(line: &str) -> bool {
    !line.trim().is_empty() && STRUCTURAL_MARKERS.iter().any(|m| line.contains(m))
}
