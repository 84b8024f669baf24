//! Conversion orchestration
//!
//! A conversion walks a forward-only state machine:
//!
//! ```text
//! RequestGeneration ──ok──> SanitizeCandidate ──good──> MergeScenarios ──> Repair ──> Done
//!        │                         │                         │               ^
//!        └──error──> FallbackOnly <┴──poor quality───────────┘               │
//!                         └──────────────────────────────────────────────────┘
//! ```
//!
//! The generator is called at most once. Every path ends in `Done` with some
//! Java text and a log trail; nothing on the way is fatal.

use crate::config::ConverterConfig;
use crate::generator::{GeneratorError, TextGenerator};
use crate::prompt::build_prompt;
use crate::repair::CodeRepairer;
use crate::sanitizer::ResponseSanitizer;
use crate::scenario::{ScenarioConverter, ScenarioOutput};
use cobol2java_core::{Cobol2JavaError, Cobol2JavaResult, ConversionLog, ConversionResult};
use regex::Regex;

pub const POOR_QUALITY_LOG: &str = "AI response was poor quality, using rule-based conversion.";
pub const MISSING_CLASS_LOG: &str =
    "AI response was poor quality (no class declaration to merge into), using rule-based conversion.";
pub const CANDIDATE_FIXES_LOG: &str = "Applied Java code fixes (string comparison, incomplete OR patterns).";
pub const FALLBACK_FIXES_LOG: &str = "Applied Java code fixes to fallback conversion.";

/// A line that opens a class declaration, optionally after modifiers
const CLASS_DECLARATION_LINE: &str =
    r"(?m)^[ \t]*(?:(?:public|protected|private|abstract|final|static)\s+)*class\s+[A-Za-z_$]";

/// States of one conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RequestGeneration,
    SanitizeCandidate,
    MergeScenarios,
    FallbackOnly,
    Repair,
    Done,
}

/// Why the rule-based path was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    GeneratorUnavailable,
    LowQualityCandidate,
}

#[derive(Debug)]
enum State {
    RequestGeneration,
    SanitizeCandidate { raw: String },
    MergeScenarios { candidate: String },
    FallbackOnly { reason: FallbackReason },
    Repair { code: String, after_generator_failure: bool },
    Done { code: String },
}

impl State {
    fn stage(&self) -> Stage {
        match self {
            State::RequestGeneration => Stage::RequestGeneration,
            State::SanitizeCandidate { .. } => Stage::SanitizeCandidate,
            State::MergeScenarios { .. } => Stage::MergeScenarios,
            State::FallbackOnly { .. } => Stage::FallbackOnly,
            State::Repair { .. } => Stage::Repair,
            State::Done { .. } => Stage::Done,
        }
    }
}

/// Result of a run together with the stages it went through
#[derive(Debug, Clone)]
pub struct ConversionRun {
    pub result: ConversionResult,
    pub stages: Vec<Stage>,
    pub fallback: Option<FallbackReason>,
}

/// Wrap rule-based fragments in a minimal class with one placeholder method
pub fn wrap_in_class_skeleton(body: &str, class_name: &str, method_name: &str) -> String {
    format!(
        "public class {class_name} {{\n{body}\n\n    public void {method_name}() {{\n        \
         // Main processing logic converted from COBOL\n        \
         // TODO: Implement business logic\n    }}\n}}"
    )
}

/// Composes the generator, sanitizer, scanner and repairer.
///
/// Holds no per-request state: every [`convert`](Self::convert) call builds
/// its own log and buffers, so one orchestrator can be shared across threads.
pub struct ConversionOrchestrator {
    config: ConverterConfig,
    generator: Box<dyn TextGenerator>,
    scenario: ScenarioConverter,
    sanitizer: ResponseSanitizer,
    repairer: CodeRepairer,
    class_declaration: Regex,
}

impl ConversionOrchestrator {
    /// Create an orchestrator with the default configuration
    pub fn new(generator: Box<dyn TextGenerator>) -> Cobol2JavaResult<Self> {
        Self::with_config(ConverterConfig::default(), generator)
    }

    /// Create an orchestrator with a custom configuration
    pub fn with_config(config: ConverterConfig, generator: Box<dyn TextGenerator>) -> Cobol2JavaResult<Self> {
        config.validate()?;

        Ok(Self {
            sanitizer: ResponseSanitizer::with_skip_phrases(&config.skip_phrases),
            scenario: ScenarioConverter::new()?,
            repairer: CodeRepairer::new()?,
            class_declaration: Regex::new(CLASS_DECLARATION_LINE)
                .map_err(|e| Cobol2JavaError::pattern("class-declaration", e))?,
            config,
            generator,
        })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn scenario_converter(&self) -> &ScenarioConverter {
        &self.scenario
    }

    pub fn repairer(&self) -> &CodeRepairer {
        &self.repairer
    }

    /// Convert COBOL source to Java. Always produces output.
    pub fn convert(&self, source: &str) -> ConversionResult {
        self.run(source).result
    }

    /// Convert and report which stages were visited
    pub fn run(&self, source: &str) -> ConversionRun {
        let mut log = ConversionLog::new();
        let mut stages = Vec::new();
        let mut fallback = None;
        let mut state = State::RequestGeneration;

        let code = loop {
            stages.push(state.stage());
            log::info!("Conversion stage: {:?}", state.stage());

            state = match state {
                State::RequestGeneration => match self.request_generation(source) {
                    Ok(raw) => State::SanitizeCandidate { raw },
                    Err(e) => {
                        log::warn!("Generator '{}' failed: {}", self.generator.name(), e);
                        log.record(format!("Generator invocation failed: {}", e));
                        State::FallbackOnly { reason: FallbackReason::GeneratorUnavailable }
                    }
                },
                State::SanitizeCandidate { raw } => {
                    let candidate = self.sanitizer.sanitize(&raw);
                    if self.is_acceptable(&candidate) {
                        State::MergeScenarios { candidate }
                    } else {
                        log::warn!("Rejected generator output ({} characters after cleanup)", candidate.len());
                        log.record(POOR_QUALITY_LOG);
                        State::FallbackOnly { reason: FallbackReason::LowQualityCandidate }
                    }
                }
                State::MergeScenarios { candidate } => match self.merge_scenarios(source, candidate) {
                    Some((code, scenario_log)) => {
                        log.record(format!("Converted using {} model.", self.generator.name()));
                        log.append(scenario_log);
                        State::Repair { code, after_generator_failure: false }
                    }
                    None => {
                        log::warn!("Generator output has no class declaration to merge into");
                        log.record(MISSING_CLASS_LOG);
                        State::FallbackOnly { reason: FallbackReason::LowQualityCandidate }
                    }
                },
                State::FallbackOnly { reason } => {
                    fallback = Some(reason);
                    let output = self.scenario.convert(source);
                    log.append(output.log);
                    State::Repair {
                        code: wrap_in_class_skeleton(&output.code, &self.config.class_name, &self.config.method_name),
                        after_generator_failure: reason == FallbackReason::GeneratorUnavailable,
                    }
                }
                State::Repair { code, after_generator_failure } => {
                    let repaired = self.repairer.repair(&code);
                    log.record(if after_generator_failure { FALLBACK_FIXES_LOG } else { CANDIDATE_FIXES_LOG });
                    State::Done { code: repaired }
                }
                State::Done { code } => break code,
            };
        };

        ConversionRun {
            result: ConversionResult::new(code, log.joined()),
            stages,
            fallback,
        }
    }

    fn request_generation(&self, source: &str) -> Result<String, GeneratorError> {
        let prompt = build_prompt(source);
        let params = self.config.generation_params();
        log::debug!(
            "Requesting generation from '{}' (max_tokens={}, temperature={})",
            self.generator.name(),
            params.max_tokens,
            params.temperature
        );
        self.generator.generate(&prompt, &params)
    }

    /// Quality gate for sanitized generator output
    fn is_acceptable(&self, candidate: &str) -> bool {
        if candidate.is_empty() || candidate.chars().count() < self.config.min_candidate_length {
            return false;
        }
        let lower = candidate.to_lowercase();
        !self
            .config
            .low_quality_markers
            .iter()
            .any(|marker| lower.contains(&marker.to_lowercase()))
    }

    /// Splice the rule-based fragments in front of the line declaring the
    /// candidate's class. `None` when there is something to splice but no
    /// declaration line to put it before.
    fn merge_scenarios(&self, source: &str, candidate: String) -> Option<(String, ConversionLog)> {
        let ScenarioOutput { code: fragments, log, .. } = self.scenario.convert(source);

        if fragments.trim().is_empty() {
            return Some((candidate, ConversionLog::new()));
        }

        let at = self.class_declaration.find(&candidate)?.start();
        let mut merged = String::with_capacity(candidate.len() + fragments.len() + 2);
        merged.push_str(&candidate[..at]);
        merged.push_str(&fragments);
        merged.push_str("\n\n");
        merged.push_str(&candidate[at..]);
        Some((merged, log))
    }
}

impl std::fmt::Debug for ConversionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionOrchestrator")
            .field("config", &self.config)
            .field("generator", &self.generator.name())
            .finish()
    }
}
