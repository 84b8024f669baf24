//! COBOL to Java conversion pipeline
//!
//! Combines an optional text generator with a deterministic, line-oriented
//! pattern scanner. Generator output is sanitized and merged with the
//! rule-based fragments; when the generator fails or answers poorly the
//! rule-based output is used on its own. Either way the final text goes
//! through the same string-comparison repairs.
//!
//! This is best-effort pattern recognition, not a COBOL parser.

pub mod config;
pub mod generator;
pub mod orchestrator;
pub mod patterns;
pub mod prompt;
pub mod repair;
pub mod sanitizer;
pub mod scenario;


pub use config::{ConfigError, ConverterConfig};
pub use generator::{CommandGenerator, FixedGenerator, GenerationParams, GeneratorError, TextGenerator, UnavailableGenerator};
pub use orchestrator::{wrap_in_class_skeleton, ConversionOrchestrator, ConversionRun, FallbackReason, Stage};
pub use patterns::{Construct, PatternRule, PatternRules};
pub use repair::CodeRepairer;
pub use sanitizer::ResponseSanitizer;
pub use scenario::{ScenarioConverter, ScenarioOutput};

use cobol2java_core::{Cobol2JavaResult, ConversionResult};

/// Convert COBOL source with the given generator and default settings
pub fn convert_cobol_to_java<G: TextGenerator + 'static>(source: &str, generator: G) -> Cobol2JavaResult<ConversionResult> {
    let orchestrator = ConversionOrchestrator::new(Box::new(generator))?;
    Ok(orchestrator.convert(source))
}

/// Convert COBOL source using only the rule-based path
pub fn convert_rule_based(source: &str) -> Cobol2JavaResult<ConversionResult> {
    convert_cobol_to_java(source, UnavailableGenerator::default())
}
