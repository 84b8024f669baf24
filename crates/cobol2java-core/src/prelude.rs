//! Convenient re-exports for downstream crates

pub use crate::diagnostics::ConversionLog;
pub use crate::error::{Cobol2JavaError, Cobol2JavaResult};
pub use crate::naming::{is_java_identifier, normalize_identifier};
pub use crate::types::{ConversionResult, FieldDeclaration, FieldKind, SourceLine, UndeclaredIdentifierSet};
