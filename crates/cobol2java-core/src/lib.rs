//! Core types and errors for COBOL to Java conversion
//!
//! Shared by the converter pipeline and the command-line front end.

pub mod error;
pub mod types;
pub mod naming;
pub mod diagnostics;
pub mod prelude;

#[cfg(test)]
mod tests;

pub use error::*;
pub use types::{ConversionResult, FieldDeclaration, FieldKind, SourceLine, UndeclaredIdentifierSet};
pub use naming::normalize_identifier;
pub use diagnostics::ConversionLog;
