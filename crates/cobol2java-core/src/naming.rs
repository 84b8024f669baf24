//! Identifier normalization shared by every emitter
//!
//! COBOL data names are upper-case words joined with dashes. Java fields
//! use the same words lower-cased and joined with underscores.

/// Separator used between words of a COBOL data name
pub const COBOL_SEPARATOR: char = '-';

/// Separator used between words of the emitted Java identifier
pub const JAVA_SEPARATOR: char = '_';

/// Map a COBOL data name to its Java field identifier.
///
/// Pure and total: every input maps to exactly one output, and applying it to
/// an already-normalized identifier leaves it unchanged.
///
/// ```
/// use cobol2java_core::naming::normalize_identifier;
///
/// assert_eq!(normalize_identifier("ACCOUNT-BALANCE"), "account_balance");
/// ```
pub fn normalize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c == COBOL_SEPARATOR { JAVA_SEPARATOR } else { c })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Check whether a string is usable as a Java identifier
pub fn is_java_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_account_balance() {
        assert_eq!(normalize_identifier("ACCOUNT-BALANCE"), "account_balance");
    }

    #[test]
    fn test_normalize_is_deterministic_and_stable() {
        let once = normalize_identifier("WS-CUST-ID-2");
        assert_eq!(once, normalize_identifier("WS-CUST-ID-2"));
        assert_eq!(once, "ws_cust_id_2");
        assert_eq!(normalize_identifier(&once), once);
    }

    #[test]
    fn test_normalize_without_separator() {
        assert_eq!(normalize_identifier("TOTAL"), "total");
        assert_eq!(normalize_identifier(""), "");
    }

    #[test]
    fn test_java_identifier_check() {
        assert!(is_java_identifier("ConvertedCobol"));
        assert!(is_java_identifier("_process$Data1"));
        assert!(!is_java_identifier("1stClass"));
        assert!(!is_java_identifier("has-dash"));
        assert!(!is_java_identifier(""));
    }
}
