//! Cross-module tests for the core data model

use crate::prelude::*;

#[test]
fn test_declaration_identifier_matches_normalization() {
    for name in ["WS-COUNT", "ACCOUNT-BALANCE", "X", "A-B-C-D"] {
        let field = FieldDeclaration::new(1, name, FieldKind::Numeric { digits: 1 });
        assert_eq!(field.identifier, normalize_identifier(name));
    }
}

#[test]
fn test_conversion_result_serializes_both_parts() {
    let mut log = ConversionLog::new();
    log.record("Converted numeric variable: WS-COUNT -> int ws_count");
    log.record("Applied Java code fixes to fallback conversion.");

    let result = ConversionResult::new("public class ConvertedCobol {\n}", log.joined());
    assert_eq!(result.log_lines().count(), 2);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["java_code"], "public class ConvertedCobol {\n}");
    assert!(json["log"].as_str().unwrap().contains("WS-COUNT"));
}

#[test]
fn test_undeclared_set_independent_of_insertion_order() {
    let forward: UndeclaredIdentifierSet = ["B-ONE", "A-TWO", "C-THREE"].into_iter().collect();
    let backward: UndeclaredIdentifierSet = ["C-THREE", "A-TWO", "B-ONE", "A-TWO"].into_iter().collect();
    assert_eq!(forward, backward);
    assert_eq!(forward.to_string(), "A-TWO, B-ONE, C-THREE");
}
