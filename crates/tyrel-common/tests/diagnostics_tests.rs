use super::*;

#[test]
fn test_format_message_replaces_placeholders() {
    let text = format_message("Type '{0}' is not assignable to type '{1}'.", &["string", "number"]);
    assert_eq!(text, "Type 'string' is not assignable to type 'number'.");
}

#[test]
fn test_from_code_uses_message_table() {
    let diag = Diagnostic::from_code(7, diagnostic_codes::CANNOT_FIND_NAME, &["Foo"]);
    assert_eq!(diag.node, 7);
    assert_eq!(diag.code, 2304);
    assert_eq!(diag.category, DiagnosticCategory::Error);
    assert_eq!(diag.message_text, "Cannot find name 'Foo'.");
}

#[test]
fn test_every_code_has_a_unique_entry() {
    let mut seen = rustc_hash::FxHashSet::default();
    for message in DIAGNOSTIC_MESSAGES {
        assert!(seen.insert(message.code), "duplicate code {}", message.code);
    }
}

#[test]
fn test_related_information_is_appended() {
    let diag = Diagnostic::error(1, "outer".to_string(), 2322).with_related(
        NO_NODE,
        2326,
        "Types of property 'a' are incompatible.".to_string(),
    );
    assert_eq!(diag.related_information.len(), 1);
    assert_eq!(diag.related_information[0].category, DiagnosticCategory::Message);
    let json = serde_json::to_string(&diag).unwrap();
    assert!(json.contains("related_information"));
}

#[test]
fn test_related_information_is_skipped_when_empty() {
    let diag = Diagnostic::error(1, "plain".to_string(), 2322);
    let json = serde_json::to_string(&diag).unwrap();
    assert!(!json.contains("related_information"));
}
