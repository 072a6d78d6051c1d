use pretty_assertions::assert_eq;
use quotesync_sync::SyncError;
use quotesync_sync::transfer::{export, parse_import};
use quotesync_types::{Quote, QuoteCollection, default_quotes};

// ── parse_import ─────────────────────────────────────────────────

#[test]
fn import_drops_malformed_and_keeps_valid() {
    let batch = parse_import(
        r#"[{"text":"Carpe diem","category":"Motivation"},{"text":"No category"}]"#,
    )
    .unwrap();
    assert_eq!(batch.quotes.as_slice(), &[Quote::new("Carpe diem", "Motivation")]);
    assert_eq!(batch.rejected, 1);
}

#[test]
fn import_with_nothing_valid_is_rejected() {
    let err = parse_import(r#"[{"text":"No category"},42]"#).unwrap_err();
    assert!(matches!(err, SyncError::MalformedImport(_)));
}

#[test]
fn import_of_empty_array_is_rejected() {
    assert!(matches!(
        parse_import("[]"),
        Err(SyncError::MalformedImport(_))
    ));
}

#[test]
fn import_of_non_array_is_rejected() {
    let err = parse_import(r#"{"text":"a","category":"b"}"#).unwrap_err();
    match err {
        SyncError::MalformedImport(msg) => assert!(msg.contains("array")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn import_of_invalid_json_is_rejected() {
    assert!(matches!(
        parse_import("[{"),
        Err(SyncError::MalformedImport(_))
    ));
}

// ── export ───────────────────────────────────────────────────────

#[test]
fn export_is_pretty_json_array() {
    let json = export(&vec![Quote::new("a", "b")].into()).unwrap();
    assert!(json.starts_with("[\n"));
    assert!(json.contains("\"text\": \"a\""));
}

#[test]
fn exported_document_imports_back() {
    let json = export(&default_quotes()).unwrap();
    let batch = parse_import(&json).unwrap();
    assert_eq!(batch.quotes, default_quotes());
    assert_eq!(batch.rejected, 0);
}

#[test]
fn export_of_empty_collection() {
    assert_eq!(export(&QuoteCollection::new()).unwrap(), "[]");
}
