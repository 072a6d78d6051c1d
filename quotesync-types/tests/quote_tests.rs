use quotesync_types::Quote;
use serde_json::json;

// ── Construction ─────────────────────────────────────────────────

#[test]
fn new_sets_fields() {
    let q = Quote::new("Carpe diem", "Motivation");
    assert_eq!(q.text, "Carpe diem");
    assert_eq!(q.category, "Motivation");
}

#[test]
fn display_includes_text_and_category() {
    let q = Quote::new("Carpe diem", "Motivation");
    assert_eq!(q.to_string(), "\"Carpe diem\" (Motivation)");
}

// ── from_value ───────────────────────────────────────────────────

#[test]
fn from_value_accepts_well_formed_object() {
    let q = Quote::from_value(&json!({"text": "a", "category": "b"})).unwrap();
    assert_eq!(q, Quote::new("a", "b"));
}

#[test]
fn from_value_ignores_extra_fields() {
    let q = Quote::from_value(&json!({"text": "a", "category": "b", "id": 7})).unwrap();
    assert_eq!(q, Quote::new("a", "b"));
}

#[test]
fn from_value_rejects_missing_category() {
    let err = Quote::from_value(&json!({"text": "a"})).unwrap_err();
    assert!(err.contains("category"));
}

#[test]
fn from_value_rejects_non_string_text() {
    let err = Quote::from_value(&json!({"text": 42, "category": "b"})).unwrap_err();
    assert!(err.contains("number"));
}

#[test]
fn from_value_rejects_non_object() {
    assert!(Quote::from_value(&json!("just a string")).is_err());
    assert!(Quote::from_value(&json!(null)).is_err());
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serializes_as_text_and_category() {
    let value = serde_json::to_value(Quote::new("a", "b")).unwrap();
    assert_eq!(value, json!({"text": "a", "category": "b"}));
}
