use pretty_assertions::assert_eq;
use proptest::prelude::*;
use quotesync_sync::{Conflict, DiffResult, diff};
use quotesync_types::{Quote, QuoteCollection};
use std::collections::BTreeMap;

fn q(text: &str, category: &str) -> Quote {
    Quote::new(text, category)
}

fn coll(quotes: &[(&str, &str)]) -> QuoteCollection {
    quotes.iter().map(|(t, c)| q(t, c)).collect()
}

// ── Scenarios ────────────────────────────────────────────────────

#[test]
fn conflict_and_addition_scenario() {
    let local = coll(&[("Life is a journey", "Life")]);
    let server = coll(&[
        ("Life is a journey", "Wisdom"),
        ("Carpe diem", "Motivation"),
    ]);

    let result = diff(&server, &local);

    assert_eq!(
        result,
        DiffResult {
            added: vec![q("Carpe diem", "Motivation")],
            removed: vec![],
            conflicts: vec![Conflict {
                text: "Life is a journey".into(),
                local_category: "Life".into(),
                server_category: "Wisdom".into(),
            }],
        }
    );
}

#[test]
fn both_empty_is_empty() {
    let result = diff(&QuoteCollection::new(), &QuoteCollection::new());
    assert!(result.is_empty());
    assert_eq!(result.change_count(), 0);
}

#[test]
fn local_only_quotes_are_removed() {
    let local = coll(&[("a", "x"), ("b", "y")]);
    let server = coll(&[("a", "x")]);
    let result = diff(&server, &local);
    assert_eq!(result.removed, vec![q("b", "y")]);
    assert!(result.added.is_empty());
    assert!(result.conflicts.is_empty());
}

#[test]
fn identical_entries_produce_nothing() {
    let both = coll(&[("a", "x"), ("b", "y")]);
    assert!(diff(&both, &both).is_empty());
}

#[test]
fn order_does_not_matter() {
    let local = coll(&[("a", "x"), ("b", "y")]);
    let server = coll(&[("b", "y"), ("a", "x")]);
    assert!(diff(&server, &local).is_empty());
}

#[test]
fn later_duplicate_shadows_earlier_in_lookup() {
    // Local has the same text twice; the lookup keeps the last category.
    let local = coll(&[("a", "old"), ("a", "new")]);
    let server = coll(&[("a", "new")]);
    assert!(diff(&server, &local).is_empty());

    let server = coll(&[("a", "old")]);
    let result = diff(&server, &local);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].local_category, "new");
}

#[test]
fn change_count_sums_all_classes() {
    let local = coll(&[("a", "x"), ("gone", "z")]);
    let server = coll(&[("a", "y"), ("new", "w")]);
    assert_eq!(diff(&server, &local).change_count(), 3);
}

#[test]
fn serializes_with_camel_case_conflict_fields() {
    let result = diff(&coll(&[("a", "s")]), &coll(&[("a", "l")]));
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "added": [],
            "removed": [],
            "conflicts": [{"text": "a", "localCategory": "l", "serverCategory": "s"}]
        })
    );
}

// ── Properties ───────────────────────────────────────────────────

fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z ]{1,12}").unwrap()
}

fn category_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Life", "Wisdom", "Motivation", "Success"])
        .prop_map(str::to_string)
}

/// Collections with unique texts (the diff key).
fn unique_collection() -> impl Strategy<Value = QuoteCollection> {
    prop::collection::btree_map(text_strategy(), category_strategy(), 0..12).prop_map(
        |m: BTreeMap<String, String>| m.into_iter().map(|(t, c)| Quote::new(t, c)).collect(),
    )
}

proptest! {
    #[test]
    fn disjoint_texts_add_everything_and_remove_everything(
        server in unique_collection(),
        local in unique_collection(),
    ) {
        // Make the text sets disjoint.
        let server: QuoteCollection = server
            .into_iter()
            .map(|q| Quote::new(format!("s:{}", q.text), q.category))
            .collect();
        let local: QuoteCollection = local
            .into_iter()
            .map(|q| Quote::new(format!("l:{}", q.text), q.category))
            .collect();

        let result = diff(&server, &local);
        prop_assert_eq!(result.added, server.into_vec());
        prop_assert_eq!(result.removed, local.into_vec());
        prop_assert!(result.conflicts.is_empty());
    }

    #[test]
    fn diff_with_itself_is_empty(local in unique_collection()) {
        prop_assert!(diff(&local, &local).is_empty());
    }

    #[test]
    fn recategorised_quote_is_exactly_one_conflict(
        local in unique_collection(),
        text in "[A-Z]{3,8}",
    ) {
        let mut local = local;
        local.push(Quote::new(text.clone(), "Before"));
        let mut server = local.clone().into_vec();
        if let Some(last) = server.last_mut() {
            last.category = "After".to_string();
        }
        let server: QuoteCollection = server.into();

        let result = diff(&server, &local);
        prop_assert_eq!(result.conflicts.len(), 1);
        prop_assert_eq!(&result.conflicts[0].text, &text);
        prop_assert_eq!(&result.conflicts[0].local_category, "Before");
        prop_assert_eq!(&result.conflicts[0].server_category, "After");
        prop_assert!(result.added.iter().all(|q| q.text != text));
        prop_assert!(result.removed.iter().all(|q| q.text != text));
    }
}
