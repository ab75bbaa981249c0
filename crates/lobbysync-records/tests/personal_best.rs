//! Integration tests for the personal-best store's serialized forms.

use lobbysync_records::{
    PersonalBestStore, Properties, PropertyStore, RankingType, RecordEntry,
    RecordStats,
};

// =========================================================================
// Helpers
// =========================================================================

fn sprint(rule: &str, game_type: i32, time: i32) -> RecordEntry {
    let mut record = RecordEntry::new(rule, "SPRINT 40L", game_type).with_stats(
        RecordStats {
            lines: 40,
            time,
            rollclear: 1,
            pieces: 100,
            ..RecordStats::default()
        },
    );
    record.player_name = "Big Blue".into();
    record.timestamp = "2026/10/15 20:00:00".into();
    record.custom_stats = vec!["pps=1.67".into(), String::new()];
    record
}

fn store_with(n: usize) -> PersonalBestStore {
    let mut store = PersonalBestStore::new("Big Blue");
    for i in 0..n {
        let accepted = store.register_record(
            RankingType::GenericTime,
            sprint(&format!("RULE{i}"), i as i32 % 3, 3000 + i as i32),
        );
        assert!(accepted);
    }
    store
}

// =========================================================================
// String round-trip
// =========================================================================

#[test]
fn test_export_import_round_trip_for_various_sizes() {
    for n in [0, 1, 5] {
        let store = store_with(n);
        let exported = store.export_string().unwrap();

        let mut fresh = PersonalBestStore::default();
        assert_eq!(fresh.import_string(&exported), 0);

        assert_eq!(fresh, store, "store of size {n} should round-trip");
        for (a, b) in fresh.records().iter().zip(store.records()) {
            assert_eq!(a.export_string(), b.export_string());
        }
    }
}

#[test]
fn test_exported_string_is_line_safe() {
    let exported = store_with(3).export_string().unwrap();
    assert!(!exported.contains(['\t', '\n', '\r']));
}

// =========================================================================
// Property round-trip
// =========================================================================

#[test]
fn test_properties_round_trip_through_text() {
    let store = store_with(4);
    let mut props = Properties::new();
    props.set_property("unrelated.setting", "on".into());
    store.write_properties(&mut props).unwrap();

    // Save and reload the property file as text.
    let reloaded = Properties::parse(&props.to_string());

    let mut fresh = PersonalBestStore::new("Big Blue");
    assert_eq!(fresh.read_properties(&reloaded), 0);
    assert_eq!(fresh.records(), store.records());
}

#[test]
fn test_properties_round_trip_for_names_with_separators() {
    for name in ["a=b", "key:value", "line1\nline2", "cr\rname", "back\\slash", " padded "] {
        let mut store = PersonalBestStore::new(name);
        assert!(store.register_record(RankingType::GenericTime, sprint("RULE0", 0, 3000)));
        let mut props = Properties::new();
        store.write_properties(&mut props).unwrap();

        let reloaded = Properties::parse(&props.to_string());

        let mut fresh = PersonalBestStore::new(name);
        assert_eq!(fresh.read_properties(&reloaded), 0, "name {name:?}");
        assert_eq!(fresh.len(), 1, "name {name:?}");
        assert_eq!(fresh.records(), store.records(), "name {name:?}");
    }
}

#[test]
fn test_read_properties_with_huge_count_only_reads_present_keys() {
    let mut props = Properties::new();
    store_with(1).write_properties(&mut props).unwrap();
    props.set_property("sppersonal.Big Blue.numRecords", i32::MAX.to_string());

    let mut store = PersonalBestStore::new("Big Blue");
    let skipped = store.read_properties(&props);

    assert_eq!(store.len(), 1);
    assert_eq!(skipped, i32::MAX as usize - 1);
}

#[test]
fn test_read_properties_ignores_players_whose_name_extends_ours() {
    let mut props = Properties::new();
    store_with(1).write_properties(&mut props).unwrap();
    let mut longer = PersonalBestStore::new("Big Blue.1");
    longer.register_record(RankingType::GenericTime, sprint("OTHER", 0, 1));
    longer.write_properties(&mut props).unwrap();
    props.set_property("sppersonal.Big Blue.numRecords", "2".into());

    let mut store = PersonalBestStore::new("Big Blue");
    assert_eq!(store.read_properties(&props), 1);
    assert_eq!(store.len(), 1);
    assert_eq!(store.records()[0].rule_name, "RULE0");
}

#[test]
fn test_properties_are_namespaced_per_player() {
    let mut props = Properties::new();
    store_with(2).write_properties(&mut props).unwrap();
    let mut other = PersonalBestStore::new("alice");
    other.register_record(RankingType::GenericTime, sprint("R", 0, 1));
    other.write_properties(&mut props).unwrap();

    let mut blue = PersonalBestStore::new("Big Blue");
    blue.read_properties(&props);
    let mut alice = PersonalBestStore::new("alice");
    alice.read_properties(&props);

    assert_eq!(blue.len(), 2);
    assert_eq!(alice.len(), 1);
}

#[test]
fn test_faster_sprint_replaces_record_after_reload() {
    let mut props = Properties::new();
    store_with(1).write_properties(&mut props).unwrap();

    let mut store = PersonalBestStore::new("Big Blue");
    store.read_properties(&props);

    let faster = sprint("RULE0", 0, 2500);
    assert!(store.is_new_record(RankingType::GenericTime, &faster));
    assert!(store.register_record(RankingType::GenericTime, faster));
    assert_eq!(store.get_record("RULE0", "SPRINT 40L", 0).unwrap().stats.time, 2500);
}
