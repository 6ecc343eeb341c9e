use ep_store::*;

fn fresh_store(name: &str) -> LocalStore {
    let temp_dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&temp_dir);
    LocalStore::new(temp_dir).unwrap()
}

fn record(value: f64, timestamp: &str) -> PredictionRecord {
    PredictionRecord {
        predicted_value_kwh: value,
        model: "xgb".to_string(),
        timestamp: timestamp.to_string(),
        features: vec![210.0, 0.0, 1.0, 500.0],
        house_id: None,
        date: None,
        appliance_usage: Default::default(),
    }
}

#[test]
fn save_and_load_appliances() {
    let store = fresh_store("ep_store_test_appliances");
    assert!(store.load_appliances().unwrap().is_empty());

    let list = vec![
        ApplianceEntry {
            name: "Fan".to_string(),
            power: 70.0,
            hours: 8.0,
            qty: 3.0,
        },
        ApplianceEntry {
            name: "Fridge".to_string(),
            power: 150.0,
            hours: 24.0,
            qty: 1.0,
        },
    ];
    store.save_appliances(&list).unwrap();

    let loaded = store.load_appliances().unwrap();
    assert_eq!(loaded, list);

    let raw = store.get_item(keys::APPLIANCES).unwrap().unwrap();
    assert!(raw.starts_with('['));
}

#[test]
fn history_is_newest_first_and_capped() {
    let store = fresh_store("ep_store_test_history");

    for i in 0..(HISTORY_LIMIT + 5) {
        store
            .push_history(record(i as f64, &format!("2026-10-17T12:{:02}:00Z", i % 60)))
            .unwrap();
    }

    let history = store.load_history().unwrap();
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history[0].predicted_value_kwh, (HISTORY_LIMIT + 4) as f64);
    assert_eq!(history.last().unwrap().predicted_value_kwh, 5.0);
}

#[test]
fn clear_history_removes_key() {
    let store = fresh_store("ep_store_test_clear");
    store.push_history(record(1.0, "2026-10-17T12:00:00Z")).unwrap();
    store.clear_history().unwrap();
    assert!(store.get_item(keys::PREDICTION_HISTORY).unwrap().is_none());
    assert!(store.load_history().unwrap().is_empty());

    // Clearing twice is fine.
    store.clear_history().unwrap();
}

#[test]
fn corrupt_history_surfaces_json_error() {
    let store = fresh_store("ep_store_test_corrupt");
    store.set_item(keys::PREDICTION_HISTORY, "{not json").unwrap();
    assert!(matches!(store.load_history(), Err(StoreError::Json(_))));
}

#[test]
fn theme_preference_roundtrip() {
    let store = fresh_store("ep_store_test_theme");
    assert_eq!(store.theme().unwrap(), None);

    store.set_theme(Theme::Dark).unwrap();
    assert_eq!(store.theme().unwrap(), Some(Theme::Dark));
    assert_eq!(store.get_item(keys::THEME).unwrap().as_deref(), Some("dark"));

    store.set_item(keys::THEME, "purple").unwrap();
    assert!(store.theme().is_err());
}
