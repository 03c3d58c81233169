//! Property-based tests for configuration round-trip through ConfigManager

use std::collections::BTreeMap;

use mcstatus_core::config::{
    AppSettings, ConfigManager, EditorSettings, LoggingSettings, ServerDocument, StatusSettings,
    StorageSettings,
};
use proptest::prelude::*;
use tempfile::TempDir;

use super::generators::arb_group;

// ========== Generators ==========

// Strategy for group ids as chat platforms hand them out
fn arb_group_id() -> impl Strategy<Value = String> {
    "[1-9][0-9]{4,10}".prop_map(|s| s)
}

fn arb_document() -> impl Strategy<Value = ServerDocument> {
    prop::collection::btree_map(arb_group_id(), arb_group(), 0..4)
}

fn arb_settings() -> impl Strategy<Value = AppSettings> {
    (
        "[a-z_]{1,12}\\.json",
        "https://[a-z]{3,10}\\.example\\.com/",
        1u64..120,
        prop_oneof![Just("info"), Just("debug"), Just("warn"), Just("mcstatus_core=trace")],
    )
        .prop_map(|(data_file, base_url, query_timeout_secs, level)| AppSettings {
            storage: StorageSettings { data_file },
            editor: EditorSettings { base_url },
            status: StatusSettings { query_timeout_secs },
            logging: LoggingSettings {
                level: level.to_string(),
            },
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Every group in a saved document reads back unchanged
    #[test]
    fn document_round_trip(document in arb_document()) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf());

        manager.save_document(&document).expect("Failed to save document");
        let loaded = manager.load_document().expect("Failed to load document");
        prop_assert_eq!(loaded, document);
    }

    /// Saving one group never disturbs the others
    #[test]
    fn save_group_keeps_other_groups(document in arb_document(), update in arb_group()) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf());
        manager.save_document(&document).expect("Failed to save document");

        manager.save_group("1000", &update).expect("Failed to save group");

        let mut expected: BTreeMap<_, _> = document;
        expected.insert("1000".to_string(), update);
        prop_assert_eq!(manager.load_document().expect("Failed to load document"), expected);
    }

    /// Settings survive a TOML round trip
    #[test]
    fn settings_round_trip(settings in arb_settings()) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf());

        manager.save_settings(&settings).expect("Failed to save settings");
        prop_assert_eq!(manager.load_settings().expect("Failed to load settings"), settings);
    }
}
