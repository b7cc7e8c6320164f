use bounty_core::{RewardInputs, RewardMode, RngState};
use bounty_data::{
    load_characters, load_engine_config, load_roster, validate_roster, RosterEntry,
    CHARACTERS_FILE, ENGINE_CONFIG_FILE,
};
use std::fs;
use std::path::PathBuf;

fn assets_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("assets")
}

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bounty-data-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    let path = dir.join(name);
    fs::write(&path, contents).expect("write scratch file");
    path
}

#[test]
fn asset_roster_loads_and_validates() {
    let entries = load_roster(&assets_root().join(CHARACTERS_FILE)).expect("load roster");
    assert!(entries.len() >= 4);
    assert!(validate_roster(&entries).is_empty());
    let dragon = entries
        .iter()
        .find_map(|entry| entry.character().filter(|c| c.id == "1"))
        .expect("dragon present");
    assert_eq!(dragon.reward_mode, RewardMode::Indeterminate);
    assert_eq!(dragon.bounds(), Some((65_000_000, 75_000_000)));
}

#[test]
fn asset_engine_config_matches_defaults() {
    let config = load_engine_config(&assets_root().join(ENGINE_CONFIG_FILE)).expect("load config");
    assert_eq!(config.inputs(), RewardInputs::default());
    assert_eq!(config.seed, None);
}

#[test]
fn missing_engine_config_falls_back_to_defaults() {
    let config = load_engine_config(&assets_root().join("no-such-engine.json")).expect("defaults");
    assert_eq!(config.base_value, 1000.0);
    assert_eq!(config.user_id, "anonymous");
}

#[test]
fn partial_engine_config_fills_defaults() {
    let path = scratch_file("engine-partial.json", r#"{"level": 4, "seed": 7}"#);
    let config = load_engine_config(&path).expect("load config");
    assert_eq!(config.level, 4.0);
    assert_eq!(config.base_value, 1000.0);
    assert_eq!(config.seed, Some(7));
}

#[test]
fn unknown_mode_row_resolves_to_zero() {
    let path = scratch_file(
        "roster-unknown.json",
        r#"[
            {"id": "2", "name": "Goblin", "rewardMode": "fixed", "fixedValue": 5000},
            {"id": "9", "name": "Mystery", "rewardMode": "jackpot", "fixedValue": 10}
        ]"#,
    );
    let entries = load_roster(&path).expect("load roster");
    let mut rng = RngState::from_seed(1);
    let goblin = entries[0].resolve(RewardInputs::default(), &mut rng);
    assert_eq!(goblin.value, 5000);
    let mystery = entries[1].resolve(RewardInputs::default(), &mut rng);
    assert_eq!(mystery.value, 0);
    let log = entries[1].reward_log("player", &mystery, Some(1));
    assert_eq!(log.mode_used, "jackpot");
    assert!(matches!(entries[1], RosterEntry::UnknownMode { .. }));

    let err = load_characters(&path).expect_err("strict load rejects unknown modes");
    assert!(err.to_string().contains("jackpot"));
}

#[test]
fn missing_roster_file_reports_path() {
    let err = load_roster(&assets_root().join("missing.json")).expect_err("missing file");
    assert!(err.to_string().contains("missing.json"));
}
