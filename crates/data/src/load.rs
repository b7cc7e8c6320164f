use crate::schema::{EngineConfig, RawEntryHeader, RosterEntry};
use anyhow::{bail, Context};
use bounty_core::Character;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const CHARACTERS_FILE: &str = "characters.json";
pub const ENGINE_CONFIG_FILE: &str = "engine.json";

const BUILTIN_JSON: &[u8] = include_bytes!("../characters.json");

/// The seed roster shipped with the engine.
pub fn builtin_characters() -> Vec<Character> {
    serde_json::from_slice(BUILTIN_JSON).expect("built-in characters.json must be valid")
}

pub fn load_roster(path: &Path) -> anyhow::Result<Vec<RosterEntry>> {
    let rows: Vec<Value> = load_json(path)?;
    let entries = parse_roster_rows(rows).with_context(|| format!("roster {}", path.display()))?;
    log::debug!("loaded {} roster entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Like [`load_roster`] but fails on rows with an unknown mode tag.
pub fn load_characters(path: &Path) -> anyhow::Result<Vec<Character>> {
    load_roster(path)?
        .into_iter()
        .map(|entry| match entry {
            RosterEntry::Character(character) => Ok(character),
            RosterEntry::UnknownMode { id, tag, .. } => {
                bail!("character {} has unknown reward mode '{}'", id, tag)
            }
        })
        .collect()
}

pub fn parse_roster_json(raw: &str) -> anyhow::Result<Vec<RosterEntry>> {
    let rows: Vec<Value> = serde_json::from_str(raw).context("parse roster JSON")?;
    parse_roster_rows(rows)
}

fn parse_roster_rows(rows: Vec<Value>) -> anyhow::Result<Vec<RosterEntry>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| parse_roster_row(row).with_context(|| format!("row {}", index)))
        .collect()
}

fn parse_roster_row(row: Value) -> anyhow::Result<RosterEntry> {
    let header: RawEntryHeader =
        serde_json::from_value(row.clone()).context("read id/name/rewardMode")?;
    if header.known_mode().is_none() {
        log::warn!(
            "character {} has unknown reward mode '{}'",
            header.id,
            header.reward_mode
        );
        return Ok(RosterEntry::UnknownMode {
            id: header.id,
            name: header.name,
            tag: header.reward_mode,
        });
    }
    let character: Character = serde_json::from_value(normalize_mode(row))
        .with_context(|| format!("character {}", header.id))?;
    Ok(RosterEntry::Character(character))
}

/// Stored tags may differ in case or padding from the serde names.
fn normalize_mode(mut row: Value) -> Value {
    if let Some(tag) = row.get_mut("rewardMode") {
        if let Some(text) = tag.as_str() {
            *tag = Value::String(text.trim().to_ascii_lowercase());
        }
    }
    row
}

/// Missing file means defaults.
pub fn load_engine_config(path: &Path) -> anyhow::Result<EngineConfig> {
    if !path.exists() {
        log::debug!("{} not found, using default engine config", path.display());
        return Ok(EngineConfig::default());
    }
    load_json(path)
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
