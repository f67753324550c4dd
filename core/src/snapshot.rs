//! Snapshot serialization: full game state to/from JSON.
//!
//! Every document carries `schemaVersion`. Documents written before the
//! field existed count as version 0. Decoding walks the document forward
//! one version at a time, then deserializes the result.

use crate::{
    error::{GameError, GameResult},
    state::{GameState, CURRENT_SCHEMA_VERSION},
};
use serde_json::Value;

pub fn encode(state: &GameState) -> GameResult<String> {
    Ok(serde_json::to_string(state)?)
}

pub fn decode(raw: &str) -> GameResult<GameState> {
    let mut doc: Value = serde_json::from_str(raw)?;
    let mut version = schema_version(&doc)?;

    if version > CURRENT_SCHEMA_VERSION {
        return Err(GameError::UnsupportedSchema {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    while version < CURRENT_SCHEMA_VERSION {
        migrate_step(&mut doc, version)?;
        version += 1;
        log::info!("snapshot: migrated document to schema version {version}");
    }

    Ok(serde_json::from_value(doc)?)
}

fn schema_version(doc: &Value) -> GameResult<u32> {
    match doc.get("schemaVersion") {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| GameError::Migration {
                from: 0,
                reason: format!("schemaVersion is not a version number: {v}"),
            }),
    }
}

/// Upgrade `doc` from `from` to `from + 1`.
fn migrate_step(doc: &mut Value, from: u32) -> GameResult<()> {
    let obj = doc.as_object_mut().ok_or_else(|| GameError::Migration {
        from,
        reason: "snapshot is not a JSON object".into(),
    })?;
    match from {
        // v0 -> v1: same shape, version field introduced.
        0 => {
            obj.insert("schemaVersion".into(), Value::from(1u32));
            Ok(())
        }
        other => Err(GameError::Migration {
            from: other,
            reason: "no migration step registered".into(),
        }),
    }
}
