//! Static world content: map, NPCs, and dropped items.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::WorldError;

/// The read-only parts of the world that every welcome snapshot carries.
///
/// Questgate doesn't interpret any of it; the game client does. Missing
/// sections default to empty, so `{}` is a valid (empty) world.
///
/// Loaded once at startup, typically from a JSON file:
///
/// ```json
/// {
///   "map":   { "name": "meadow", "tiles": [[0, 0, 1]] },
///   "npcs":  [{ "id": 1, "name": "Guard", "x": 4, "y": 2 }],
///   "items": [{ "item_id": 7, "x": 3, "y": 3 }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldAssets {
    /// The world map.
    #[serde(default)]
    pub map: Value,

    /// Non-player characters.
    #[serde(default)]
    pub npcs: Vec<Value>,

    /// Items lying on the ground (sent to clients as `droppedItems`).
    #[serde(default)]
    pub items: Vec<Value>,
}

impl WorldAssets {
    /// Reads and parses a JSON assets file.
    ///
    /// # Errors
    /// Returns [`WorldError::Assets`] if the file can't be read or isn't
    /// valid assets JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let assets_error = |reason: String| WorldError::Assets {
            path: path.display().to_string(),
            reason,
        };

        let bytes = std::fs::read(path).map_err(|e| assets_error(e.to_string()))?;
        let assets: Self = serde_json::from_slice(&bytes).map_err(|e| assets_error(e.to_string()))?;

        tracing::info!(
            path = %path.display(),
            npcs = assets.npcs.len(),
            items = assets.items.len(),
            "world assets loaded"
        );
        Ok(assets)
    }
}
