//! Named preset management on top of [`ByteStore`](super::ByteStore)
//!
//! A preset is just a snapshot stored under `presets/<name>.json`.

use super::{load_snapshot, save_snapshot, ByteStore};
use crate::store::Snapshot;
use anyhow::{bail, Result};
use tracing::info;

const PRESET_PREFIX: &str = "presets";
const PRESET_EXT: &str = ".json";

fn preset_key(name: &str) -> Result<String> {
    if name.is_empty()
        || name
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' ')))
    {
        bail!("Invalid preset name: {name:?}");
    }
    Ok(format!("{PRESET_PREFIX}/{name}{PRESET_EXT}"))
}

pub async fn save_preset(store: &dyn ByteStore, name: &str, snapshot: &Snapshot) -> Result<()> {
    let key = preset_key(name)?;
    save_snapshot(store, &key, snapshot).await?;
    info!("Preset '{name}' saved");
    Ok(())
}

pub async fn load_preset(store: &dyn ByteStore, name: &str) -> Result<Option<Snapshot>> {
    let key = preset_key(name)?;
    load_snapshot(store, &key).await
}

/// Names of all stored presets, sorted.
pub async fn list_presets(store: &dyn ByteStore) -> Result<Vec<String>> {
    let keys = store.list_keys(PRESET_PREFIX).await?;
    Ok(keys
        .into_iter()
        .filter_map(|key| {
            let name = key.strip_prefix(PRESET_PREFIX)?.trim_start_matches('/');
            name.strip_suffix(PRESET_EXT).map(str::to_string)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::FileStore;
    use crate::schema::ParamValue;
    use tempfile::TempDir;

    fn snapshot(stiffness: f64) -> Snapshot {
        let mut s = Snapshot::new();
        s.insert("Suspension", "stiffness", ParamValue::Float(stiffness));
        s
    }

    #[tokio::test]
    async fn test_preset_save_load_list() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        save_preset(&store, "race", &snapshot(9.0)).await.unwrap();
        save_preset(&store, "trail", &snapshot(4.0)).await.unwrap();

        assert_eq!(
            list_presets(&store).await.unwrap(),
            vec!["race".to_string(), "trail".to_string()]
        );
        let loaded = load_preset(&store, "race").await.unwrap().unwrap();
        assert_eq!(loaded.get("Suspension", "stiffness"), Some(ParamValue::Float(9.0)));
        assert!(load_preset(&store, "unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_preset_name_validation() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        assert!(save_preset(&store, "../escape", &snapshot(1.0)).await.is_err());
        assert!(save_preset(&store, "", &snapshot(1.0)).await.is_err());
        assert!(save_preset(&store, "my setup_2", &snapshot(1.0)).await.is_ok());
    }
}
