//! YAML persistence for the binding store
//!
//! ```yaml
//! bindings:
//!   - id: 1
//!     key: Ctrl+S
//!     action: Save
//!   - id: 2
//!     ruleset_id: 1
//!     variant: 4
//!     key: D
//!     action: Key1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::StoredBinding;
use crate::error::StoreError;

/// Root structure of a binding store file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub bindings: Vec<StoredBinding>,
}

/// Read every record from a store file
pub fn load_store_file(path: &Path) -> Result<Vec<StoredBinding>, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;

    // An empty file is an empty store
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: StoreDocument = serde_yaml::from_str(&content)
        .map_err(|e| StoreError::Parse(format!("{}: {}", path.display(), e)))?;
    Ok(document.bindings)
}

/// Write every record to a store file
///
/// Creates the parent directory if needed. The file is written to a
/// temporary sibling first and renamed into place.
pub fn save_store_file(path: &Path, records: &[StoredBinding]) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    let document = StoreDocument {
        bindings: records.to_vec(),
    };
    let content = serde_yaml::to_string(&document).map_err(|e| StoreError::Parse(e.to_string()))?;

    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, content).map_err(io_error)?;
    std::fs::rename(&tmp, path).map_err(io_error)?;

    tracing::info!(
        "Saved binding store to {} ({} records)",
        path.display(),
        records.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{InputKey, KeyCombination};
    use crate::scope::RulesetId;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bindings.yaml");

        let records = vec![
            StoredBinding {
                id: 1,
                ruleset_id: None,
                variant: None,
                combination: KeyCombination::new([InputKey::Control, InputKey::Char('s')]),
                action: "Save".to_string(),
            },
            StoredBinding {
                id: 2,
                ruleset_id: Some(RulesetId(1)),
                variant: Some(4),
                combination: KeyCombination::single(InputKey::Char('d')),
                action: "Key1".to_string(),
            },
        ];

        save_store_file(&path, &records).unwrap();
        assert_eq!(load_store_file(&path).unwrap(), records);
    }

    #[test]
    fn test_load_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.yaml");
        std::fs::write(
            &path,
            "bindings:\n  - id: 7\n    key: ctrl+shift+s\n    action: SaveAs\n",
        )
        .unwrap();

        let records = load_store_file(&path).unwrap();
        assert_eq!(records[0].id, 7);
        assert_eq!(records[0].combination.to_string(), "Ctrl+Shift+S");
        assert_eq!(records[0].ruleset_id, None);
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.yaml");
        std::fs::write(&path, "").unwrap();
        assert!(load_store_file(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_invalid_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.yaml");
        std::fs::write(&path, "bindings:\n  - id: 1\n    key: ctrl+banana\n    action: Save\n")
            .unwrap();
        assert!(matches!(load_store_file(&path), Err(StoreError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_store_file(&dir.path().join("missing.yaml"));
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }
}
