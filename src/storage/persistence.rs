//! Launchpad persistence layer
//!
//! The whole launchpad (config, factory records, tokens and pending
//! approvals) is stored as one JSON document. Writes go to a temp file that
//! is renamed into place; the previous document is rotated into backups.

use crate::launchpad::Launchpad;
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub state_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".launchpad_data"),
            state_file: "launchpad.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Launchpad storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Storage rooted at `data_dir` with default file names
    pub fn in_dir(data_dir: &Path) -> Result<Self, StorageError> {
        Self::new(StorageConfig {
            data_dir: data_dir.to_path_buf(),
            ..Default::default()
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    fn state_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.state_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.state_file, index))
    }

    /// Save the launchpad to disk
    pub fn save(&self, launchpad: &Launchpad) -> Result<(), StorageError> {
        let path = self.state_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        let temp_path = self
            .config
            .data_dir
            .join(format!("{}.tmp", self.config.state_file));
        let mut writer = BufWriter::new(fs::File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, launchpad)?;
        writer.flush()?;

        fs::rename(&temp_path, &path)?;
        log::debug!("Saved launchpad state to {:?}", path);
        Ok(())
    }

    /// Load the launchpad from disk
    pub fn load(&self) -> Result<Launchpad, StorageError> {
        let path = self.state_path();
        if !path.exists() {
            return Err(StorageError::InvalidData(format!(
                "State file not found: {:?}",
                path
            )));
        }

        let launchpad = read_state(&path)?;
        launchpad.coordinator().flag_default_policy();
        Ok(launchpad)
    }

    pub fn exists(&self) -> bool {
        self.state_path().exists()
    }

    /// Delete the saved state (backups are kept)
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.state_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Load a backup (0 is the most recent)
    pub fn restore_backup(&self, backup_index: usize) -> Result<Launchpad, StorageError> {
        let path = self.backup_path(backup_index);
        if !path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }
        read_state(&path)
    }

    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }
}

fn read_state(path: &Path) -> Result<Launchpad, StorageError> {
    let reader = BufReader::new(fs::File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::MemecoinRequest;
    use crate::launchpad::LaunchpadConfig;
    use crate::multisig::{QuorumPolicy, TxStatus};

    fn storage(dir: &Path, max_backups: usize) -> Storage {
        Storage::new(StorageConfig {
            data_dir: dir.to_path_buf(),
            max_backups,
            ..Default::default()
        })
        .unwrap()
    }

    fn request() -> MemecoinRequest {
        MemecoinRequest {
            owner: "owner".to_string(),
            name: "Doge Moon".to_string(),
            symbol: "DMOON".to_string(),
            decimals: 18,
            total_supply: 1_000,
            signers: vec!["s1".to_string(), "s2".to_string(), "s3".to_string()],
        }
    }

    #[test]
    fn test_save_load_launchpad() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage(temp_dir.path(), 5);

        let mut launchpad = Launchpad::new(LaunchpadConfig {
            quorum: QuorumPolicy::Unanimous,
            ..Default::default()
        });
        let data = launchpad.request_memecoin(request()).unwrap();
        launchpad.sign_tx("s1", data.id).unwrap();

        storage.save(&launchpad).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.config().quorum, QuorumPolicy::Unanimous);
        assert_eq!(loaded.tx_status(data.id), TxStatus::Pending);
        assert_eq!(
            loaded.get_pending_tx_data(data.id).signatures,
            vec!["s1".to_string()]
        );
    }

    #[test]
    fn test_load_missing_state() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage(temp_dir.path(), 5);

        assert!(!storage.exists());
        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage(temp_dir.path(), 3);
        let mut launchpad = Launchpad::default();

        for _ in 0..5 {
            storage.save(&launchpad).unwrap();
            launchpad.request_memecoin(request()).unwrap();
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);

        // Most recent backup is the state before the last save
        let previous = storage.restore_backup(0).unwrap();
        assert_eq!(previous.list_tx_data().len(), 3);
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.list_tx_data().len(), 4);
        assert!(loaded.coordinator().flag_default_policy());
    }

    #[test]
    fn test_save_replaces_temp_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage(temp_dir.path(), 0);

        storage.save(&Launchpad::default()).unwrap();
        storage.save(&Launchpad::default()).unwrap();

        assert!(!temp_dir.path().join("launchpad.json.tmp").exists());
        let raw = fs::read_to_string(temp_dir.path().join("launchpad.json")).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());
        assert!(storage.list_backups().is_empty());
    }

    #[test]
    fn test_save_fails_without_data_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage(temp_dir.path(), 2);
        fs::remove_dir_all(temp_dir.path()).unwrap();

        assert!(matches!(
            storage.save(&Launchpad::default()),
            Err(StorageError::IoError(_))
        ));
    }

    #[test]
    fn test_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage(temp_dir.path(), 2);

        storage.save(&Launchpad::default()).unwrap();
        storage.delete().unwrap();
        assert!(!storage.exists());
    }
}
