//! Wallet registry persistence layer
//!
//! Provides save/load functionality for the wallet registry.

use crate::ledger::WalletRegistry;
use std::fs;
use std::io::{self, BufReader, BufWriter};
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
    pub data_dir: std::path::PathBuf,
    pub registry_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: std::path::PathBuf::from(".qwallet_data"),
            registry_file: "wallets.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Wallet registry storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    /// Get the registry file path
    fn registry_path(&self) -> std::path::PathBuf {
        self.config.data_dir.join(&self.config.registry_file)
    }

    /// Get a backup file path
    fn backup_path(&self, index: usize) -> std::path::PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.registry_file, index))
    }

    /// Save the registry to disk
    pub fn save(&self, registry: &WalletRegistry) -> Result<(), StorageError> {
        let path = self.registry_path();

        // Create backup if enabled
        if self.config.backup_enabled && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self.config.data_dir.join("wallets.tmp");
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, registry)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    /// Load the registry from disk
    pub fn load(&self) -> Result<WalletRegistry, StorageError> {
        let path = self.registry_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Registry file not found".to_string(),
            ));
        }

        let file = fs::File::open(&path)?;
        let reader = BufReader::new(file);

        let registry: WalletRegistry = serde_json::from_reader(reader)?;

        Ok(registry)
    }

    /// Check if a saved registry exists
    pub fn exists(&self) -> bool {
        self.registry_path().exists()
    }

    /// Delete the saved registry
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.registry_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                let next = self.backup_path(i + 1);
                fs::rename(&current, &next)?;
            }
        }

        Ok(())
    }

    /// Restore the registry from a backup
    pub fn restore_backup(&self, backup_index: usize) -> Result<WalletRegistry, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        let file = fs::File::open(&backup_path)?;
        let reader = BufReader::new(file);

        let registry: WalletRegistry = serde_json::from_reader(reader)?;

        Ok(registry)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        let mut backups = Vec::new();

        for i in 0..self.config.max_backups {
            if self.backup_path(i).exists() {
                backups.push(i);
            }
        }

        backups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn member_set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_save_load_registry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let storage = Storage::new(config).unwrap();
        let mut registry = WalletRegistry::new();
        registry.fund("owner", 500);
        let wallet = registry
            .create_wallet(
                "owner",
                member_set(&["alice", "bob"]),
                2,
                Some("ops".to_string()),
            )
            .unwrap();
        let address = wallet.address().to_string();
        registry
            .propose_transaction(&address, "owner", "dave", 100)
            .unwrap();
        registry.approve_transaction(&address, "alice", 0).unwrap();

        // Save
        storage.save(&registry).unwrap();
        assert!(storage.exists());

        // Load
        let loaded = storage.load().unwrap();
        assert_eq!(loaded.wallet_count(), 1);
        assert_eq!(loaded.balance_of("owner"), 400);
        assert_eq!(loaded.balance_of(&address), 100);
        assert_eq!(loaded.approval_count(&address, 0).unwrap(), 1);
        assert_eq!(loaded.wallet(&address).unwrap().label(), Some("ops"));
    }

    #[test]
    fn test_loaded_registry_keeps_address_salt() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let storage = Storage::new(config).unwrap();
        let mut registry = WalletRegistry::new();
        let first = registry
            .create_wallet("owner", member_set(&["alice"]), 1, None)
            .unwrap();

        storage.save(&registry).unwrap();
        let mut loaded = storage.load().unwrap();

        // Creating the same configuration after a reload must not collide
        let second = loaded
            .create_wallet("owner", member_set(&["alice"]), 1, None)
            .unwrap();
        assert_ne!(first.address(), second.address());
        assert_eq!(loaded.wallet_count(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let storage = Storage::new(config).unwrap();
        assert!(!storage.exists());
        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            max_backups: 3,
            ..Default::default()
        };

        let storage = Storage::new(config).unwrap();
        let mut registry = WalletRegistry::new();

        // Save multiple times
        for i in 0..5 {
            storage.save(&registry).unwrap();
            registry.fund("owner", i * 10);
        }

        // Should have 3 backups (max)
        let backups = storage.list_backups();
        assert!(backups.len() <= 3);
    }

    #[test]
    fn test_restore_backup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let storage = Storage::new(config).unwrap();
        let mut registry = WalletRegistry::new();
        registry.fund("alice", 100);
        storage.save(&registry).unwrap();

        // Second save pushes the first state into backup 0
        registry.fund("alice", 100);
        storage.save(&registry).unwrap();

        let restored = storage.restore_backup(0).unwrap();
        assert_eq!(restored.balance_of("alice"), 100);

        assert!(matches!(
            storage.restore_backup(4),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let storage = Storage::new(config).unwrap();
        storage.save(&WalletRegistry::new()).unwrap();
        assert!(storage.exists());

        storage.delete().unwrap();
        assert!(!storage.exists());
    }
}
