//! Persistent key-value parameter store
//!
//! The engine reads three boolean flags and writes one. Reads and writes are
//! independent, last write wins, and nothing spans more than one key.

use crate::types::{DecoderError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default parameter directory on the device
pub const DEFAULT_PARAMS_DIR: &str = "/data/params/d";

/// Key-value store the engine reads flags from
pub trait ParamStore {
    /// True iff the key holds the value "1"; missing keys are false
    fn get_bool(&self, key: &str) -> bool;

    /// Store a string value under a key
    fn put_string(&mut self, key: &str, value: &str) -> Result<()>;

    /// Store a boolean as "1" / "0"
    fn put_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.put_string(key, if value { "1" } else { "0" })
    }
}

impl<P: ParamStore + ?Sized> ParamStore for &mut P {
    fn get_bool(&self, key: &str) -> bool {
        (**self).get_bool(key)
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).put_string(key, value)
    }
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileParams {
    root: PathBuf,
}

impl FileParams {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(DecoderError::InvalidConfig(format!(
                "Invalid parameter key: {:?}",
                key
            )));
        }
        Ok(self.root.join(key))
    }

    /// Raw value of a key, if present and readable
    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.key_path(key).ok()?;
        fs::read_to_string(path).ok()
    }
}

impl Default for FileParams {
    fn default() -> Self {
        Self::new(DEFAULT_PARAMS_DIR)
    }
}

impl ParamStore for FileParams {
    fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some(value) if value.trim() == "1")
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let io_err = |source| DecoderError::ParamStore {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(io_err)?;

        // Write a sibling temp file and rename it over the key so readers never see a partial value
        let tmp_path = self.root.join(format!(".tmp_{}_{}", key, std::process::id()));
        let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(value.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            io_err(e)
        })?;

        log::debug!("Stored parameter {} = {:?}", key, value);
        Ok(())
    }
}

/// In-memory store for tests and embedders
#[derive(Debug, Clone, Default)]
pub struct MemoryParams {
    values: HashMap<String, String>,
}

impl MemoryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: preset a boolean key
    pub fn with_bool(mut self, key: &str, value: bool) -> Self {
        self.values
            .insert(key.to_string(), if value { "1" } else { "0" }.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl ParamStore for MemoryParams {
    fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some(value) if value.trim() == "1")
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
