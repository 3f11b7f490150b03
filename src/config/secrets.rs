//! Persisted secrets (the OAuth access token) behind a small store trait.
//!
//! The on-disk format is a flat `KEY=value` file, one entry per line, shared
//! with tooling that reads `.env` files. [`EnvFileStore`] upserts entries with
//! an exclusive advisory lock and an atomic rename so concurrent writers never
//! interleave or truncate each other.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::RwLock;

/// Key under which the GitHub access token is stored.
pub const GITHUB_TOKEN_KEY: &str = "GITHUB_TOKEN";

/// Key/value secret storage injected into services that persist credentials.
#[cfg_attr(test, mockall::automock)]
pub trait SecretStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key (or the backing file) is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the existing entry for `key`, or append a new one.
    fn upsert(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store using the `KEY=value` line format.
#[derive(Debug, Clone)]
pub struct EnvFileStore {
    path: Utf8PathBuf,
}

impl EnvFileStore {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn parent_dir(&self) -> Utf8PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_str().is_empty() => p.to_path_buf(),
            _ => Utf8PathBuf::from("."),
        }
    }

    fn lock_path(&self) -> Utf8PathBuf {
        let name = self.path.file_name().unwrap_or(".env");
        self.parent_dir().join(format!("{}.lock", name))
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read secret file: {}", self.path))?;
        Ok(contents.lines().map(str::to_string).collect())
    }
}

impl SecretStore for EnvFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let prefix = format!("{}=", key);
        Ok(self
            .read_lines()?
            .into_iter()
            .find_map(|line| line.strip_prefix(&prefix).map(str::to_string)))
    }

    fn upsert(&self, key: &str, value: &str) -> Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create secret directory: {}", dir))?;

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path))?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock
            .write()
            .with_context(|| format!("Failed to lock secret file: {}", self.path))?;

        let lines = upsert_line(self.read_lines()?, key, value);

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temp file in {}", dir))?;
        tmp.write_all(lines.join("\n").as_bytes())
            .context("Failed to write secret temp file")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace secret file: {}", self.path))?;

        tracing::debug!("Upserted {} into {}", key, self.path);
        Ok(())
    }
}

/// Replace the first line starting with `KEY=`, or append one.
fn upsert_line(mut lines: Vec<String>, key: &str, value: &str) -> Vec<String> {
    let prefix = format!("{}=", key);
    let entry = format!("{}{}", prefix, value);
    match lines.iter_mut().find(|line| line.starts_with(&prefix)) {
        Some(line) => *line = entry,
        None => lines.push(entry),
    }
    lines
}

/// In-process store; nothing touches the disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow::anyhow!("secret store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn upsert(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("secret store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
