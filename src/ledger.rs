// 📒 Session Ledger - per-user, append-only classified entries
//
// Storage is keyed by a normalized user identifier ("Alice Smith" →
// "alice_smith"). Identifiers that normalize to the same key share one
// ledger on purpose.
//
// `CsvLedgerStore` serializes appends within one process. There is no file
// locking, so two processes appending to the same key at the same time can
// still lose one of the batches.

use crate::catalog::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::io::ErrorKind;
use std::sync::{Mutex, RwLock};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

/// File name suffix for every ledger file
pub const LEDGER_SUFFIX: &str = "_transactions.csv";

// ============================================================================
// USER KEY
// ============================================================================

/// Storage key derived from a free-text user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UserKey(String);

impl UserKey {
    /// Trim, collapse whitespace runs, lowercase, spaces → underscores.
    /// Returns `None` when nothing is left after trimming.
    pub fn derive(identifier: &str) -> Option<Self> {
        let words: Vec<&str> = identifier.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }
        Some(UserKey(words.join("_").to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.0, LEDGER_SUFFIX)
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// ENTRY
// ============================================================================

/// One classified message. Identity is positional; duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "User")]
    pub user: String,

    #[serde(rename = "Message")]
    pub message: String,

    #[serde(rename = "Category")]
    pub category: Category,
}

impl Entry {
    pub fn new(user: impl Into<String>, message: impl Into<String>, category: Category) -> Self {
        Entry {
            user: user.into(),
            message: message.into(),
            category,
        }
    }
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read ledger {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write ledger {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on ledger {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger store lock poisoned")]
    Poisoned,
}

/// Key-value store of per-user ledgers
pub trait LedgerStore: Send + Sync {
    /// Persisted entries for `key`; empty when the user has none yet
    fn load(&self, key: &UserKey) -> Result<Vec<Entry>, LedgerError>;

    /// Replace the persisted sequence for `key`. Used by `append`.
    fn write_all(&self, key: &UserKey, entries: &[Entry]) -> Result<(), LedgerError>;

    /// Append `new_entries` after the existing ones, persist the full merged
    /// sequence and return it. Existing entries are never altered.
    fn append(&self, key: &UserKey, new_entries: Vec<Entry>) -> Result<Vec<Entry>, LedgerError> {
        merge_and_write(self, key, new_entries)
    }
}

fn merge_and_write<S: LedgerStore + ?Sized>(
    store: &S,
    key: &UserKey,
    new_entries: Vec<Entry>,
) -> Result<Vec<Entry>, LedgerError> {
    let mut merged = store.load(key)?;
    if new_entries.is_empty() {
        return Ok(merged);
    }

    let added = new_entries.len();
    merged.extend(new_entries);
    store.write_all(key, &merged)?;

    info!(key = %key, added, total = merged.len(), "ledger updated");
    Ok(merged)
}

/// One CSV file per user under `data_dir`, columns `User,Message,Category`
#[derive(Debug)]
pub struct CsvLedgerStore {
    data_dir: PathBuf,
    // Held across load + write in `append`
    append_lock: Mutex<()>,
}

impl CsvLedgerStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        CsvLedgerStore {
            data_dir: data_dir.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, key: &UserKey) -> PathBuf {
        self.data_dir.join(key.file_name())
    }

    /// Keys that currently have a ledger file, sorted
    pub fn keys(&self) -> Result<Vec<UserKey>, LedgerError> {
        let dir = match fs::read_dir(&self.data_dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(LedgerError::Io {
                    path: self.data_dir.clone(),
                    source,
                })
            }
        };

        let mut keys = Vec::new();
        for item in dir {
            let item = item.map_err(|source| LedgerError::Io {
                path: self.data_dir.clone(),
                source,
            })?;
            let name = item.file_name();
            if let Some(key) = name.to_str().and_then(|n| n.strip_suffix(LEDGER_SUFFIX)) {
                if !key.is_empty() {
                    keys.push(UserKey(key.to_string()));
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

impl LedgerStore for CsvLedgerStore {
    fn load(&self, key: &UserKey) -> Result<Vec<Entry>, LedgerError> {
        let path = self.path_for(key);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(LedgerError::Io { path, source }),
        };

        csv::Reader::from_reader(file)
            .deserialize()
            .collect::<Result<Vec<Entry>, _>>()
            .map_err(|source| LedgerError::Read { path, source })
    }

    fn write_all(&self, key: &UserKey, entries: &[Entry]) -> Result<(), LedgerError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| LedgerError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        // Write a uniquely named sibling first so a failed write keeps the
        // old ledger; the temp file is removed when dropped on error
        let path = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.data_dir).map_err(|source| LedgerError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        {
            let mut wtr = csv::Writer::from_writer(tmp.as_file_mut());
            for entry in entries {
                wtr.serialize(entry).map_err(|source| LedgerError::Write {
                    path: path.clone(),
                    source,
                })?;
            }
            wtr.flush().map_err(|source| LedgerError::Io {
                path: path.clone(),
                source,
            })?;
        }

        tmp.persist(&path)
            .map_err(|e| LedgerError::Io { path, source: e.error })?;
        Ok(())
    }

    fn append(&self, key: &UserKey, new_entries: Vec<Entry>) -> Result<Vec<Entry>, LedgerError> {
        let _guard = self.append_lock.lock().map_err(|_| LedgerError::Poisoned)?;
        merge_and_write(self, key, new_entries)
    }
}

/// In-memory store with the same contract, for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    ledgers: RwLock<HashMap<UserKey, Vec<Entry>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self, key: &UserKey) -> Result<Vec<Entry>, LedgerError> {
        let ledgers = self.ledgers.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(ledgers.get(key).cloned().unwrap_or_default())
    }

    fn write_all(&self, key: &UserKey, entries: &[Entry]) -> Result<(), LedgerError> {
        let mut ledgers = self.ledgers.write().map_err(|_| LedgerError::Poisoned)?;
        ledgers.insert(key.clone(), entries.to_vec());
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn key(identifier: &str) -> UserKey {
        UserKey::derive(identifier).unwrap()
    }

    fn food(user: &str, message: &str) -> Entry {
        Entry::new(user, message, Category::Food)
    }

    #[rstest]
    #[case("Alice", "alice")]
    #[case("Bob", "bob")]
    #[case("bob", "bob")]
    #[case("Bob ", "bob")]
    #[case("Mary Ann", "mary_ann")]
    #[case("  Mary \t  Ann  ", "mary_ann")]
    fn test_key_derivation(#[case] identifier: &str, #[case] expected: &str) {
        assert_eq!(key(identifier).as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn test_blank_identifier_has_no_key(#[case] identifier: &str) {
        assert_eq!(UserKey::derive(identifier), None);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(key("Alice").file_name(), "alice_transactions.csv");
    }

    #[test]
    fn test_load_unknown_user_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path());
        assert!(store.load(&key("nobody")).unwrap().is_empty());

        let missing_dir = CsvLedgerStore::new(dir.path().join("not-created-yet"));
        assert!(missing_dir.load(&key("nobody")).unwrap().is_empty());
        assert!(missing_dir.keys().unwrap().is_empty());
    }

    #[test]
    fn test_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path());
        let alice = key("Alice");

        store
            .append(
                &alice,
                vec![
                    food("Alice", "INR 250 spent at Domino's"),
                    Entry::new("Alice", "INR 1200 paid for electricity bill, again", Category::Bills),
                ],
            )
            .unwrap();

        let content = fs::read_to_string(dir.path().join("alice_transactions.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "User,Message,Category");
        assert_eq!(lines[1], "Alice,INR 250 spent at Domino's,Food");
        assert_eq!(lines[2], "Alice,\"INR 1200 paid for electricity bill, again\",Bills");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_append_returns_merged_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path());
        let bob = key("Bob");

        let first = store.append(&bob, vec![food("Bob", "a")]).unwrap();
        assert_eq!(first.len(), 1);

        let second = store
            .append(&bob, vec![food("bob", "b"), food("bob", "c")])
            .unwrap();
        assert_eq!(second.len(), 3);
        assert_eq!(second[0], food("Bob", "a"));
        assert_eq!(store.load(&bob).unwrap(), second);
    }

    #[test]
    fn test_append_in_two_batches_equals_one_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path());
        let a = vec![food("u", "one"), food("u", "two")];
        let b = vec![Entry::new("u", "three", Category::Rent), food("u", "one")];

        store.append(&key("split"), a.clone()).unwrap();
        store.append(&key("split"), b.clone()).unwrap();
        let combined: Vec<Entry> = a.into_iter().chain(b).collect();
        store.append(&key("joined"), combined).unwrap();

        assert_eq!(
            store.load(&key("split")).unwrap(),
            store.load(&key("joined")).unwrap()
        );
    }

    #[test]
    fn test_empty_append_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path());
        let merged = store.append(&key("ghost"), Vec::new()).unwrap();

        assert!(merged.is_empty());
        assert!(!store.path_for(&key("ghost")).exists());
    }

    #[test]
    fn test_keys_lists_ledger_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path());
        store.append(&key("Zoe"), vec![food("Zoe", "x")]).unwrap();
        store.append(&key("Mary Ann"), vec![food("Mary Ann", "y")]).unwrap();
        fs::write(dir.path().join("notes.txt"), "unrelated").unwrap();

        let keys: Vec<String> = store.keys().unwrap().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["mary_ann", "zoe"]);
    }

    #[test]
    fn test_unknown_category_in_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path());
        fs::write(
            dir.path().join("eve_transactions.csv"),
            "User,Message,Category\nEve,something,Groceries\n",
        )
        .unwrap();

        let err = store.load(&key("eve")).unwrap_err();
        assert!(matches!(err, LedgerError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_is_not_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path());
        let path = dir.path().join("eve_transactions.csv");
        let garbage = "User,Message,Category\nEve,only two fields\n";
        fs::write(&path, garbage).unwrap();

        assert!(store.append(&key("eve"), vec![food("Eve", "new")]).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), garbage);
    }

    fn dir_listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|item| item.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_failed_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path());
        let carol = key("carol");

        // A non-empty directory where the ledger file should go
        let blocker = store.path_for(&carol);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let err = store.write_all(&carol, &[food("carol", "first")]).unwrap_err();
        assert!(matches!(err, LedgerError::Io { .. }));
        assert_eq!(dir_listing(dir.path()), vec!["carol_transactions.csv"]);
    }

    #[test]
    fn test_concurrent_appends_keep_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path());
        let bob = key("bob");

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let store = &store;
                    let bob = &bob;
                    scope.spawn(move || {
                        (0..25)
                            .map(|i| store.append(bob, vec![food("bob", &format!("{t}-{i}"))]))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            for handle in handles {
                for result in handle.join().unwrap() {
                    assert!(result.is_ok(), "append failed: {:?}", result.err());
                }
            }
        });

        let entries = store.load(&bob).unwrap();
        assert_eq!(entries.len(), 200);
        assert_eq!(dir_listing(dir.path()), vec!["bob_transactions.csv"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_ledger_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvLedgerStore::new(dir.path());
        let loop_key = key("loop");

        // A symlink pointing at itself cannot be opened (ELOOP)
        let path = store.path_for(&loop_key);
        std::os::unix::fs::symlink(&path, &path).unwrap();

        let err = store.load(&loop_key).unwrap_err();
        assert!(matches!(err, LedgerError::Io { .. }));
        assert!(store.append(&loop_key, vec![food("loop", "x")]).is_err());
    }

    #[test]
    fn test_memory_store_matches_contract() {
        let store = MemoryLedgerStore::new();
        let k = key("Dan");
        assert!(store.load(&k).unwrap().is_empty());

        store.append(&k, vec![food("Dan", "a")]).unwrap();
        let merged = store.append(&k, vec![food("dan", "b")]).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(store.load(&k).unwrap(), merged);
        assert!(store.load(&key("other")).unwrap().is_empty());
    }
}
