//! The binding store: records in memory, optionally backed by a YAML file

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard};

use super::file::{load_store_file, save_store_file};
use super::signal::ChangeSignal;
use super::{BindingStore, ReadTransaction, StoredBinding};
use crate::error::StoreError;
use crate::keymap::KeyCombination;
use crate::scope::RulesetId;

/// A transactional store of binding overrides
///
/// Reads and writes go through transactions. A committed write replaces the
/// record set atomically, is saved to the backing file if there is one, and
/// fires the change signal once.
#[derive(Debug)]
pub struct KeyBindingStore {
    records: RwLock<Vec<StoredBinding>>,
    /// Serializes writers and reloads
    write_lock: Mutex<()>,
    path: Option<PathBuf>,
    available: AtomicBool,
    signal: ChangeSignal,
}

impl KeyBindingStore {
    /// A store that lives only in memory
    pub fn in_memory() -> Self {
        Self::with_records(None, Vec::new())
    }

    /// Open a file-backed store
    ///
    /// A missing file is an empty store; the file is created on first commit.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = if path.exists() {
            load_store_file(&path)?
        } else {
            tracing::debug!("Binding store {} not found, starting empty", path.display());
            Vec::new()
        };
        tracing::info!(
            "Opened binding store {} ({} records)",
            path.display(),
            records.len()
        );
        Ok(Self::with_records(Some(path), records))
    }

    fn with_records(path: Option<PathBuf>, records: Vec<StoredBinding>) -> Self {
        Self {
            records: RwLock::new(records),
            write_lock: Mutex::new(()),
            path,
            available: AtomicBool::new(true),
            signal: ChangeSignal::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Mark the store as (un)available; while unavailable every transaction fails
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store is offline".to_string()))
        }
    }

    /// Open a write transaction
    ///
    /// Writers are serialized; changes are staged until [`WriteTransaction::commit`]
    /// and discarded if the transaction is dropped.
    pub fn begin_write(&self) -> Result<WriteTransaction<'_>, StoreError> {
        self.ensure_available()?;
        let guard = self.write_lock.lock();
        let staged = self.records.read().clone();
        Ok(WriteTransaction {
            store: self,
            _guard: guard,
            staged,
            dirty: false,
        })
    }

    /// Re-read the backing file, firing the change signal if anything changed
    ///
    /// Returns whether the record set changed. In-memory stores never change
    /// on reload.
    pub fn reload(&self) -> Result<bool, StoreError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(false);
        };
        self.ensure_available()?;

        let changed = {
            let _guard = self.write_lock.lock();
            let records = if path.exists() {
                load_store_file(path)?
            } else {
                Vec::new()
            };
            let mut current = self.records.write();
            if *current == records {
                false
            } else {
                tracing::info!(
                    "Reloaded binding store {} ({} records)",
                    path.display(),
                    records.len()
                );
                *current = records;
                true
            }
        };

        if changed {
            self.signal.notify();
        }
        Ok(changed)
    }

    /// Number of records across all scopes
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for KeyBindingStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl BindingStore for KeyBindingStore {
    type Read<'a> = MemoryRead<'a>;

    fn begin_read(&self) -> Result<MemoryRead<'_>, StoreError> {
        self.ensure_available()?;
        Ok(MemoryRead {
            records: self.records.read(),
        })
    }

    fn change_signal(&self) -> &ChangeSignal {
        &self.signal
    }
}

/// A read transaction; holds a shared lock on the record set until dropped
pub struct MemoryRead<'a> {
    records: RwLockReadGuard<'a, Vec<StoredBinding>>,
}

impl ReadTransaction for MemoryRead<'_> {
    fn query(&self, ruleset_id: Option<RulesetId>, variant: Option<i32>) -> Vec<&StoredBinding> {
        self.records
            .iter()
            .filter(|r| r.belongs_to(ruleset_id, variant))
            .collect()
    }
}

/// A write transaction over a staged copy of the record set
pub struct WriteTransaction<'a> {
    store: &'a KeyBindingStore,
    _guard: MutexGuard<'a, ()>,
    staged: Vec<StoredBinding>,
    dirty: bool,
}

impl WriteTransaction<'_> {
    /// The staged records, including uncommitted changes
    pub fn records(&self) -> &[StoredBinding] {
        &self.staged
    }

    pub fn query(&self, ruleset_id: Option<RulesetId>, variant: Option<i32>) -> Vec<&StoredBinding> {
        self.staged
            .iter()
            .filter(|r| r.belongs_to(ruleset_id, variant))
            .collect()
    }

    fn next_id(&self) -> u64 {
        self.staged.iter().map(|r| r.id).max().map_or(1, |max| max + 1)
    }

    /// Add a record, returning its id
    pub fn insert(
        &mut self,
        ruleset_id: Option<RulesetId>,
        variant: Option<i32>,
        combination: KeyCombination,
        action: impl ToString,
    ) -> u64 {
        let id = self.next_id();
        self.staged.push(StoredBinding {
            id,
            ruleset_id,
            variant,
            combination,
            action: action.to_string(),
        });
        self.dirty = true;
        id
    }

    /// Modify a record in place; returns false if no record has this id
    pub fn update(&mut self, id: u64, f: impl FnOnce(&mut StoredBinding)) -> bool {
        match self.staged.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                f(record);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u64) -> bool {
        self.remove_where(|r| r.id == id) > 0
    }

    /// Remove every record matching the predicate, returning how many went
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&StoredBinding) -> bool) -> usize {
        let before = self.staged.len();
        self.staged.retain(|r| !predicate(r));
        let removed = before - self.staged.len();
        if removed > 0 {
            self.dirty = true;
        }
        removed
    }

    /// Remove every record of one scope key
    pub fn clear_scope(&mut self, ruleset_id: Option<RulesetId>, variant: Option<i32>) -> usize {
        self.remove_where(|r| r.belongs_to(ruleset_id, variant))
    }

    /// Replace all records of one scope key, keeping the given order
    pub fn replace_scope<I, S>(&mut self, ruleset_id: Option<RulesetId>, variant: Option<i32>, bindings: I)
    where
        I: IntoIterator<Item = (KeyCombination, S)>,
        S: ToString,
    {
        self.clear_scope(ruleset_id, variant);
        for (combination, action) in bindings {
            self.insert(ruleset_id, variant, combination, action);
        }
        self.dirty = true;
    }

    /// Publish the staged records
    ///
    /// File-backed stores save before publishing; a failed save leaves the
    /// store untouched. The change signal fires only if something changed,
    /// after every lock has been released.
    pub fn commit(self) -> Result<(), StoreError> {
        let WriteTransaction {
            store,
            _guard,
            staged,
            dirty,
        } = self;

        if !dirty {
            return Ok(());
        }
        store.ensure_available()?;

        if let Some(path) = store.path.as_deref() {
            save_store_file(path, &staged)?;
        }
        *store.records.write() = staged;
        drop(_guard);

        tracing::debug!("Committed binding store changes");
        store.signal.notify();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::InputKey;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn ctrl(c: char) -> KeyCombination {
        KeyCombination::new([InputKey::Control, InputKey::char(c)])
    }

    #[test]
    fn test_commit_publishes_and_notifies() {
        let store = KeyBindingStore::in_memory();
        let count = Arc::new(AtomicUsize::new(0));
        let handler_count = Arc::clone(&count);
        let _sub = store.change_signal().subscribe(move || {
            handler_count.fetch_add(1, Ordering::SeqCst);
        });

        let mut tx = store.begin_write().unwrap();
        tx.insert(None, None, ctrl('s'), "Save");
        tx.insert(None, None, ctrl('z'), "Undo");
        tx.commit().unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let store = KeyBindingStore::in_memory();
        {
            let mut tx = store.begin_write().unwrap();
            tx.insert(None, None, ctrl('s'), "Save");
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_clean_commit_does_not_notify() {
        let store = KeyBindingStore::in_memory();
        let count = Arc::new(AtomicUsize::new(0));
        let handler_count = Arc::clone(&count);
        let _sub = store.change_signal().subscribe(move || {
            handler_count.fetch_add(1, Ordering::SeqCst);
        });

        store.begin_write().unwrap().commit().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_query_filters_by_scope() {
        let store = KeyBindingStore::in_memory();
        let mut tx = store.begin_write().unwrap();
        tx.insert(None, None, ctrl('s'), "Save");
        tx.insert(Some(RulesetId(1)), Some(0), KeyCombination::single(InputKey::char('z')), "Key1");
        tx.insert(Some(RulesetId(1)), Some(4), KeyCombination::single(InputKey::char('d')), "Key1");
        tx.commit().unwrap();

        let read = store.begin_read().unwrap();
        assert_eq!(read.query(None, None).len(), 1);
        assert_eq!(read.query(Some(RulesetId(1)), Some(0)).len(), 1);
        assert_eq!(read.query(Some(RulesetId(1)), None).len(), 0);
        assert_eq!(read.query(Some(RulesetId(2)), Some(0)).len(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let store = KeyBindingStore::in_memory();
        let mut tx = store.begin_write().unwrap();
        let a = tx.insert(None, None, ctrl('s'), "Save");
        let b = tx.insert(None, None, ctrl('z'), "Undo");
        assert_ne!(a, b);
        assert!(tx.remove(a));
        let c = tx.insert(None, None, ctrl('y'), "Redo");
        assert_ne!(b, c);
    }

    #[test]
    fn test_update_and_replace_scope() {
        let store = KeyBindingStore::in_memory();
        let mut tx = store.begin_write().unwrap();
        let id = tx.insert(None, None, ctrl('s'), "Save");
        assert!(tx.update(id, |r| r.action = "SaveAs".to_string()));
        assert!(!tx.update(id + 100, |_| {}));
        tx.replace_scope(Some(RulesetId(1)), Some(0), [(ctrl('a'), "Key1"), (ctrl('b'), "Key2")]);
        tx.commit().unwrap();

        let read = store.begin_read().unwrap();
        assert_eq!(read.query(None, None)[0].action, "SaveAs");
        let scoped = read.query(Some(RulesetId(1)), Some(0));
        assert_eq!(scoped.len(), 2);
        assert_eq!(scoped[0].action, "Key1");
    }

    #[test]
    fn test_unavailable_store_rejects_transactions() {
        let store = KeyBindingStore::in_memory();
        store.set_available(false);
        assert!(matches!(store.begin_read(), Err(StoreError::Unavailable(_))));
        assert!(store.begin_write().is_err());

        store.set_available(true);
        assert!(store.begin_read().is_ok());
    }

    #[test]
    fn test_reload_without_file_is_noop() {
        let store = KeyBindingStore::in_memory();
        assert!(!store.reload().unwrap());
    }
}
