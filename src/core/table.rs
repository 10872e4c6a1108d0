//! Macro lookup table
//!
//! [`MacroTable`] is an immutable snapshot built from the ordered definition
//! list. It is never patched: every change to the list builds a new table,
//! and [`TableHandle`] swaps the new snapshot in with a single pointer
//! assignment. Readers holding an older `Arc` keep seeing the old table.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use fxhash::FxBuildHasher;
use indexmap::IndexMap;

use super::definition::MacroDefinition;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Name-keyed snapshot of macro definitions, iterable in definition order
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    entries: IndexMap<String, MacroDefinition, FxBuildHasher>,
    generation: u64,
}

impl PartialEq for MacroTable {
    /// Tables compare by contents; the generation is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for MacroTable {}

impl MacroTable {
    /// Build a table from definitions in order.
    ///
    /// A later definition with the same name replaces the earlier one.
    pub fn build<'a, I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = &'a MacroDefinition>,
    {
        let mut entries: IndexMap<String, MacroDefinition, FxBuildHasher> = IndexMap::default();
        for def in definitions {
            if let Some(previous) = entries.insert(def.name.clone(), def.clone()) {
                tracing::debug!(
                    name = %def.name,
                    replaced = %previous.template(),
                    "duplicate macro name, keeping the later definition"
                );
            }
        }

        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(macros = entries.len(), generation, "macro table built");
        Self {
            entries,
            generation,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&MacroDefinition> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definitions in the order their names first appeared.
    pub fn iter(&self) -> impl Iterator<Item = &MacroDefinition> {
        self.entries.values()
    }

    /// Identifier of this build. Zero for an empty default table.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Shared handle to the current table snapshot.
///
/// Cloning the handle shares the same slot. Renderers call [`snapshot`]
/// and work against the returned `Arc`; the owning session calls
/// [`rebuild`] after each change to the definition list.
///
/// [`snapshot`]: TableHandle::snapshot
/// [`rebuild`]: TableHandle::rebuild
#[derive(Debug, Clone, Default)]
pub struct TableHandle {
    current: Arc<RwLock<Arc<MacroTable>>>,
}

impl TableHandle {
    pub fn new(table: MacroTable) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    /// The table as of now.
    pub fn snapshot(&self) -> Arc<MacroTable> {
        // A poisoned slot still holds a complete table.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Build a fresh table and swap it in. The lock is only held for the swap.
    pub fn rebuild<'a, I>(&self, definitions: I) -> Arc<MacroTable>
    where
        I: IntoIterator<Item = &'a MacroDefinition>,
    {
        let fresh = Arc::new(MacroTable::build(definitions));
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&fresh);
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_lookup() {
        let defs = vec![
            MacroDefinition::new("greet", "Hello $0"),
            MacroDefinition::new("sig", "-- me"),
        ];
        let table = MacroTable::build(&defs);
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("greet").map(|d| d.template()), Some("Hello $0"));
        assert!(table.lookup("missing").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let v1 = MacroDefinition::new("a", "first");
        let v2 = MacroDefinition::new("a", "second $0");
        let table = MacroTable::build(&[v1, v2.clone()]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("a"), Some(&v2));
    }

    #[test]
    fn test_iteration_follows_first_appearance() {
        let defs = vec![
            MacroDefinition::new("b", "1"),
            MacroDefinition::new("a", "2"),
            MacroDefinition::new("b", "3"),
        ];
        let table = MacroTable::build(&defs);
        let names: Vec<&str> = table.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(table.lookup("b").map(|d| d.template()), Some("3"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let defs = vec![
            MacroDefinition::new("x", "$0"),
            MacroDefinition::new("y", "$1"),
        ];
        let first = MacroTable::build(&defs);
        let second = MacroTable::build(&defs);
        assert_eq!(first, second);
        assert_ne!(first.generation(), second.generation());
    }

    #[test]
    fn test_empty_name_is_a_key_like_any_other() {
        let table = MacroTable::build(&[MacroDefinition::new("", "blank")]);
        assert!(table.contains(""));
    }

    #[test]
    fn test_snapshot_survives_rebuild() {
        let handle = TableHandle::new(MacroTable::build(&[MacroDefinition::new("a", "old")]));
        let before = handle.snapshot();

        handle.rebuild(&[MacroDefinition::new("a", "new")]);

        assert_eq!(before.lookup("a").map(|d| d.template()), Some("old"));
        assert_eq!(
            handle.snapshot().lookup("a").map(|d| d.template()),
            Some("new")
        );
    }

    #[test]
    fn test_cloned_handles_share_the_slot() {
        let handle = TableHandle::default();
        let reader = handle.clone();
        assert!(reader.snapshot().is_empty());

        handle.rebuild(&[MacroDefinition::new("a", "x")]);
        assert!(reader.snapshot().contains("a"));
    }

    #[test]
    fn test_rebuild_drops_removed_names() {
        let handle = TableHandle::new(MacroTable::build(&[
            MacroDefinition::new("a", "x"),
            MacroDefinition::new("b", "y"),
        ]));
        handle.rebuild(&[MacroDefinition::new("b", "y")]);
        assert!(!handle.snapshot().contains("a"));
    }

    #[test]
    fn test_concurrent_readers_see_whole_tables() {
        let handle = TableHandle::new(MacroTable::build(&[
            MacroDefinition::new("a", "1"),
            MacroDefinition::new("b", "1"),
        ]));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let reader = handle.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let table = reader.snapshot();
                        let a = table.lookup("a").map(|d| d.template().to_string());
                        let b = table.lookup("b").map(|d| d.template().to_string());
                        assert_eq!(a, b);
                    }
                })
            })
            .collect();

        for round in 0..200 {
            let body = round.to_string();
            handle.rebuild(&[
                MacroDefinition::new("a", body.as_str()),
                MacroDefinition::new("b", body.as_str()),
            ]);
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
