//! Widgets keyed by their string id, stored in an arena.

use compact_str::CompactString;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

slotmap::new_key_type! {
    pub struct WidgetKey;
}

#[derive(Debug)]
pub struct WidgetRegistry<T> {
    arena: SlotMap<WidgetKey, (CompactString, T)>,
    index: FxHashMap<CompactString, WidgetKey>,
}

impl<T> Default for WidgetRegistry<T> {
    fn default() -> Self {
        Self {
            arena: SlotMap::with_key(),
            index: FxHashMap::default(),
        }
    }
}

impl<T> WidgetRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `data` under `id`. Returns `true` when an existing entry was
    /// overwritten.
    pub fn insert(&mut self, id: &str, data: T) -> bool {
        if let Some(slot) = self.index.get(id).and_then(|key| self.arena.get_mut(*key)) {
            slot.1 = data;
            return true;
        }
        let id = CompactString::from(id);
        let key = self.arena.insert((id.clone(), data));
        self.index.insert(id, key);
        false
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        let key = self.index.get(id)?;
        self.arena.get(*key).map(|(_, data)| data)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        let key = self.index.get(id)?;
        self.arena.get_mut(*key).map(|(_, data)| data)
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let key = self.index.remove(id)?;
        self.arena.remove(key).map(|(_, data)| data)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.arena.values().map(|(_, data)| data)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.arena.values().map(|(id, _)| id.as_str())
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/views/editor/widgets.rs"]
mod tests;
