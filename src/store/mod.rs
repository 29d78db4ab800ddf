//! Overlay collections.
//!
//! Each collection is an [`OverlayStore`] behind a [`SharedStore`] handle.
//! Handles are created by the shell and passed to whoever reads or writes the
//! collection (renderers, timeline, editor panels, service jobs); nothing in
//! the crate reaches a collection through a global.

use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::overlay::{Overlay, new_id};
use crate::types::subtitle::Subtitle;
use crate::types::text_overlay::TextOverlay;

pub type SubtitleStore = SharedStore<Subtitle>;
pub type TextStore = SharedStore<TextOverlay>;

/// Ordered collection of overlays. Insertion order is significant: it is the
/// tie-break for overlapping subtitles and the stacking order for text.
///
/// All operations are total. Unknown ids are ignored and reported through
/// the `bool`/`Option` return, never as an error.
#[derive(Debug, Clone)]
pub struct OverlayStore<T: Overlay> {
    items: Vec<T>,
    revision: u64,
}

impl<T: Overlay> Default for OverlayStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Overlay> OverlayStore<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            revision: 0,
        }
    }

    pub fn from_items(items: Vec<T>) -> Self {
        let mut store = Self::new();
        store.replace_all(items);
        store
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bumped on every mutation; views compare it to skip unchanged frames.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Appends `item` under a freshly minted id and returns that id.
    pub fn add(&mut self, mut item: T) -> String {
        let id = new_id();
        item.set_id(id.clone());
        self.items.push(item);
        self.touch();
        log::debug!("overlay {} added ({} total)", id, self.items.len());
        id
    }

    pub fn update(&mut self, id: &str, patch: &T::Patch) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                item.apply(patch);
                self.touch();
                true
            }
            None => {
                log::debug!("update ignored, no overlay {}", id);
                false
            }
        }
    }

    /// Moves an overlay's window in a single write so start and end can
    /// never be observed half-applied.
    pub fn set_window(&mut self, id: &str, start: f64, end: f64) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                item.set_window(start, end);
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let removed = self.items.len() != before;
        if removed {
            self.touch();
            log::debug!("overlay {} removed", id);
        }
        removed
    }

    /// Bulk overwrite. Ids that are missing or repeated are replaced so the
    /// collection never holds two entities with one id.
    pub fn replace_all(&mut self, items: Vec<T>) {
        let mut seen = HashSet::new();
        self.items = items
            .into_iter()
            .map(|mut item| {
                if item.id().is_empty() || !seen.insert(item.id().to_string()) {
                    let id = new_id();
                    seen.insert(id.clone());
                    item.set_id(id);
                }
                item
            })
            .collect();
        self.touch();
        log::debug!("overlays replaced ({} total)", self.items.len());
    }

    /// Appends a copy of `id` placed per [`Overlay::duplicated`]. Returns the
    /// new id.
    pub fn duplicate(&mut self, id: &str) -> Option<String> {
        let copy = self.get(id)?.duplicated();
        Some(self.add(copy))
    }

    /// Appends a copy built by `f` instead of the type's default placement.
    pub fn duplicate_with(&mut self, id: &str, f: impl FnOnce(&T) -> T) -> Option<String> {
        let copy = f(self.get(id)?);
        Some(self.add(copy))
    }

    pub fn active_at(&self, now: f64) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().filter(move |item| item.is_active_at(now))
    }

    /// First active overlay in insertion order.
    pub fn first_active_at(&self, now: f64) -> Option<&T> {
        self.items.iter().find(|item| item.is_active_at(now))
    }

    /// End of the last overlay in insertion order, 0 when empty.
    pub fn last_end(&self) -> f64 {
        self.items.last().map(|item| item.end()).unwrap_or(0.0)
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl OverlayStore<Subtitle> {
    /// Appends a default subtitle right after the last one.
    pub fn add_after_last(&mut self, span: f64) -> String {
        let subtitle = Subtitle::appended_after(self.last_end(), span);
        self.add(subtitle)
    }
}

/// Cloneable handle to one overlay collection.
///
/// Lock poisoning is recovered from: a panic in one editor must not take the
/// collection away from the renderers.
#[derive(Debug)]
pub struct SharedStore<T: Overlay> {
    inner: Arc<RwLock<OverlayStore<T>>>,
}

impl<T: Overlay> Clone for SharedStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Overlay> Default for SharedStore<T> {
    fn default() -> Self {
        Self::new(OverlayStore::new())
    }
}

impl<T: Overlay> SharedStore<T> {
    pub fn new(store: OverlayStore<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn from_items(items: Vec<T>) -> Self {
        Self::new(OverlayStore::from_items(items))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, OverlayStore<T>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, OverlayStore<T>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.read().items().to_vec()
    }

    pub fn revision(&self) -> u64 {
        self.read().revision()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.read().get(id).cloned()
    }

    pub fn add(&self, item: T) -> String {
        self.write().add(item)
    }

    pub fn update(&self, id: &str, patch: &T::Patch) -> bool {
        self.write().update(id, patch)
    }

    pub fn set_window(&self, id: &str, start: f64, end: f64) -> bool {
        self.write().set_window(id, start, end)
    }

    pub fn remove(&self, id: &str) -> bool {
        self.write().remove(id)
    }

    pub fn replace_all(&self, items: Vec<T>) {
        self.write().replace_all(items)
    }

    pub fn duplicate(&self, id: &str) -> Option<String> {
        self.write().duplicate(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::subtitle::SubtitlePatch;
    use crate::types::text_overlay::{Position, TextPatch};

    fn subs(windows: &[(f64, f64)]) -> OverlayStore<Subtitle> {
        OverlayStore::from_items(
            windows
                .iter()
                .enumerate()
                .map(|(i, (s, e))| Subtitle::new(*s, *e, format!("sub {}", i)))
                .collect(),
        )
    }

    #[test]
    fn test_add_mints_unique_ids_and_appends() {
        let mut store = subs(&[(0.0, 1.0)]);
        let a = store.add(Subtitle::new(5.0, 6.0, "a"));
        let b = store.add(Subtitle::new(2.0, 3.0, "b"));
        assert_ne!(a, b);
        assert_eq!(store.items()[1].id, a);
        assert_eq!(store.items()[2].id, b);
        assert_eq!(store.last_end(), 3.0);
    }

    #[test]
    fn test_add_after_last_uses_insertion_order() {
        let mut store = subs(&[(10.0, 12.0), (0.0, 2.0)]);
        let id = store.add_after_last(2.0);
        let added = store.get(&id).unwrap();
        assert_eq!(added.start, 2.0);
        assert_eq!(added.end, 4.0);

        let mut empty: OverlayStore<Subtitle> = OverlayStore::new();
        let id = empty.add_after_last(2.0);
        assert_eq!(empty.get(&id).unwrap().start, 0.0);
    }

    #[test]
    fn test_update_and_remove_unknown_id_are_noops() {
        let mut store = subs(&[(0.0, 1.0)]);
        let before = store.items().to_vec();
        let revision = store.revision();
        assert!(!store.update("missing", &SubtitlePatch::text("x")));
        assert!(!store.remove("missing"));
        assert_eq!(store.items(), &before[..]);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_duplicate_subtitle() {
        let mut store = subs(&[(1.0, 2.5)]);
        let source = store.items()[0].clone();
        let id = store.duplicate(&source.id).unwrap();
        let copy = store.get(&id).unwrap();
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.start, source.end);
        assert!(((copy.end - copy.start) - (source.end - source.start)).abs() < 1e-9);
        assert!(store.duplicate("missing").is_none());
    }

    #[test]
    fn test_replace_all_repairs_ids() {
        let mut a = Subtitle::new(0.0, 1.0, "a");
        a.id = "dup".to_string();
        let mut b = Subtitle::new(1.0, 2.0, "b");
        b.id = "dup".to_string();
        let c = Subtitle::new(2.0, 3.0, "c");
        let mut store: OverlayStore<Subtitle> = OverlayStore::new();
        store.replace_all(vec![a, b, c]);
        let ids: HashSet<_> = store.items().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(store.items()[0].id, "dup");
        assert!(!store.items()[2].id.is_empty());
    }

    #[test]
    fn test_first_active_tie_break_is_insertion_order() {
        let store = subs(&[(0.0, 10.0), (2.0, 6.0)]);
        let first = store.first_active_at(3.0).unwrap();
        assert_eq!(first.text, "sub 0");
        assert_eq!(store.active_at(3.0).count(), 2);
    }

    #[test]
    fn test_shared_handles_see_each_others_writes() {
        let store = TextStore::default();
        let other = store.clone();
        let id = store.add(TextOverlay::new("t", 0.0, 3.0, Position::default()));
        assert!(other.update(&id, &TextPatch::position(10.0, 20.0)));
        assert_eq!(
            store.get(&id).unwrap().position,
            Position { left: 10.0, top: 20.0 }
        );
    }

    #[test]
    fn test_patches_from_two_editors_do_not_clobber_each_other() {
        let store = SubtitleStore::from_items(vec![Subtitle::new(0.0, 2.0, "x")]);
        let id = store.snapshot()[0].id.clone();
        // A drag writes the window while the panel writes the text.
        store.set_window(&id, 1.0, 3.0);
        store.update(&id, &SubtitlePatch::text("edited"));
        let sub = store.get(&id).unwrap();
        assert_eq!((sub.start, sub.end), (1.0, 3.0));
        assert_eq!(sub.text, "edited");
    }
}
