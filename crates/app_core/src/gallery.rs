//! Gallery navigation state
//!
//! `GalleryState` owns the ordered items of a culling session, the current
//! selection and the dirty flag. Every mutation notifies the registered
//! observers before returning.
//!
//! The gallery has two phases. `Active` holds at least one item and a valid
//! selection. `Empty` is entered when the last item is discarded; it is
//! terminal, and navigation or discard calls fail with
//! [`GalleryError::EmptyCollection`].

use crate::error::GalleryError;
use crate::event::{GalleryEvent, GalleryObserver, ObserverId, ObserverList};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Opaque identifier of one browsable unit (a file path in the app)
pub trait ItemRef: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> ItemRef for T {}

/// Lifecycle phase of a gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryPhase {
    Active,
    Empty,
}

/// Ordered, browsable, discard-only collection
pub struct GalleryState<T: ItemRef> {
    items: Vec<T>,
    /// `Some` exactly while `items` is non-empty
    selected: Option<usize>,
    dirty: bool,
    observers: ObserverList<T>,
}

impl<T: ItemRef> GalleryState<T> {
    /// Create a gallery over `items`, selecting the first one
    pub fn new(items: Vec<T>) -> Result<Self, GalleryError> {
        if items.is_empty() {
            return Err(GalleryError::EmptyCollection);
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item) {
                return Err(GalleryError::DuplicateItem(format!("{:?}", item)));
            }
        }

        tracing::debug!("Gallery created with {} items", items.len());

        Ok(Self {
            items,
            selected: Some(0),
            dirty: false,
            observers: ObserverList::new(),
        })
    }

    /// Register an observer; it sees every event from now on
    pub fn subscribe<O>(&mut self, observer: O) -> ObserverId
    where
        O: GalleryObserver<T> + 'static,
    {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn phase(&self) -> GalleryPhase {
        if self.items.is_empty() {
            GalleryPhase::Empty
        } else {
            GalleryPhase::Active
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Owned copy of the items, for handing to an export
    pub fn snapshot(&self) -> Vec<T> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `None` once the gallery is empty
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after the host exported the current items
    pub fn mark_clean(&mut self) {
        if self.dirty {
            tracing::debug!("Gallery marked clean");
        }
        self.dirty = false;
    }

    /// Position of `item`, by identity
    pub fn position_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }

    /// Advance the selection, wrapping to the first item
    pub fn next(&mut self) -> Result<usize, GalleryError> {
        let (current, len) = self.active_selection()?;
        let index = (current + 1) % len;
        self.set_selected(index);
        Ok(index)
    }

    /// Move the selection back, wrapping to the last item
    pub fn previous(&mut self) -> Result<usize, GalleryError> {
        let (current, len) = self.active_selection()?;
        let index = (current + len - 1) % len;
        self.set_selected(index);
        Ok(index)
    }

    /// Select `index` directly
    ///
    /// Indices outside `[0, len)` are ignored without notification, since
    /// callers may hold indices from a view that has not caught up yet.
    /// Returns whether the selection was applied; fails once `Empty`.
    pub fn select(&mut self, index: isize) -> Result<bool, GalleryError> {
        let (_, len) = self.active_selection()?;
        match usize::try_from(index) {
            Ok(i) if i < len => {
                self.set_selected(i);
                Ok(true)
            }
            _ => {
                tracing::debug!("Ignoring out-of-range select({}) with {} items", index, len);
                Ok(false)
            }
        }
    }

    /// Select `item` by identity; unknown items are ignored like stale
    /// indices
    pub fn select_item(&mut self, item: &T) -> Result<bool, GalleryError> {
        self.active_selection()?;
        match self.position_of(item) {
            Some(i) => {
                self.set_selected(i);
                Ok(true)
            }
            None => {
                tracing::debug!("Ignoring select of unknown item {:?}", item);
                Ok(false)
            }
        }
    }

    /// Remove the selected item and return it
    ///
    /// Observers see `ItemRemoved` first, then either `SelectionChanged`
    /// for the item that slid into place (wrapping to the first item when
    /// the last one was removed) or `CollectionEmptied`.
    pub fn discard_current(&mut self) -> Result<T, GalleryError> {
        let (current, _) = self.active_selection()?;

        let removed = self.items.remove(current);
        self.dirty = true;
        tracing::debug!("Discarded {:?} at {}, {} left", removed, current, self.items.len());

        self.observers.emit(&GalleryEvent::ItemRemoved(removed.clone()));

        if self.items.is_empty() {
            self.selected = None;
            tracing::info!("Gallery is empty");
            self.observers.emit(&GalleryEvent::CollectionEmptied);
        } else {
            let index = current % self.items.len();
            self.selected = Some(index);
            self.observers.emit(&GalleryEvent::SelectionChanged(index));
        }

        Ok(removed)
    }

    fn active_selection(&self) -> Result<(usize, usize), GalleryError> {
        match self.selected {
            Some(i) if !self.items.is_empty() => Ok((i, self.items.len())),
            _ => Err(GalleryError::EmptyCollection),
        }
    }

    fn set_selected(&mut self, index: usize) {
        self.selected = Some(index);
        self.observers.emit(&GalleryEvent::SelectionChanged(index));
    }
}

impl<T: ItemRef> fmt::Debug for GalleryState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryState")
            .field("items", &self.items)
            .field("selected", &self.selected)
            .field("dirty", &self.dirty)
            .field("observers", &self.observers.len())
            .finish()
    }
}
