//! Gallery change notifications
//!
//! Observers are called synchronously, on the mutating thread, right after
//! the state change that triggered them.

use crossbeam_channel::{Receiver, Sender};

/// A change a presentation layer may need to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEvent<T> {
    /// A new item is selected; carries its index
    SelectionChanged(usize),
    /// An item left the collection; per-item resources keyed by it must be
    /// released
    ItemRemoved(T),
    /// The last item was removed. No further events follow.
    CollectionEmptied,
}

/// Receiver of gallery events
pub trait GalleryObserver<T> {
    fn on_event(&mut self, event: &GalleryEvent<T>);
}

impl<T, F> GalleryObserver<T> for F
where
    F: FnMut(&GalleryEvent<T>),
{
    fn on_event(&mut self, event: &GalleryEvent<T>) {
        self(event)
    }
}

/// Handle returned by registration, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Registered observers, notified in registration order
pub struct ObserverList<T> {
    next_id: u64,
    observers: Vec<(ObserverId, Box<dyn GalleryObserver<T>>)>,
}

impl<T> ObserverList<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            observers: Vec::new(),
        }
    }

    pub fn subscribe<O>(&mut self, observer: O) -> ObserverId
    where
        O: GalleryObserver<T> + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` when `id` was not registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn emit(&mut self, event: &GalleryEvent<T>) {
        for (_, observer) in self.observers.iter_mut() {
            observer.on_event(event);
        }
    }
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer that forwards events onto a channel
///
/// The send happens inside the mutating call, so a consumer draining the
/// receiver afterwards sees events in mutation order.
pub struct ChannelObserver<T> {
    tx: Sender<GalleryEvent<T>>,
}

impl<T> ChannelObserver<T> {
    pub fn new(tx: Sender<GalleryEvent<T>>) -> Self {
        Self { tx }
    }
}

impl<T: Clone> GalleryObserver<T> for ChannelObserver<T> {
    fn on_event(&mut self, event: &GalleryEvent<T>) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!("Gallery event receiver dropped");
        }
    }
}

/// Create a channel observer and the receiver the presentation layer drains
pub fn event_channel<T>() -> (ChannelObserver<T>, Receiver<GalleryEvent<T>>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (ChannelObserver::new(tx), rx)
}
