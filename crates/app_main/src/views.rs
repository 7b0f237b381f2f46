//! Text views over a session: counter, thumbnail strip, viewer pane
//!
//! Views never touch the gallery. They react to drained events and read
//! the current items to resolve indices.

use app_core::{GalleryEvent, Session};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Thumbnails shown on each side of the selection
const STRIP_RADIUS: usize = 3;

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// "current/total" label above the viewer
#[derive(Debug, Default)]
pub struct CounterLabel {
    text: String,
}

impl CounterLabel {
    pub fn refresh(&mut self, session: &Session) {
        self.text = session.counter_label();
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Per-item thumbnail entry; dropped when its item is discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub label: String,
    pub selected: bool,
}

/// Horizontal strip of thumbnails keyed by item
#[derive(Debug, Default)]
pub struct ThumbnailStrip {
    thumbnails: HashMap<PathBuf, Thumbnail>,
    selected: Option<PathBuf>,
}

impl ThumbnailStrip {
    pub fn new(items: &[PathBuf]) -> Self {
        let thumbnails = items
            .iter()
            .map(|p| {
                (
                    p.clone(),
                    Thumbnail {
                        label: file_label(p),
                        selected: false,
                    },
                )
            })
            .collect();

        Self {
            thumbnails,
            selected: None,
        }
    }

    pub fn len(&self) -> usize {
        self.thumbnails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thumbnails.is_empty()
    }

    pub fn get(&self, item: &Path) -> Option<&Thumbnail> {
        self.thumbnails.get(item)
    }

    pub fn apply(&mut self, event: &GalleryEvent<PathBuf>, items: &[PathBuf]) {
        match event {
            GalleryEvent::SelectionChanged(index) => {
                // Stale index from an earlier event; a later one will fix it
                let Some(path) = items.get(*index) else { return };
                self.highlight(path.clone());
            }
            GalleryEvent::ItemRemoved(path) => {
                if self.thumbnails.remove(path).is_none() {
                    tracing::warn!("No thumbnail to release for {}", path.display());
                }
                if self.selected.as_ref() == Some(path) {
                    self.selected = None;
                }
            }
            GalleryEvent::CollectionEmptied => {
                self.thumbnails.clear();
                self.selected = None;
            }
        }
    }

    fn highlight(&mut self, path: PathBuf) {
        if let Some(previous) = self.selected.take() {
            if let Some(thumb) = self.thumbnails.get_mut(&previous) {
                thumb.selected = false;
            }
        }
        if let Some(thumb) = self.thumbnails.get_mut(&path) {
            thumb.selected = true;
        }
        self.selected = Some(path);
    }

    /// Render the window of thumbnails around the selection
    pub fn render(&self, items: &[PathBuf]) -> String {
        let center = self
            .selected
            .as_ref()
            .and_then(|s| items.iter().position(|p| p == s))
            .unwrap_or(0);
        let start = center.saturating_sub(STRIP_RADIUS);
        let end = (center + STRIP_RADIUS + 1).min(items.len());

        let mut parts = Vec::new();
        if start > 0 {
            parts.push("…".to_string());
        }
        for path in &items[start..end] {
            if let Some(thumb) = self.thumbnails.get(path) {
                if thumb.selected {
                    parts.push(format!("[{}]", thumb.label));
                } else {
                    parts.push(thumb.label.clone());
                }
            }
        }
        if end < items.len() {
            parts.push("…".to_string());
        }
        parts.join(" ")
    }
}

/// Full-size viewer; here it just names the selected file
#[derive(Debug, Default)]
pub struct ViewerPane {
    current: Option<PathBuf>,
}

impl ViewerPane {
    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn apply(&mut self, event: &GalleryEvent<PathBuf>, items: &[PathBuf]) {
        match event {
            GalleryEvent::SelectionChanged(index) => {
                if let Some(path) = items.get(*index) {
                    self.current = Some(path.clone());
                }
            }
            GalleryEvent::ItemRemoved(_) => {}
            GalleryEvent::CollectionEmptied => self.current = None,
        }
    }

    pub fn render(&self) -> String {
        match &self.current {
            Some(path) => path.display().to_string(),
            None => "(no photo)".to_string(),
        }
    }
}

/// Everything drawn for one session
#[derive(Debug, Default)]
pub struct Views {
    pub counter: CounterLabel,
    pub strip: ThumbnailStrip,
    pub viewer: ViewerPane,
}

impl Views {
    /// Build views for a freshly opened session and show its selection
    pub fn new(session: &Session) -> Self {
        let items = session.gallery().items();
        let mut views = Self {
            counter: CounterLabel::default(),
            strip: ThumbnailStrip::new(items),
            viewer: ViewerPane::default(),
        };
        if let Some(index) = session.gallery().selected_index() {
            views.apply(&GalleryEvent::SelectionChanged(index), session);
        }
        views.counter.refresh(session);
        views
    }

    pub fn apply(&mut self, event: &GalleryEvent<PathBuf>, session: &Session) {
        let items = session.gallery().items();
        self.strip.apply(event, items);
        self.viewer.apply(event, items);
        self.counter.refresh(session);
    }

    pub fn render(&self, session: &Session) -> String {
        format!(
            "{}  {}\n  {}",
            self.counter.text(),
            self.viewer.render(),
            self.strip.render(session.gallery().items())
        )
    }
}
