//! Culling session
//!
//! A `Session` owns the gallery of one picked folder together with the
//! export collaborator and the exit gate. It is the only writer of the
//! gallery; views subscribe and read.

use crate::command::{Command, CommandId};
use crate::config::{AppConfig, ExportConfig};
use crate::error::AppError;
use crate::event::{GalleryObserver, ObserverId};
use crate::gallery::GalleryState;
use app_fs::FileOperations;
use std::path::{Path, PathBuf};

/// Result of executing a command against a session
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Selection moved to this index
    Selected(usize),
    /// The command had no effect (stale index, unknown command)
    Ignored,
    Discarded(PathBuf),
    Exported(ExportReport),
    Quit(CloseRequest),
}

/// What an export copied and what it could not
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportReport {
    pub destination: PathBuf,
    pub copied: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Answer to "may the session end now?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequest {
    CloseNow,
    /// Unexported discards exist; ask the user for an [`ExitChoice`]
    NeedsConfirmation,
}

/// The user's answer to the unsaved-changes prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitChoice {
    SaveAndExit(PathBuf),
    DiscardAndExit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CloseDecision {
    Close,
    Stay,
    /// Save was chosen but some copies failed; the session stays open
    ExportFailed(ExportReport),
}

pub struct Session {
    source_dir: PathBuf,
    gallery: GalleryState<PathBuf>,
    ops: Box<dyn FileOperations>,
    export: ExportConfig,
    confirm_exit: bool,
}

impl Session {
    /// List the images in `dir` and start a session over them
    ///
    /// A folder without eligible images yields
    /// `AppError::Gallery(GalleryError::EmptyCollection)`; retrying or
    /// giving up is the caller's decision.
    pub fn open<P: AsRef<Path>>(
        dir: P,
        config: &AppConfig,
        ops: Box<dyn FileOperations>,
    ) -> Result<Self, AppError> {
        let dir = dir.as_ref();
        let images = app_fs::list_images(dir, &config.gallery.list_options())?;
        let gallery = GalleryState::new(images)?;

        tracing::info!("Session opened on {} with {} images", dir.display(), gallery.len());

        Ok(Self {
            source_dir: dir.to_path_buf(),
            gallery,
            ops,
            export: config.export.clone(),
            confirm_exit: config.general.confirm_exit_when_dirty,
        })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn gallery(&self) -> &GalleryState<PathBuf> {
        &self.gallery
    }

    pub fn subscribe<O>(&mut self, observer: O) -> ObserverId
    where
        O: GalleryObserver<PathBuf> + 'static,
    {
        self.gallery.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.gallery.unsubscribe(id)
    }

    pub fn is_dirty(&self) -> bool {
        self.gallery.is_dirty()
    }

    /// "current/total" with a 1-based position, "0/0" once empty
    pub fn counter_label(&self) -> String {
        match self.gallery.selected_index() {
            Some(i) => format!("{}/{}", i + 1, self.gallery.len()),
            None => "0/0".to_string(),
        }
    }

    /// Destination of the last export, if any
    pub fn last_destination(&self) -> Option<&str> {
        self.export.last_destination.as_deref()
    }

    /// Dispatch a command
    pub fn execute(&mut self, cmd: &Command) -> Result<CommandOutcome, AppError> {
        let outcome = match cmd.id.as_str() {
            CommandId::GALLERY_NEXT | CommandId::GALLERY_KEEP => {
                CommandOutcome::Selected(self.gallery.next()?)
            }
            CommandId::GALLERY_PREVIOUS => CommandOutcome::Selected(self.gallery.previous()?),
            CommandId::GALLERY_FIRST => self.select_edge(false)?,
            CommandId::GALLERY_LAST => self.select_edge(true)?,
            CommandId::GALLERY_SELECT => {
                let index = cmd.params.int_value.ok_or_else(|| {
                    AppError::InvalidCommand(format!("{} needs an index", cmd.id.as_str()))
                })?;
                self.select(index)?
            }
            CommandId::GALLERY_DISCARD => {
                CommandOutcome::Discarded(self.gallery.discard_current()?)
            }
            CommandId::FILE_EXPORT => {
                let dest = cmd.params.path_value.as_deref().ok_or_else(|| {
                    AppError::InvalidCommand(format!("{} needs a destination", cmd.id.as_str()))
                })?;
                CommandOutcome::Exported(self.export_to(dest)?)
            }
            CommandId::APP_QUIT => CommandOutcome::Quit(self.close_request()),
            other => {
                tracing::warn!("Unknown command: {}", other);
                CommandOutcome::Ignored
            }
        };

        Ok(outcome)
    }

    /// Select by index; out-of-range indices are ignored
    pub fn select(&mut self, index: i64) -> Result<CommandOutcome, AppError> {
        let index = isize::try_from(index).unwrap_or(isize::MAX);
        Ok(if self.gallery.select(index)? {
            self.selected_outcome()
        } else {
            CommandOutcome::Ignored
        })
    }

    /// Select by identity, e.g. from a click on a thumbnail
    pub fn select_item(&mut self, item: &Path) -> Result<CommandOutcome, AppError> {
        Ok(if self.gallery.select_item(&item.to_path_buf())? {
            self.selected_outcome()
        } else {
            CommandOutcome::Ignored
        })
    }

    /// Copy the current items into `dest`
    ///
    /// The dirty flag is cleared only when every item was copied.
    pub fn export_to<P: AsRef<Path>>(&mut self, dest: P) -> Result<ExportReport, AppError> {
        let dest = dest.as_ref();
        self.ops.create_dir(dest)?;

        let mut report = ExportReport {
            destination: dest.to_path_buf(),
            ..Default::default()
        };

        for source in self.gallery.snapshot() {
            match self.ops.copy_file(&source, dest, self.export.overwrite) {
                Ok(target) => report.copied.push(target),
                Err(e) => {
                    tracing::warn!("Failed to export {}: {}", source.display(), e);
                    report.failed.push((source, e.to_string()));
                }
            }
        }

        self.export.last_destination = Some(dest.display().to_string());

        if report.is_complete() {
            self.gallery.mark_clean();
            tracing::info!("Exported {} images to {}", report.copied.len(), dest.display());

            if self.export.open_after_export {
                if let Err(e) = self.ops.open_external(dest) {
                    tracing::warn!("Could not open {}: {}", dest.display(), e);
                }
            }
        } else {
            tracing::warn!(
                "Export to {} incomplete: {} copied, {} failed",
                dest.display(),
                report.copied.len(),
                report.failed.len()
            );
        }

        Ok(report)
    }

    /// Exit gate: clean sessions may close right away
    pub fn close_request(&self) -> CloseRequest {
        if self.gallery.is_dirty() && self.confirm_exit {
            CloseRequest::NeedsConfirmation
        } else {
            CloseRequest::CloseNow
        }
    }

    /// Apply the user's answer to the unsaved-changes prompt
    pub fn resolve_close(&mut self, choice: ExitChoice) -> Result<CloseDecision, AppError> {
        let decision = match choice {
            ExitChoice::SaveAndExit(dest) => {
                let report = self.export_to(&dest)?;
                if report.is_complete() {
                    CloseDecision::Close
                } else {
                    CloseDecision::ExportFailed(report)
                }
            }
            ExitChoice::DiscardAndExit => CloseDecision::Close,
            ExitChoice::Cancel => CloseDecision::Stay,
        };

        tracing::debug!("Close resolved: {:?}", decision);
        Ok(decision)
    }

    fn select_edge(&mut self, last: bool) -> Result<CommandOutcome, AppError> {
        let index = if last { self.gallery.len() as i64 - 1 } else { 0 };
        self.select(index)
    }

    fn selected_outcome(&self) -> CommandOutcome {
        self.gallery
            .selected_index()
            .map_or(CommandOutcome::Ignored, CommandOutcome::Selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{event_channel, GalleryEvent};
    use app_fs::{DefaultFileOperations, FileOpError};
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;

    /// Real copies, but records opens instead of launching a file manager
    #[derive(Default)]
    struct RecordingOps {
        inner: DefaultFileOperations,
        opened: Rc<RefCell<Vec<PathBuf>>>,
        fail_on: Option<String>,
    }

    impl FileOperations for RecordingOps {
        fn copy_file(&self, source: &Path, target_dir: &Path, overwrite: bool) -> Result<PathBuf, FileOpError> {
            let name = source.file_name().map(|n| n.to_string_lossy().to_string());
            if name.is_some() && name == self.fail_on {
                return Err(FileOpError::InvalidOperation("disk full".into()));
            }
            self.inner.copy_file(source, target_dir, overwrite)
        }

        fn create_dir(&self, path: &Path) -> Result<(), FileOpError> {
            self.inner.create_dir(path)
        }

        fn open_external(&self, path: &Path) -> Result<(), FileOpError> {
            self.opened.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    fn photo_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        dir
    }

    fn open(dir: &Path) -> (Session, Rc<RefCell<Vec<PathBuf>>>) {
        open_with(dir, None)
    }

    fn open_with(dir: &Path, fail_on: Option<&str>) -> (Session, Rc<RefCell<Vec<PathBuf>>>) {
        let opened = Rc::new(RefCell::new(Vec::new()));
        let ops = RecordingOps {
            opened: opened.clone(),
            fail_on: fail_on.map(str::to_string),
            ..Default::default()
        };
        let session = Session::open(dir, &AppConfig::default(), Box::new(ops)).unwrap();
        (session, opened)
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_open_lists_sorted_images() {
        let dir = photo_dir(&["c.jpg", "a.png", "b.gif", "notes.txt"]);
        let (session, _) = open(dir.path());

        assert_eq!(file_names(session.gallery().items()), vec!["a.png", "b.gif", "c.jpg"]);
        assert_eq!(session.counter_label(), "1/3");
        assert_eq!(session.close_request(), CloseRequest::CloseNow);
        assert_eq!(session.source_dir(), dir.path());
    }

    #[test]
    fn test_open_without_images_is_empty_collection() {
        let dir = photo_dir(&["notes.txt"]);
        let result = Session::open(dir.path(), &AppConfig::default(), Box::new(RecordingOps::default()));
        assert!(result.err().map_or(false, |e| e.is_empty_collection()));
    }

    #[test]
    fn test_open_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let result = Session::open(
            dir.path().join("gone"),
            &AppConfig::default(),
            Box::new(RecordingOps::default()),
        );
        assert!(matches!(result, Err(AppError::FileNotFound(_))));
    }

    #[test]
    fn test_navigation_commands() {
        let dir = photo_dir(&["a.jpg", "b.jpg", "c.jpg"]);
        let (mut session, _) = open(dir.path());

        let next = Command::new(CommandId::GALLERY_NEXT);
        let keep = Command::new(CommandId::GALLERY_KEEP);
        let prev = Command::new(CommandId::GALLERY_PREVIOUS);

        assert_eq!(session.execute(&next).unwrap(), CommandOutcome::Selected(1));
        assert_eq!(session.execute(&keep).unwrap(), CommandOutcome::Selected(2));
        assert_eq!(session.execute(&next).unwrap(), CommandOutcome::Selected(0));
        assert_eq!(session.execute(&prev).unwrap(), CommandOutcome::Selected(2));

        let last = Command::new(CommandId::GALLERY_LAST);
        let first = Command::new(CommandId::GALLERY_FIRST);
        assert_eq!(session.execute(&first).unwrap(), CommandOutcome::Selected(0));
        assert_eq!(session.execute(&last).unwrap(), CommandOutcome::Selected(2));
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_select_commands() {
        let dir = photo_dir(&["a.jpg", "b.jpg", "c.jpg"]);
        let (mut session, _) = open(dir.path());

        let select = |i| Command::new(CommandId::GALLERY_SELECT).with_int(i);
        assert_eq!(session.execute(&select(1)).unwrap(), CommandOutcome::Selected(1));
        assert_eq!(session.execute(&select(-1)).unwrap(), CommandOutcome::Ignored);
        assert_eq!(session.execute(&select(3)).unwrap(), CommandOutcome::Ignored);
        assert_eq!(session.execute(&select(i64::MAX)).unwrap(), CommandOutcome::Ignored);
        assert_eq!(session.gallery().selected_index(), Some(1));

        let missing = Command::new(CommandId::GALLERY_SELECT);
        assert!(matches!(session.execute(&missing), Err(AppError::InvalidCommand(_))));

        let c = dir.path().join("c.jpg");
        assert_eq!(session.select_item(&c).unwrap(), CommandOutcome::Selected(2));
        assert_eq!(session.select_item(Path::new("/nowhere.jpg")).unwrap(), CommandOutcome::Ignored);
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let dir = photo_dir(&["a.jpg"]);
        let (mut session, _) = open(dir.path());
        let outcome = session.execute(&Command::new("view.zoom_in")).unwrap();
        assert_eq!(outcome, CommandOutcome::Ignored);
    }

    #[test]
    fn test_discard_until_empty() {
        let dir = photo_dir(&["a.jpg", "b.jpg"]);
        let (mut session, _) = open(dir.path());
        let (observer, rx) = event_channel::<PathBuf>();
        session.subscribe(observer);

        let discard = Command::new(CommandId::GALLERY_DISCARD);
        assert_eq!(
            session.execute(&discard).unwrap(),
            CommandOutcome::Discarded(dir.path().join("a.jpg"))
        );
        assert_eq!(session.counter_label(), "1/1");
        assert_eq!(
            session.execute(&discard).unwrap(),
            CommandOutcome::Discarded(dir.path().join("b.jpg"))
        );
        assert_eq!(session.counter_label(), "0/0");

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                GalleryEvent::ItemRemoved(dir.path().join("a.jpg")),
                GalleryEvent::SelectionChanged(0),
                GalleryEvent::ItemRemoved(dir.path().join("b.jpg")),
                GalleryEvent::CollectionEmptied,
            ]
        );

        for id in [
            CommandId::GALLERY_NEXT,
            CommandId::GALLERY_PREVIOUS,
            CommandId::GALLERY_DISCARD,
            CommandId::GALLERY_FIRST,
            CommandId::GALLERY_LAST,
        ] {
            let err = session.execute(&Command::new(id)).unwrap_err();
            assert!(err.is_empty_collection(), "{} should fail when empty", id);
        }
        let select = Command::new(CommandId::GALLERY_SELECT).with_int(0);
        assert!(session.execute(&select).unwrap_err().is_empty_collection());
        let stale = dir.path().join("a.jpg");
        assert!(session.select_item(&stale).unwrap_err().is_empty_collection());

        // Source files are never touched by discarding
        assert!(dir.path().join("a.jpg").exists());
        assert_eq!(session.close_request(), CloseRequest::NeedsConfirmation);
    }

    #[test]
    fn test_export_copies_kept_and_clears_dirty() {
        let dir = photo_dir(&["a.jpg", "b.jpg", "c.jpg"]);
        let out = tempfile::tempdir().unwrap();
        let dest = out.path().join("kept");
        let (mut session, opened) = open(dir.path());

        session.execute(&Command::new(CommandId::GALLERY_NEXT)).unwrap();
        session.execute(&Command::new(CommandId::GALLERY_DISCARD)).unwrap();
        assert!(session.is_dirty());

        let cmd = Command::new(CommandId::FILE_EXPORT).with_path(&dest.display().to_string());
        let report = match session.execute(&cmd).unwrap() {
            CommandOutcome::Exported(report) => report,
            other => panic!("unexpected outcome {:?}", other),
        };

        assert!(report.is_complete());
        assert_eq!(file_names(&report.copied), vec!["a.jpg", "c.jpg"]);
        assert!(!dest.join("b.jpg").exists());
        assert_eq!(fs::read(dest.join("c.jpg")).unwrap(), b"c.jpg");
        assert!(!session.is_dirty());
        assert_eq!(*opened.borrow(), vec![dest.clone()]);
        assert_eq!(session.last_destination(), Some(dest.display().to_string().as_str()));
        assert_eq!(session.close_request(), CloseRequest::CloseNow);
    }

    #[test]
    fn test_partial_export_keeps_dirty() {
        let dir = photo_dir(&["a.jpg", "b.jpg", "c.jpg"]);
        let out = tempfile::tempdir().unwrap();
        let (mut session, opened) = open_with(dir.path(), Some("c.jpg"));

        session.execute(&Command::new(CommandId::GALLERY_DISCARD)).unwrap();
        let report = session.export_to(out.path()).unwrap();

        assert!(!report.is_complete());
        assert_eq!(file_names(&report.copied), vec!["b.jpg"]);
        assert_eq!(report.failed.len(), 1);
        assert!(session.is_dirty());
        assert!(opened.borrow().is_empty());
    }

    #[test]
    fn test_export_requires_destination() {
        let dir = photo_dir(&["a.jpg"]);
        let (mut session, _) = open(dir.path());
        let result = session.execute(&Command::new(CommandId::FILE_EXPORT));
        assert!(matches!(result, Err(AppError::InvalidCommand(_))));
    }

    #[test]
    fn test_close_gate() {
        let dir = photo_dir(&["a.jpg", "b.jpg"]);
        let out = tempfile::tempdir().unwrap();
        let (mut session, _) = open(dir.path());

        let quit = Command::new(CommandId::APP_QUIT);
        assert_eq!(session.execute(&quit).unwrap(), CommandOutcome::Quit(CloseRequest::CloseNow));

        session.execute(&Command::new(CommandId::GALLERY_DISCARD)).unwrap();
        assert_eq!(
            session.execute(&quit).unwrap(),
            CommandOutcome::Quit(CloseRequest::NeedsConfirmation)
        );

        assert_eq!(session.resolve_close(ExitChoice::Cancel).unwrap(), CloseDecision::Stay);
        assert!(session.is_dirty());
        assert_eq!(session.resolve_close(ExitChoice::DiscardAndExit).unwrap(), CloseDecision::Close);
        assert!(session.is_dirty());

        let decision = session
            .resolve_close(ExitChoice::SaveAndExit(out.path().to_path_buf()))
            .unwrap();
        assert_eq!(decision, CloseDecision::Close);
        assert!(out.path().join("b.jpg").exists());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_save_and_exit_with_failures_stays_open() {
        let dir = photo_dir(&["a.jpg", "b.jpg"]);
        let out = tempfile::tempdir().unwrap();
        let (mut session, _) = open_with(dir.path(), Some("b.jpg"));

        session.execute(&Command::new(CommandId::GALLERY_DISCARD)).unwrap();
        let decision = session
            .resolve_close(ExitChoice::SaveAndExit(out.path().to_path_buf()))
            .unwrap();
        assert!(matches!(decision, CloseDecision::ExportFailed(ref r) if r.failed.len() == 1));
        assert_eq!(session.close_request(), CloseRequest::NeedsConfirmation);
    }

    #[test]
    fn test_confirmation_can_be_disabled() {
        let dir = photo_dir(&["a.jpg", "b.jpg"]);
        let mut config = AppConfig::default();
        config.general.confirm_exit_when_dirty = false;
        let mut session = Session::open(dir.path(), &config, Box::new(RecordingOps::default())).unwrap();

        session.execute(&Command::new(CommandId::GALLERY_DISCARD)).unwrap();
        assert!(session.is_dirty());
        assert_eq!(session.close_request(), CloseRequest::CloseNow);
    }
}
