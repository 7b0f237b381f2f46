//! Interactive culling loop
//!
//! Reads one key name (or `:command`) per line, resolves it through the key
//! map and drives a single `Session`. Gallery events are drained from a
//! channel after every command and folded into the views.

use anyhow::Result;
use app_core::{
    event_channel, AppConfig, AppError, CloseDecision, CloseRequest, Command, CommandId,
    CommandOutcome, ExitChoice, GalleryEvent, GalleryPhase, KeyMap, Session,
};
use app_fs::DefaultFileOperations;
use crossbeam_channel::Receiver;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::views::Views;

/// How the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The folder picker was cancelled; no session ran
    NoSession,
    Closed,
}

enum Input {
    Command(Command),
    Help,
    Unknown(String),
    /// Export key pressed before any destination is known
    NoDestination(String),
    Eof,
}

pub struct App<R, W> {
    input: R,
    output: W,
    config: AppConfig,
    keymap: KeyMap,
}

impl<R: BufRead, W: Write> App<R, W> {
    pub fn new(config: AppConfig, input: R, output: W) -> Self {
        let keymap = KeyMap::new(&config.keybindings);
        Self {
            input,
            output,
            config,
            keymap,
        }
    }

    /// Configuration including the folders and destination used this run
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn run(&mut self, initial_dir: Option<PathBuf>) -> Result<RunExit> {
        let Some(mut session) = self.open_session(initial_dir)? else {
            tracing::info!("No folder selected, exiting");
            return Ok(RunExit::NoSession);
        };

        let (observer, events) = event_channel::<PathBuf>();
        session.subscribe(observer);
        let mut views = Views::new(&session);

        writeln!(self.output, "{}", views.render(&session))?;

        loop {
            let cmd = match self.read_input()? {
                Input::Command(cmd) => cmd,
                Input::Help => {
                    self.print_help()?;
                    continue;
                }
                Input::Unknown(key) => {
                    writeln!(self.output, "Unknown key: {} (:help lists keys)", key)?;
                    continue;
                }
                Input::NoDestination(key) => {
                    writeln!(self.output, "No export destination yet for {}; run :export <dir> once.", key)?;
                    continue;
                }
                Input::Eof => {
                    if session.is_dirty() {
                        tracing::warn!("Input closed with unexported discards");
                        writeln!(self.output, "Input closed; discards were not exported.")?;
                    }
                    break;
                }
            };

            match session.execute(&cmd) {
                Ok(CommandOutcome::Quit(request)) => {
                    if self.confirm_close(&mut session, request)? {
                        break;
                    }
                }
                Ok(outcome) => {
                    if let CommandOutcome::Exported(report) = &outcome {
                        self.config.export.last_destination = Some(report.destination.display().to_string());
                    }
                    self.drain(&events, &mut views, &session);
                    self.report(&outcome)?;
                    if session.gallery().phase() == GalleryPhase::Empty {
                        writeln!(self.output, "No photos left. Export with :export <dir> or quit with q.")?;
                    } else {
                        writeln!(self.output, "{}", views.render(&session))?;
                    }
                }
                Err(e) if e.is_recoverable() => {
                    tracing::debug!("Command {} failed: {}", cmd.id.as_str(), e);
                    writeln!(self.output, "{}", e.user_message())?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if let Some(dest) = session.last_destination() {
            self.config.export.last_destination = Some(dest.to_string());
        }

        tracing::info!("Session closed");
        Ok(RunExit::Closed)
    }

    /// Pick a folder until one has photos, or the user cancels
    fn open_session(&mut self, initial_dir: Option<PathBuf>) -> Result<Option<Session>> {
        let mut candidate = initial_dir;

        loop {
            let dir = match candidate.take() {
                Some(dir) => Some(dir),
                None => self.prompt("Select directory: ")?.filter(|s| !s.is_empty()).map(PathBuf::from),
            };

            if let Some(dir) = dir {
                match Session::open(&dir, &self.config, Box::new(DefaultFileOperations::new())) {
                    Ok(session) => {
                        self.config.push_recent_folder(&dir);
                        return Ok(Some(session));
                    }
                    Err(e) if is_retryable_open_error(&e) => {
                        tracing::warn!("Cannot open {}: {}", dir.display(), e);
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            writeln!(self.output, "No photos found or no directory selected")?;
            match self.prompt("[r]etry / [c]ancel: ")?.as_deref() {
                Some("c") | Some("cancel") | None => return Ok(None),
                _ => continue,
            }
        }
    }

    /// Returns whether the session may end
    fn confirm_close(&mut self, session: &mut Session, request: CloseRequest) -> Result<bool> {
        if request == CloseRequest::CloseNow {
            return Ok(true);
        }

        loop {
            writeln!(
                self.output,
                "You may have unsaved changes. Do you want to save and quit, quit without saving, or cancel?"
            )?;
            let choice = match self.prompt("[s]ave / [d]iscard / [c]ancel: ")?.as_deref() {
                Some("s") | Some("save") => match self.ask_destination(session)? {
                    Some(dest) => ExitChoice::SaveAndExit(dest),
                    None => ExitChoice::Cancel,
                },
                Some("d") | Some("discard") => ExitChoice::DiscardAndExit,
                Some("c") | Some("cancel") | None => ExitChoice::Cancel,
                Some(_) => continue,
            };

            return match session.resolve_close(choice) {
                Ok(CloseDecision::Close) => Ok(true),
                Ok(CloseDecision::Stay) => Ok(false),
                Ok(CloseDecision::ExportFailed(report)) => {
                    writeln!(
                        self.output,
                        "Could not copy {} of {} images; staying open.",
                        report.failed.len(),
                        report.failed.len() + report.copied.len()
                    )?;
                    Ok(false)
                }
                Err(e) if e.is_recoverable() => {
                    writeln!(self.output, "{}", e.user_message())?;
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            };
        }
    }

    fn ask_destination(&mut self, session: &Session) -> Result<Option<PathBuf>> {
        let default = session
            .last_destination()
            .map(str::to_string)
            .or_else(|| self.config.export.last_destination.clone());

        let prompt = match &default {
            Some(d) => format!("Destination [{}]: ", d),
            None => "Destination: ".to_string(),
        };

        let answer = self.prompt(&prompt)?.filter(|s| !s.is_empty()).or(default);
        Ok(answer.map(PathBuf::from))
    }

    fn drain(&self, events: &Receiver<GalleryEvent<PathBuf>>, views: &mut Views, session: &Session) {
        for event in events.try_iter() {
            views.apply(&event, session);
        }
    }

    fn report(&mut self, outcome: &CommandOutcome) -> Result<()> {
        match outcome {
            CommandOutcome::Discarded(path) => {
                writeln!(self.output, "Discarded {}", path.display())?;
            }
            CommandOutcome::Exported(report) => {
                writeln!(
                    self.output,
                    "Copied {} images to {}",
                    report.copied.len(),
                    report.destination.display()
                )?;
                for (path, reason) in &report.failed {
                    writeln!(self.output, "  failed: {} ({})", path.display(), reason)?;
                }
            }
            CommandOutcome::Ignored => writeln!(self.output, "Nothing to do")?,
            CommandOutcome::Selected(_) | CommandOutcome::Quit(_) => {}
        }
        Ok(())
    }

    fn read_input(&mut self) -> Result<Input> {
        let Some(line) = self.prompt("> ")? else {
            return Ok(Input::Eof);
        };

        if let Some(rest) = line.strip_prefix(':') {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let name = parts.next().unwrap_or_default();
            let arg = parts.next().map(str::trim).unwrap_or_default();

            return Ok(match name {
                "help" => Input::Help,
                "export" if !arg.is_empty() => {
                    Input::Command(Command::new(CommandId::FILE_EXPORT).with_path(arg))
                }
                "select" => match arg.parse::<i64>() {
                    Ok(n) => Input::Command(Command::new(CommandId::GALLERY_SELECT).with_int(n)),
                    Err(_) => Input::Unknown(line.clone()),
                },
                _ => Input::Unknown(line.clone()),
            });
        }

        match self.keymap.resolve(&line) {
            Some(cmd) if cmd.is(CommandId::FILE_EXPORT) => {
                // Bound key without a path: reuse the last destination
                let dest = self.config.export.last_destination.clone();
                Ok(match dest {
                    Some(d) => Input::Command(cmd.with_path(&d)),
                    None => Input::NoDestination(line),
                })
            }
            Some(cmd) => Ok(Input::Command(cmd)),
            None => Ok(Input::Unknown(line)),
        }
    }

    /// `None` on end of input
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print_help(&mut self) -> Result<()> {
        let rows = [
            ("next", CommandId::GALLERY_NEXT),
            ("previous", CommandId::GALLERY_PREVIOUS),
            ("keep", CommandId::GALLERY_KEEP),
            ("discard", CommandId::GALLERY_DISCARD),
            ("first", CommandId::GALLERY_FIRST),
            ("last", CommandId::GALLERY_LAST),
            ("export", CommandId::FILE_EXPORT),
            ("quit", CommandId::APP_QUIT),
        ];
        for (label, id) in rows {
            writeln!(self.output, "  {:<9} {}", label, self.keymap.keys_for(id).join(", "))?;
        }
        writeln!(self.output, "  :export <dir>  :select <n>  :help")?;
        Ok(())
    }
}

// Anything the user can fix by picking another folder
fn is_retryable_open_error(e: &AppError) -> bool {
    e.is_empty_collection()
        || matches!(e, AppError::FileNotFound(_) | AppError::InvalidPath(_) | AppError::Io(_))
}
