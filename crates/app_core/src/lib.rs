//! PhotoSieve Core Domain Logic
//!
//! This crate contains:
//! - Gallery navigation state and its change notifications
//! - Culling session (export, exit gate)
//! - Command system and key map
//! - Configuration
//! - Error types

pub mod gallery;
pub mod event;
pub mod session;
pub mod config;
pub mod command;
pub mod error;

pub use gallery::{GalleryPhase, GalleryState, ItemRef};
pub use event::{event_channel, ChannelObserver, GalleryEvent, GalleryObserver, ObserverId, ObserverList};
pub use session::{CloseDecision, CloseRequest, CommandOutcome, ExitChoice, ExportReport, Session};
pub use config::{AppConfig, GeneralConfig, GalleryConfig, ExportConfig, MAX_RECENT_FOLDERS};
pub use command::{Command, CommandId, CommandParams, KeyMap};
pub use error::{AppError, GalleryError};
