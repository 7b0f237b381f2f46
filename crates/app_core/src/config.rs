//! Application configuration

use app_fs::{ListOptions, SortBy, DEFAULT_IMAGE_EXTENSIONS};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::command::CommandId;

/// How many folders `recent_folders` remembers
pub const MAX_RECENT_FOLDERS: usize = 10;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub gallery: GalleryConfig,
    pub export: ExportConfig,
    pub keybindings: HashMap<String, Vec<String>>,
    pub recent_folders: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            gallery: GalleryConfig::default(),
            export: ExportConfig::default(),
            keybindings: default_keybindings(),
            recent_folders: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Ask before quitting with unexported discards
    pub confirm_exit_when_dirty: bool,
    /// Log files older than this are removed at startup
    pub log_retention_days: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            confirm_exit_when_dirty: true,
            log_retention_days: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub extensions: Vec<String>,
    pub sort_by: SortBy,
    pub show_hidden: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            sort_by: SortBy::Name,
            show_hidden: false,
        }
    }
}

impl GalleryConfig {
    /// Listing options for the initial collection
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            show_hidden: self.show_hidden,
            sort_by: self.sort_by,
            extensions: self
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Open the destination in the file manager after a complete export
    pub open_after_export: bool,
    pub overwrite: bool,
    pub last_destination: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            open_after_export: true,
            overwrite: true,
            last_destination: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, defaulting when missing
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "PhotoSieve", "PhotoSieve")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Move `folder` to the front of the recent list
    pub fn push_recent_folder<P: AsRef<Path>>(&mut self, folder: P) {
        let folder = folder.as_ref().display().to_string();
        self.recent_folders.retain(|f| *f != folder);
        self.recent_folders.insert(0, folder);
        self.recent_folders.truncate(MAX_RECENT_FOLDERS);
    }

    pub fn most_recent_folder(&self) -> Option<PathBuf> {
        self.recent_folders.first().map(PathBuf::from)
    }
}

fn default_keybindings() -> HashMap<String, Vec<String>> {
    let mut kb = HashMap::new();

    // ========================================
    // Gallery (gallery.*)
    // ========================================

    kb.insert(
        CommandId::GALLERY_NEXT.into(),
        vec!["Right".into(), "Return".into(), "Enter".into()],
    );
    kb.insert(
        CommandId::GALLERY_PREVIOUS.into(),
        vec!["Left".into(), "Shift+Return".into()],
    );
    kb.insert(CommandId::GALLERY_KEEP.into(), vec!["k".into()]);
    kb.insert(
        CommandId::GALLERY_DISCARD.into(),
        vec!["Delete".into(), "Backspace".into(), "d".into()],
    );
    kb.insert(CommandId::GALLERY_FIRST.into(), vec!["Home".into()]);
    kb.insert(CommandId::GALLERY_LAST.into(), vec!["End".into()]);

    // ========================================
    // File (file.*)
    // ========================================

    kb.insert(CommandId::FILE_EXPORT.into(), vec!["Ctrl+s".into()]);

    // ========================================
    // App (app.*)
    // ========================================

    kb.insert(CommandId::APP_QUIT.into(), vec!["q".into(), "Escape".into()]);

    kb
}
