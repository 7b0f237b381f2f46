//! Command system for user actions

use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Command identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Gallery commands
    pub const GALLERY_NEXT: &'static str = "gallery.next";
    pub const GALLERY_PREVIOUS: &'static str = "gallery.previous";
    pub const GALLERY_KEEP: &'static str = "gallery.keep";
    pub const GALLERY_DISCARD: &'static str = "gallery.discard";
    pub const GALLERY_SELECT: &'static str = "gallery.select";
    pub const GALLERY_FIRST: &'static str = "gallery.first";
    pub const GALLERY_LAST: &'static str = "gallery.last";

    // File commands
    pub const FILE_EXPORT: &'static str = "file.export";

    // App commands
    pub const APP_QUIT: &'static str = "app.quit";
}

/// Command with optional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub id: CommandId,
    pub params: CommandParams,
}

/// Command parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandParams {
    pub int_value: Option<i64>,
    pub path_value: Option<String>,
}

impl Command {
    pub fn new(id: &str) -> Self {
        Self {
            id: CommandId::new(id),
            params: CommandParams::default(),
        }
    }

    pub fn with_int(mut self, value: i64) -> Self {
        self.params.int_value = Some(value);
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.params.path_value = Some(path.to_string());
        self
    }

    pub fn is(&self, id: &str) -> bool {
        self.id.as_str() == id
    }
}

/// Maps key strings ("Right", "Shift+Return", "Ctrl+s") to commands
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    bindings: HashMap<String, String>,
}

impl KeyMap {
    /// Build from the config layout: command id -> keys
    pub fn new(bindings: &HashMap<String, Vec<String>>) -> Self {
        // Invert the bindings map: command -> keys becomes key -> command.
        // Commands are visited in id order so a conflict always keeps the same one.
        let mut commands: Vec<_> = bindings.iter().collect();
        commands.sort_by(|a, b| a.0.cmp(b.0));

        let mut key_to_command: HashMap<String, String> = HashMap::new();
        for (command, keys) in commands {
            for key in keys {
                match key_to_command.entry(key.to_lowercase()) {
                    Entry::Occupied(existing) => {
                        if existing.get() != command {
                            tracing::warn!(
                                "Key {} bound to both {} and {}, keeping {}",
                                key,
                                existing.get(),
                                command,
                                existing.get()
                            );
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(command.clone());
                    }
                }
            }
        }

        Self { bindings: key_to_command }
    }

    /// Resolve a key string, ignoring case
    pub fn resolve(&self, key: &str) -> Option<Command> {
        let key = key.trim().to_lowercase();
        tracing::debug!("Key pressed: {}", key);
        self.bindings.get(&key).map(|cmd_id| Command::new(cmd_id))
    }

    /// Keys bound to `command_id`, for help output
    pub fn keys_for(&self, command_id: &str) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .bindings
            .iter()
            .filter(|(_, cmd)| cmd.as_str() == command_id)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}
