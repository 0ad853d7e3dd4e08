//! Command registry — static table of chat commands and their aliases
//!
//! Built once at startup by [`Registry::builtin`] and shared read-only.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;

/// Which handler runs a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Firewall,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDefinition {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub kind: CommandKind,
}

/// Name and alias lookup for commands.
pub struct Registry {
    commands: HashMap<String, CommandDefinition>,
    /// alias → command name
    aliases: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Registry holding every built-in command.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        reg.register_command(make_command(
            "firewall",
            &["fw"],
            "Manage firewalld zones and forward ports",
            CommandKind::Firewall,
        ));
        reg
    }

    /// Register a command definition and its aliases
    pub fn register_command(&mut self, command: CommandDefinition) {
        info!(
            "Loaded command {} (aliases: {})",
            command.name,
            command.aliases.join(", ")
        );
        for alias in &command.aliases {
            self.aliases.insert(alias.clone(), command.name.clone());
        }
        self.commands.insert(command.name.clone(), command);
    }

    /// Look a command up by name, then by alias
    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name).or_else(|| {
            self.aliases
                .get(name)
                .and_then(|target| self.commands.get(target))
        })
    }

    /// All commands, sorted by name
    pub fn list_commands(&self) -> Vec<CommandDefinition> {
        let mut commands: Vec<_> = self.commands.values().cloned().collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    /// Get total command count
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to create a CommandDefinition
pub fn make_command(
    name: &str,
    aliases: &[&str],
    description: &str,
    kind: CommandKind,
) -> CommandDefinition {
    CommandDefinition {
        name: name.to_string(),
        aliases: aliases.iter().map(|s| s.to_string()).collect(),
        description: description.to_string(),
        kind,
    }
}
