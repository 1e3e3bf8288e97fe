use std::sync::Arc;

use crate::commands::{
    deploy::DeployCommand, list::ListCommand, points::PointsCommand, schema::CommandSchema,
    track::TrackCommand, MessageCommand, SlashCommand,
};

/// Immutable name → handler mapping, built once at startup.
///
/// Entries keep insertion order, which is also the order commands are deployed in.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    slash: Vec<(String, Arc<dyn SlashCommand>)>,
    message: Vec<(String, Arc<dyn MessageCommand>)>,
}

impl CommandRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The bot's full command set.
    pub fn standard() -> Self {
        Self::builder()
            .slash(ListCommand)
            .slash(PointsCommand)
            .slash(TrackCommand)
            .message(DeployCommand)
            .build()
    }

    /// Look up a slash command by its normalized name (`List`).
    pub fn slash(&self, name: &str) -> Option<&dyn SlashCommand> {
        self.slash
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, c)| c.as_ref())
    }

    pub fn message(&self, name: &str) -> Option<&dyn MessageCommand> {
        self.message
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, c)| c.as_ref())
    }

    pub fn slash_commands(&self) -> impl Iterator<Item = &dyn SlashCommand> {
        self.slash.iter().map(|(_, c)| c.as_ref())
    }

    pub fn schemas(&self) -> Vec<CommandSchema> {
        self.slash_commands().map(|c| c.schema()).collect()
    }

    pub fn slash_names(&self) -> Vec<&str> {
        self.slash.iter().map(|(k, _)| k.as_str()).collect()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    slash: Vec<(String, Arc<dyn SlashCommand>)>,
    message: Vec<(String, Arc<dyn MessageCommand>)>,
}

impl RegistryBuilder {
    /// Registers under the normalized schema name. A later duplicate replaces the earlier entry.
    pub fn slash(mut self, cmd: impl SlashCommand + 'static) -> Self {
        let key = normalize_command_name(&cmd.schema().name);
        self.slash.retain(|(k, _)| *k != key);
        self.slash.push((key, Arc::new(cmd)));
        self
    }

    pub fn message(mut self, cmd: impl MessageCommand + 'static) -> Self {
        let key = cmd.name().to_string();
        self.message.retain(|(k, _)| *k != key);
        self.message.push((key, Arc::new(cmd)));
        self
    }

    pub fn build(self) -> CommandRegistry {
        CommandRegistry {
            slash: self.slash,
            message: self.message,
        }
    }
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Slash-command name as stored in the registry: `LIST` / `list` → `List`.
pub fn normalize_command_name(name: &str) -> String {
    capitalize(&name.to_lowercase())
}

/// Registry key for a modal custom id: its first whitespace-separated token, normalized.
pub fn modal_command_name(custom_id: &str) -> Option<String> {
    custom_id
        .split_whitespace()
        .next()
        .map(normalize_command_name)
}
