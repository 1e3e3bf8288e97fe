use std::collections::HashMap;

use crate::domain::{ChannelId, GuildId, UserId};

/// Cross-platform incoming event model.
///
/// Discord-specific payloads are converted into these in the adapter crate.
#[derive(Clone, Debug)]
pub enum IncomingInteraction {
    Command(CommandInvocation),
    ModalSubmit(ModalSubmission),
    /// Pings, component clicks, autocomplete: nothing to do.
    Other { kind: String },
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author_id: UserId,
    pub author_is_bot: bool,
    pub content: String,
}

/// A slash command invocation with its (flattened) sub-command and options.
#[derive(Clone, Debug)]
pub struct CommandInvocation {
    pub name: String,
    pub subcommand: Option<String>,
    pub options: Vec<CommandOption>,
    pub caller: UserId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommandOption {
    pub name: String,
    pub value: OptionValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    User(UserId),
    Integer(i64),
    String(String),
    Boolean(bool),
}

impl CommandInvocation {
    fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .map(|o| &o.value)
    }

    pub fn user_option(&self, name: &str) -> Option<UserId> {
        match self.option(name) {
            Some(OptionValue::User(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn integer_option(&self, name: &str) -> Option<i64> {
        match self.option(name) {
            Some(OptionValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn string_option(&self, name: &str) -> Option<&str> {
        match self.option(name) {
            Some(OptionValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A submitted modal: its custom id plus the text input values keyed by input id.
#[derive(Clone, Debug)]
pub struct ModalSubmission {
    pub custom_id: String,
    pub fields: HashMap<String, String>,
    pub caller: UserId,
    pub channel_id: ChannelId,
}

impl ModalSubmission {
    pub fn field(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(|s| s.as_str())
    }
}

// === Outgoing ===

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reply {
    pub content: Option<String>,
    pub ephemeral: bool,
    pub attachment: Option<Attachment>,
}

impl Reply {
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ephemeral: true,
            attachment: None,
        }
    }

    pub fn file(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            attachment: Some(Attachment {
                filename: filename.into(),
                bytes,
            }),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.attachment = Some(Attachment {
            filename: filename.into(),
            bytes,
        });
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Structured input form shown in response to a slash command.
#[derive(Clone, Debug, PartialEq)]
pub struct Modal {
    pub custom_id: String,
    pub title: String,
    pub inputs: Vec<TextInput>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextInput {
    pub custom_id: String,
    pub label: String,
    pub required: bool,
}

impl TextInput {
    pub fn short(custom_id: &str, label: &str) -> Self {
        Self {
            custom_id: custom_id.to_string(),
            label: label.to_string(),
            required: true,
        }
    }
}
