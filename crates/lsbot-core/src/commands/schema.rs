//! Platform-neutral slash-command declarations. The Discord adapter converts
//! these into registration payloads.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
    SubCommand,
    User,
    Integer,
    String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionSchema {
    pub kind: OptionKind,
    pub name: String,
    pub description: String,
    pub required: bool,
    /// Only populated for `SubCommand`.
    pub options: Vec<OptionSchema>,
}

impl OptionSchema {
    pub fn subcommand(name: &str, description: &str, options: Vec<OptionSchema>) -> Self {
        Self {
            kind: OptionKind::SubCommand,
            name: name.to_string(),
            description: description.to_string(),
            required: false,
            options,
        }
    }

    pub fn user(name: &str, description: &str, required: bool) -> Self {
        Self::leaf(OptionKind::User, name, description, required)
    }

    pub fn integer(name: &str, description: &str, required: bool) -> Self {
        Self::leaf(OptionKind::Integer, name, description, required)
    }

    pub fn string(name: &str, description: &str, required: bool) -> Self {
        Self::leaf(OptionKind::String, name, description, required)
    }

    fn leaf(kind: OptionKind, name: &str, description: &str, required: bool) -> Self {
        Self {
            kind,
            name: name.to_string(),
            description: description.to_string(),
            required,
            options: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSchema {
    pub name: String,
    pub description: String,
    pub options: Vec<OptionSchema>,
}

impl CommandSchema {
    pub fn new(name: &str, description: &str, options: Vec<OptionSchema>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            options,
        }
    }
}

/// A command as the platform knows it after registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredCommand {
    pub id: u64,
    pub name: String,
}
