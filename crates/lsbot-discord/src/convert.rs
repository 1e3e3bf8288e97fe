//! Conversions between serenity models/builders and the core's platform-neutral types.

use std::collections::HashMap;

use serenity::all::{
    ActionRowComponent, CommandInteraction, CommandOptionType, CreateActionRow, CreateAttachment,
    CreateCommand, CreateCommandOption, CreateInputText, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateModal, InputTextStyle, Interaction, InteractionType,
    Message, ModalInteraction, ResolvedOption, ResolvedValue,
};

use lsbot_core::{
    commands::schema::{CommandSchema, OptionKind, OptionSchema},
    domain::{ChannelId, GuildId, UserId},
    messaging::types::{
        CommandInvocation, CommandOption, IncomingInteraction, Modal, ModalSubmission, OptionValue,
        Reply, TextMessage,
    },
};

// === Outgoing ===

pub fn create_command(schema: &CommandSchema) -> CreateCommand {
    schema.options.iter().fold(
        CreateCommand::new(&schema.name).description(&schema.description),
        |cmd, opt| cmd.add_option(create_option(opt)),
    )
}

fn create_option(opt: &OptionSchema) -> CreateCommandOption {
    let kind = match opt.kind {
        OptionKind::SubCommand => CommandOptionType::SubCommand,
        OptionKind::User => CommandOptionType::User,
        OptionKind::Integer => CommandOptionType::Integer,
        OptionKind::String => CommandOptionType::String,
    };
    let base = CreateCommandOption::new(kind, &opt.name, &opt.description).required(opt.required);
    opt.options
        .iter()
        .fold(base, |o, sub| o.add_sub_option(create_option(sub)))
}

pub fn response_message(reply: Reply) -> CreateInteractionResponseMessage {
    let mut msg = CreateInteractionResponseMessage::new().ephemeral(reply.ephemeral);
    if let Some(content) = reply.content {
        msg = msg.content(content);
    }
    if let Some(file) = reply.attachment {
        msg = msg.add_file(CreateAttachment::bytes(file.bytes, file.filename));
    }
    msg
}

pub fn follow_up(reply: Reply) -> CreateInteractionResponseFollowup {
    let mut msg = CreateInteractionResponseFollowup::new().ephemeral(reply.ephemeral);
    if let Some(content) = reply.content {
        msg = msg.content(content);
    }
    if let Some(file) = reply.attachment {
        msg = msg.add_file(CreateAttachment::bytes(file.bytes, file.filename));
    }
    msg
}

pub fn create_modal(modal: Modal) -> CreateModal {
    let rows = modal
        .inputs
        .into_iter()
        .map(|input| {
            CreateActionRow::InputText(
                CreateInputText::new(InputTextStyle::Short, input.label, input.custom_id)
                    .required(input.required),
            )
        })
        .collect();
    CreateModal::new(modal.custom_id, modal.title).components(rows)
}

// === Incoming ===

pub fn text_message(msg: &Message) -> TextMessage {
    TextMessage {
        channel_id: ChannelId(msg.channel_id.get()),
        guild_id: msg.guild_id.map(|g| GuildId(g.get())),
        author_id: UserId(msg.author.id.get()),
        author_is_bot: msg.author.bot,
        content: msg.content.clone(),
    }
}

/// Flatten the option tree: a sub-command becomes `subcommand`, its options become `options`.
pub fn command_invocation(cmd: &CommandInteraction) -> CommandInvocation {
    let mut subcommand = None;
    let mut options = Vec::new();

    for opt in cmd.data.options() {
        match opt.value {
            ResolvedValue::SubCommand(inner) => {
                subcommand = Some(opt.name.to_string());
                options.extend(inner.into_iter().filter_map(command_option));
            }
            _ => options.extend(command_option(opt)),
        }
    }

    CommandInvocation {
        name: cmd.data.name.clone(),
        subcommand,
        options,
        caller: UserId(cmd.user.id.get()),
        channel_id: ChannelId(cmd.channel_id.get()),
        guild_id: cmd.guild_id.map(|g| GuildId(g.get())),
    }
}

fn command_option(opt: ResolvedOption<'_>) -> Option<CommandOption> {
    let value = match opt.value {
        ResolvedValue::User(user, _) => OptionValue::User(UserId(user.id.get())),
        ResolvedValue::Integer(v) => OptionValue::Integer(v),
        ResolvedValue::String(s) => OptionValue::String(s.to_string()),
        ResolvedValue::Boolean(b) => OptionValue::Boolean(b),
        _ => return None,
    };
    Some(CommandOption {
        name: opt.name.to_string(),
        value,
    })
}

/// Interaction kinds the core does not handle, kept only for logging.
pub fn other_interaction(interaction: &Interaction) -> IncomingInteraction {
    IncomingInteraction::Other {
        kind: interaction_kind(interaction.kind()),
    }
}

fn interaction_kind(kind: InteractionType) -> String {
    match kind {
        InteractionType::Ping => "ping".to_string(),
        InteractionType::Component => "component".to_string(),
        InteractionType::Autocomplete => "autocomplete".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

pub fn modal_submission(modal: &ModalInteraction) -> ModalSubmission {
    let fields: HashMap<String, String> = modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|c| match c {
            ActionRowComponent::InputText(input) => Some((
                input.custom_id.clone(),
                input.value.clone().unwrap_or_default(),
            )),
            _ => None,
        })
        .collect();

    ModalSubmission {
        custom_id: modal.data.custom_id.clone(),
        fields,
        caller: UserId(modal.user.id.get()),
        channel_id: ChannelId(modal.channel_id.get()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsbot_core::{
        commands::CommandRegistry,
        messaging::types::TextInput,
    };

    #[test]
    fn registry_schemas_convert_to_option_tree() {
        let schemas = CommandRegistry::standard().schemas();
        let list = serde_json::to_value(create_command(&schemas[0])).unwrap();

        assert_eq!(list["name"], "list");
        assert_eq!(list["description"], "The List");
        let add = &list["options"][0];
        assert_eq!(add["name"], "add");
        assert_eq!(add["type"], 1);
        assert_eq!(add["options"][0]["name"], "user");
        assert_eq!(add["options"][0]["type"], 6);
        assert_eq!(add["options"][0]["required"], true);
        assert_eq!(add["options"][1]["type"], 3);
        assert_eq!(add["options"][1]["required"], false);

        let points = serde_json::to_value(create_command(&schemas[1])).unwrap();
        assert_eq!(points["options"][0]["options"][1]["name"], "value");
        assert_eq!(points["options"][0]["options"][1]["type"], 4);
    }

    #[test]
    fn modal_carries_inputs_in_order() {
        let modal = create_modal(Modal {
            custom_id: "track add".into(),
            title: "Add Show".into(),
            inputs: vec![
                TextInput::short("anime", "MyAnimeList ID"),
                TextInput::short("episode", "Watched"),
            ],
        });
        let v = serde_json::to_value(modal).unwrap();

        assert_eq!(v["custom_id"], "track add");
        assert_eq!(v["title"], "Add Show");
        assert_eq!(v["components"][0]["components"][0]["custom_id"], "anime");
        assert_eq!(v["components"][1]["components"][0]["custom_id"], "episode");
    }

    #[test]
    fn unhandled_kinds_have_readable_names() {
        assert_eq!(interaction_kind(InteractionType::Ping), "ping");
        assert_eq!(interaction_kind(InteractionType::Component), "component");
        assert_eq!(interaction_kind(InteractionType::Autocomplete), "autocomplete");
    }

    #[test]
    fn reply_content_is_kept() {
        let v = serde_json::to_value(response_message(Reply::public("hi"))).unwrap();
        assert_eq!(v["content"], "hi");
    }
}
