//! `/list`: a running tally of times people have been "added to The List".

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

use crate::{
    commands::{
        names::NameResolver,
        schema::{CommandSchema, OptionSchema},
        CommandContext, SlashCommand,
    },
    config::Config,
    domain::{RoleId, UserId},
    messaging::types::Reply,
    ports::PasteService,
    store::{
        list::most_recent,
        models::{EntryType, ListEntry, NewListEntry},
    },
    Result,
};

const REMOVE_REASON: &str = "Tried to remove someone from The List.";
const HELP_REASON: &str = "Didn't know about The List.";
const EXPORT_FILENAME: &str = "list.txt";
const PASTE_TITLE: &str = "The List";

/// Counts that earn an extra announcement when reached exactly.
const MILESTONES: &[(i64, &str)] = &[
    (42, "haha."),
    (69, "nice."),
    (404, "Server reset incoming."),
    (489, "https://i.redd.it/pakxnxjsbos51.jpg"),
    (420, "very nice."),
    (789, "Very scary."),
    (911, "Too soon."),
    (9000, "Too early."),
    (9001, "There we go."),
];

pub fn milestone(count: i64) -> Option<&'static str> {
    MILESTONES
        .iter()
        .find(|(n, _)| *n == count)
        .map(|(_, text)| *text)
}

pub struct ListCommand;

#[async_trait]
impl SlashCommand for ListCommand {
    fn schema(&self) -> CommandSchema {
        CommandSchema::new(
            "list",
            "The List",
            vec![
                OptionSchema::subcommand(
                    "add",
                    "Add an entry to The List.",
                    vec![
                        OptionSchema::user("user", "The user to add to The List.", true),
                        OptionSchema::string(
                            "reason",
                            "The reason this user was added to The List.",
                            false,
                        ),
                    ],
                ),
                OptionSchema::subcommand(
                    "remove",
                    "Remove an entry from The List.",
                    vec![OptionSchema::user(
                        "user",
                        "The user to remove the latest entry of from The List.",
                        true,
                    )],
                ),
                OptionSchema::subcommand(
                    "check",
                    "Check The List.  If a user is not specified, returns an upload of The List.",
                    vec![OptionSchema::user(
                        "user",
                        "Check a specific user's presence on The List.",
                        false,
                    )],
                ),
                OptionSchema::subcommand("help", "Explain The List.", vec![]),
            ],
        )
    }

    fn permissions(&self, cfg: &Config) -> Vec<RoleId> {
        cfg.member_role_id.into_iter().collect()
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<()> {
        let caller = ctx.caller();
        info!(subcommand = ?ctx.invocation.subcommand, caller = %caller, "list command");

        match ctx.invocation.subcommand.as_deref() {
            Some("add") => {
                let target = ctx.required_user("user")?;
                let reason = ctx.invocation.string_option("reason");
                add_entry(ctx, target, caller, reason).await?;
            }
            // Trying to remove someone puts the caller on The List instead.
            Some("remove") => {
                add_entry(ctx, caller, caller, Some(REMOVE_REASON)).await?;
            }
            Some("check") => match ctx.invocation.user_option("user") {
                Some(user) => check_user(ctx, user).await?,
                None => export_all(ctx).await?,
            },
            Some("help") => {
                if add_entry(ctx, caller, caller, Some(HELP_REASON)).await? {
                    let label = ctx.state.cfg.list_label();
                    ctx.responder
                        .follow_up(Reply::public(format!(
                            "This guy {} doesn't know about {label}.",
                            caller.mention()
                        )))
                        .await?;
                }
            }
            _ => ctx.unknown_subcommand().await?,
        }
        Ok(())
    }
}

/// Record one entry and announce it. Returns `false` when the entry could not be stored.
async fn add_entry(
    ctx: &CommandContext<'_>,
    target: UserId,
    adder: UserId,
    reason: Option<&str>,
) -> Result<bool> {
    let label = ctx.state.cfg.list_label();
    let store = &ctx.state.store;

    let inserted: Result<ListEntry> = async {
        let entry = store.find_or_create_user(target).await?;
        let added_by = store.find_or_create_user(adder).await?;
        store
            .insert_list_entry(NewListEntry {
                entry: entry.id,
                entry_type: EntryType::User,
                time_added: Utc::now(),
                added_by: added_by.id,
                reason: reason.map(str::to_string),
            })
            .await
    }
    .await;

    let row = match inserted {
        Ok(row) => row,
        Err(e) => {
            error!(target = %target, error = %e, "failed adding list entry");
            ctx.responder
                .reply(Reply::ephemeral(format!(
                    "Failed to add {} to {label}.",
                    target.mention()
                )))
                .await?;
            return Ok(false);
        }
    };

    let content = match reason {
        Some(reason) => format!(
            "Added {} to {label} with reason: '{reason}'.",
            target.mention()
        ),
        None => format!("Added {} to {label}.", target.mention()),
    };
    ctx.responder.reply(Reply::public(content)).await?;

    let count = store.count_list_entries(row.entry).await?;
    if let Some(text) = milestone(count) {
        ctx.responder
            .follow_up(Reply::public(format!(
                "{} has been added to {label} *{count}* times.  {text}",
                target.mention()
            )))
            .await?;
    }
    Ok(true)
}

async fn check_user(ctx: &CommandContext<'_>, user: UserId) -> Result<()> {
    let label = ctx.state.cfg.list_label();
    let store = &ctx.state.store;

    let loaded: Result<(Vec<ListEntry>, String)> = async {
        let row = store.find_or_create_user(user).await?;
        let entries = store.list_entries_for(row.id).await?;
        let body = render_entries(ctx, &entries).await?;
        Ok((entries, body))
    }
    .await;

    let (entries, body) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(user = %user, error = %e, "failed checking list entries");
            return ctx
                .responder
                .reply(Reply::ephemeral(format!("Failed to check {label}.")))
                .await;
        }
    };

    let Some(latest) = most_recent(&entries) else {
        return ctx
            .responder
            .reply(Reply::public(format!("{} is not on {label}.", user.mention())))
            .await;
    };

    let detail = match latest.reason.as_deref() {
        Some(reason) => format!("'{reason}'"),
        None => "no reason given".to_string(),
    };
    let content = format!(
        "{} has been added to {label} *{}* time(s).  Most recent entry: {detail} ({}).",
        user.mention(),
        entries.len(),
        format_time(latest),
    );

    ctx.responder
        .reply(Reply::public(content).with_file(EXPORT_FILENAME, body.into_bytes()))
        .await
}

async fn export_all(ctx: &CommandContext<'_>) -> Result<()> {
    let label = ctx.state.cfg.list_label();

    let rendered: Result<Option<String>> = async {
        let entries = ctx.state.store.all_list_entries().await?;
        if entries.is_empty() {
            return Ok(None);
        }
        render_entries(ctx, &entries).await.map(Some)
    }
    .await;

    let body = match rendered {
        Ok(Some(body)) => body,
        Ok(None) => {
            return ctx
                .responder
                .reply(Reply::public(format!("{label} is empty.")))
                .await;
        }
        Err(e) => {
            error!(error = %e, "failed exporting list");
            return ctx
                .responder
                .reply(Reply::ephemeral(format!("Failed to check {label}.")))
                .await;
        }
    };

    match ctx.state.paste.as_deref() {
        Some(paste) => upload(ctx, paste, &label, &body).await,
        None => {
            ctx.responder
                .reply(Reply::file(EXPORT_FILENAME, body.into_bytes()))
                .await
        }
    }
}

async fn upload(
    ctx: &CommandContext<'_>,
    paste: &dyn PasteService,
    label: &str,
    body: &str,
) -> Result<()> {
    match paste.create_paste(PASTE_TITLE, body).await {
        Ok(url) => ctx.responder.reply(Reply::public(format!("{label}: {url}"))).await,
        Err(e) => {
            error!(error = %e, "failed to upload list export");
            ctx.responder
                .reply(Reply::ephemeral(format!("Failed to upload {label}.")))
                .await
        }
    }
}

async fn render_entries(ctx: &CommandContext<'_>, entries: &[ListEntry]) -> Result<String> {
    let mut names = NameResolver::new(&ctx.state.store, ctx.gateway);
    let mut out = String::new();
    for (i, e) in entries.iter().enumerate() {
        let name = names.name(e.entry).await?;
        let adder = names.name(e.added_by).await?;
        out.push_str(&format!(
            "{}.\t{name}\t\tAdded by: {adder}\t\tReason: {}\t\tTime added: {}\n",
            i + 1,
            e.reason.as_deref().unwrap_or("N/A"),
            format_time(e),
        ));
    }
    Ok(out)
}

fn format_time(e: &ListEntry) -> String {
    e.time_added.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
