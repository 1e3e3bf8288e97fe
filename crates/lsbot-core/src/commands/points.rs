//! `/points`: the server's ranking system.

use async_trait::async_trait;
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
    store::models::PointsEntry,
    Result,
};

/// Largest single adjustment; totals themselves are unbounded.
pub const MAX_ADJUSTMENT: i64 = 9000;

const HELP_TEXT: &str = "Award points with `/points add` and deduct them with `/points remove`. \
Each adjustment must be between 1 and 9000 points. Use `/points check` to see a user's total or the full rankings.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Award,
    Deduct,
}

pub struct PointsCommand;

#[async_trait]
impl SlashCommand for PointsCommand {
    fn schema(&self) -> CommandSchema {
        CommandSchema::new(
            "points",
            "'Liam's Server' ranking system.",
            vec![
                OptionSchema::subcommand(
                    "add",
                    "Award points to a user.",
                    vec![
                        OptionSchema::user("user", "The user to award points to.", true),
                        OptionSchema::integer("value", "The amount of points to award.", true),
                        OptionSchema::string(
                            "reason",
                            "The reason these points were awarded.",
                            false,
                        ),
                    ],
                ),
                OptionSchema::subcommand(
                    "remove",
                    "Deduct points from a user.",
                    vec![
                        OptionSchema::user("user", "The user to deduct points from.", true),
                        OptionSchema::integer("value", "The amount of points to deduct.", true),
                        OptionSchema::string(
                            "reason",
                            "The reason these points were deducted.",
                            false,
                        ),
                    ],
                ),
                OptionSchema::subcommand(
                    "check",
                    "Check the rankings.  If a user is not specified, returns an ordered upload of the rankings.",
                    vec![OptionSchema::user(
                        "user",
                        "Check a specific user's ranking.",
                        false,
                    )],
                ),
                OptionSchema::subcommand("help", "Explain 'Liam's Server' ranking system.", vec![]),
            ],
        )
    }

    fn permissions(&self, cfg: &Config) -> Vec<RoleId> {
        cfg.member_role_id.into_iter().collect()
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<()> {
        info!(subcommand = ?ctx.invocation.subcommand, caller = %ctx.caller(), "points command");

        match ctx.invocation.subcommand.as_deref() {
            Some("add") => adjust(ctx, Direction::Award).await,
            Some("remove") => adjust(ctx, Direction::Deduct).await,
            Some("check") => match ctx.invocation.user_option("user") {
                Some(user) => check_user(ctx, user).await,
                None => leaderboard(ctx).await,
            },
            Some("help") => ctx.responder.reply(Reply::ephemeral(HELP_TEXT)).await,
            _ => ctx.unknown_subcommand().await,
        }
    }
}

async fn adjust(ctx: &CommandContext<'_>, direction: Direction) -> Result<()> {
    let user = ctx.required_user("user")?;
    let value = ctx.required_integer("value")?;
    let reason = ctx.invocation.string_option("reason");

    if value <= 0 || value > MAX_ADJUSTMENT {
        return ctx
            .responder
            .reply(Reply::ephemeral(
                "Points value must be positive and below 9000.",
            ))
            .await;
    }

    let delta = match direction {
        Direction::Award => value,
        Direction::Deduct => -value,
    };

    let store = &ctx.state.store;
    let adjusted: Result<PointsEntry> = async {
        let target = store.find_or_create_user(user).await?;
        store.find_or_create_user(ctx.caller()).await?;
        store.adjust_points(target.id, delta).await
    }
    .await;

    let entry = match adjusted {
        Ok(entry) => entry,
        Err(e) => {
            error!(user = %user, delta, error = %e, "failed adjusting points");
            return ctx
                .responder
                .reply(Reply::ephemeral(format!(
                    "Failed to adjust points for {}.",
                    user.mention()
                )))
                .await;
        }
    };

    let verb = match direction {
        Direction::Award => "awarded",
        Direction::Deduct => "deducted",
    };
    let mut content = format!(
        "{} was {verb} {value} point(s) by {}! New total: {}.",
        user.mention(),
        ctx.caller().mention(),
        entry.value
    );
    if let Some(reason) = reason {
        content.push_str(&format!(" Reason: '{reason}'"));
    }
    ctx.responder.reply(Reply::public(content)).await
}

async fn check_user(ctx: &CommandContext<'_>, user: UserId) -> Result<()> {
    let store = &ctx.state.store;
    let found: Result<PointsEntry> = async {
        let row = store.find_or_create_user(user).await?;
        store.find_or_create_points(row.id).await
    }
    .await;

    let reply = match found {
        Ok(points) => Reply::public(format!("{} has {} points.", user.mention(), points.value)),
        Err(e) => {
            error!(user = %user, error = %e, "failed checking points");
            Reply::ephemeral(format!("Failed to check points for {}.", user.mention()))
        }
    };
    ctx.responder.reply(reply).await
}

async fn leaderboard(ctx: &CommandContext<'_>) -> Result<()> {
    let rendered: Result<Option<String>> = async {
        let rows = ctx.state.store.points_leaderboard().await?;
        if rows.is_empty() {
            return Ok(None);
        }
        let mut names = NameResolver::new(&ctx.state.store, ctx.gateway);
        let mut out = String::new();
        for (rank, row) in rows.iter().enumerate() {
            let name = names.name(row.entry).await?;
            out.push_str(&format!("{}.\t{name} with {} points.\n", rank + 1, row.value));
        }
        Ok(Some(out))
    }
    .await;

    let reply = match rendered {
        Ok(Some(out)) => Reply::file("points.txt", out.into_bytes()),
        Ok(None) => Reply::public("Nobody has any points yet."),
        Err(e) => {
            error!(error = %e, "failed building points leaderboard");
            Reply::ephemeral("Failed to check the rankings.")
        }
    };
    ctx.responder.reply(reply).await
}
