//! In-process fakes for the ports, shared by handler, dispatch and task tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    commands::schema::{CommandSchema, RegisteredCommand},
    config::{test_config, Config},
    domain::{ChannelId, GuildId, RoleId, UserId},
    errors::Error,
    messaging::{
        port::{GatewayPort, InteractionResponder},
        types::{CommandInvocation, CommandOption, Modal, ModalSubmission, OptionValue, Reply},
    },
    ports::{AnimeDetails, AnimeLookup, PasteService},
    state::AppState,
    store::Store,
    Result,
};

#[derive(Default)]
pub struct FakeGateway {
    pub names: HashMap<u64, String>,
    pub sent: Mutex<Vec<(ChannelId, String)>>,
    pub registered: Mutex<Vec<CommandSchema>>,
    pub overwrite_calls: Mutex<usize>,
    pub permissions: Mutex<Vec<(GuildId, String, Vec<RoleId>)>>,
    pub fail_overwrite: bool,
    pub fail_permissions_for: Option<String>,
    /// Report registered commands in reverse order, like a platform that does not preserve it.
    pub reverse_registered: bool,
}

impl FakeGateway {
    pub fn with_names(pairs: &[(u64, &str)]) -> Self {
        Self {
            names: pairs.iter().map(|(id, n)| (*id, n.to_string())).collect(),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl GatewayPort for FakeGateway {
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<()> {
        self.sent.lock().unwrap().push((channel, content.to_string()));
        Ok(())
    }

    async fn display_name(&self, user: UserId) -> Result<String> {
        self.names
            .get(&user.0)
            .cloned()
            .ok_or_else(|| Error::External(format!("unknown user {user}")))
    }

    async fn overwrite_commands(
        &self,
        commands: &[CommandSchema],
    ) -> Result<Vec<RegisteredCommand>> {
        *self.overwrite_calls.lock().unwrap() += 1;
        if self.fail_overwrite {
            return Err(Error::External("registration rejected".to_string()));
        }
        *self.registered.lock().unwrap() = commands.to_vec();
        let mut created: Vec<RegisteredCommand> = commands
            .iter()
            .enumerate()
            .map(|(i, c)| RegisteredCommand {
                id: 1000 + i as u64,
                name: c.name.clone(),
            })
            .collect();
        if self.reverse_registered {
            created.reverse();
        }
        Ok(created)
    }

    async fn set_command_permissions(
        &self,
        guild: GuildId,
        command: &RegisteredCommand,
        roles: &[RoleId],
    ) -> Result<()> {
        if self.fail_permissions_for.as_deref() == Some(command.name.as_str()) {
            return Err(Error::External("missing access".to_string()));
        }
        self.permissions
            .lock()
            .unwrap()
            .push((guild, command.name.clone(), roles.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeResponder {
    pub replies: Mutex<Vec<Reply>>,
    pub follow_ups: Mutex<Vec<Reply>>,
    pub modals: Mutex<Vec<Modal>>,
}

impl FakeResponder {
    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().unwrap().clone()
    }

    pub fn follow_ups(&self) -> Vec<Reply> {
        self.follow_ups.lock().unwrap().clone()
    }

    /// Content of the single initial reply.
    pub fn only_reply(&self) -> Reply {
        let replies = self.replies();
        assert_eq!(replies.len(), 1, "expected exactly one reply, got {replies:?}");
        replies[0].clone()
    }

    pub fn reply_text(&self) -> String {
        self.only_reply().content.unwrap_or_default()
    }
}

#[async_trait]
impl InteractionResponder for FakeResponder {
    async fn reply(&self, reply: Reply) -> Result<()> {
        self.replies.lock().unwrap().push(reply);
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> Result<()> {
        self.follow_ups.lock().unwrap().push(reply);
        Ok(())
    }

    async fn show_modal(&self, modal: Modal) -> Result<()> {
        self.modals.lock().unwrap().push(modal);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAnime {
    pub shows: Mutex<HashMap<i64, AnimeDetails>>,
    pub failing: HashSet<i64>,
    pub calls: Mutex<Vec<i64>>,
}

impl FakeAnime {
    pub fn with(shows: &[(i64, &str, bool, i64)]) -> Self {
        let map = shows
            .iter()
            .map(|(id, name, airing, episodes)| {
                (
                    *id,
                    AnimeDetails {
                        name: name.to_string(),
                        airing: *airing,
                        episodes: *episodes,
                    },
                )
            })
            .collect();
        Self {
            shows: Mutex::new(map),
            ..Default::default()
        }
    }

    pub fn set(&self, id: i64, name: &str, airing: bool, episodes: i64) {
        self.shows.lock().unwrap().insert(
            id,
            AnimeDetails {
                name: name.to_string(),
                airing,
                episodes,
            },
        );
    }

    pub fn calls(&self) -> Vec<i64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnimeLookup for FakeAnime {
    async fn get_anime(&self, show_id: i64) -> Result<AnimeDetails> {
        self.calls.lock().unwrap().push(show_id);
        if self.failing.contains(&show_id) {
            return Err(Error::External(format!("lookup of {show_id} failed")));
        }
        self.shows
            .lock()
            .unwrap()
            .get(&show_id)
            .cloned()
            .ok_or_else(|| Error::External(format!("anime {show_id} not found")))
    }
}

#[derive(Default)]
pub struct FakePaste {
    pub pastes: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

#[async_trait]
impl PasteService for FakePaste {
    async fn create_paste(&self, title: &str, body: &str) -> Result<String> {
        if self.fail {
            return Err(Error::External("paste rejected".to_string()));
        }
        self.pastes
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok("https://pastebin.com/fake".to_string())
    }
}

pub async fn state_with(
    cfg: Config,
    anime: Arc<FakeAnime>,
    paste: Option<Arc<FakePaste>>,
) -> AppState {
    AppState {
        cfg: Arc::new(cfg),
        store: Store::open_in_memory().await.unwrap(),
        anime,
        paste: paste.map(|p| p as Arc<dyn PasteService>),
    }
}

pub async fn test_state() -> AppState {
    state_with(test_config(), Arc::new(FakeAnime::default()), None).await
}

pub fn invocation(
    name: &str,
    subcommand: &str,
    caller: u64,
    options: Vec<(&str, OptionValue)>,
) -> CommandInvocation {
    CommandInvocation {
        name: name.to_string(),
        subcommand: Some(subcommand.to_string()),
        options: options
            .into_iter()
            .map(|(n, value)| CommandOption {
                name: n.to_string(),
                value,
            })
            .collect(),
        caller: UserId(caller),
        channel_id: ChannelId(1),
        guild_id: Some(GuildId(2)),
    }
}

pub fn submission(custom_id: &str, caller: u64, fields: &[(&str, &str)]) -> ModalSubmission {
    ModalSubmission {
        custom_id: custom_id.to_string(),
        fields: fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        caller: UserId(caller),
        channel_id: ChannelId(1),
    }
}
