use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    messaging::port::GatewayPort,
    scheduler::{PeriodicTask, TaskDescriptor},
    state::AppState,
    store::models::TrackedShow,
    Result,
};

/// Polls the metadata service for every airing tracked show and announces new episodes.
pub struct TrackUpdate {
    state: AppState,
    gateway: Arc<dyn GatewayPort>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub checked: usize,
    pub announced: usize,
    pub failed: usize,
}

impl TrackUpdate {
    pub fn new(state: AppState, gateway: Arc<dyn GatewayPort>) -> Self {
        Self { state, gateway }
    }

    pub fn descriptor(self) -> TaskDescriptor {
        TaskDescriptor {
            name: "track-update",
            period: self.state.cfg.track_update_interval,
            task: Arc::new(self),
        }
    }

    pub async fn run_once(&self) -> Result<UpdateSummary> {
        let shows = self.state.store.all_shows().await?;
        let mut summary = UpdateSummary::default();

        for show in shows.iter().filter(|s| s.airing) {
            summary.checked += 1;
            match self.update_show(show).await {
                Ok(true) => summary.announced += 1,
                Ok(false) => {}
                Err(e) => {
                    summary.failed += 1;
                    warn!(show_id = show.show_id, error = %e, "track update failed for show");
                }
            }
        }

        info!(
            checked = summary.checked,
            announced = summary.announced,
            failed = summary.failed,
            "updated tracked shows"
        );
        Ok(summary)
    }

    /// Returns whether a new episode was found.
    async fn update_show(&self, show: &TrackedShow) -> Result<bool> {
        let details = self.state.anime.get_anime(show.show_id).await?;

        if details.episodes <= show.latest_episode {
            if details.airing != show.airing {
                self.state
                    .store
                    .record_latest_episode(show.show_id, show.latest_episode, details.airing)
                    .await?;
            }
            return Ok(false);
        }

        self.state
            .store
            .record_latest_episode(show.show_id, details.episodes, details.airing)
            .await?;

        let text = format!(
            "Episode `{}` of {} has been released!",
            details.episodes, details.name
        );
        match self.state.cfg.announce_channel_id {
            Some(channel) => {
                if let Err(e) = self.gateway.send_message(channel, &text).await {
                    warn!(show_id = show.show_id, error = %e, "failed to announce episode");
                }
            }
            None => warn!(show_id = show.show_id, "no announcement channel configured"),
        }
        Ok(true)
    }
}

#[async_trait]
impl PeriodicTask for TrackUpdate {
    async fn run(&self) -> Result<()> {
        self.run_once().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::test_config,
        domain::ChannelId,
        store::models::NewTrackedShow,
        testing::{state_with, FakeAnime, FakeGateway},
    };

    async fn track(state: &AppState, id: i64, latest: i64, airing: bool) {
        state
            .store
            .upsert_show(NewTrackedShow {
                show_id: id,
                name: format!("Show {id}"),
                episodes_watched: 0,
                latest_episode: latest,
                airing,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn announces_new_episodes_and_skips_finished_shows() {
        let anime = Arc::new(FakeAnime::with(&[
            (1, "One", true, 5),
            (2, "Two", true, 3),
            (3, "Three", false, 12),
        ]));
        let state = state_with(test_config(), anime.clone(), None).await;
        track(&state, 1, 4, true).await;
        track(&state, 2, 3, true).await;
        track(&state, 3, 10, false).await;

        let gw = Arc::new(FakeGateway::default());
        let task = TrackUpdate::new(state.clone(), gw.clone());
        let summary = task.run_once().await.unwrap();

        assert_eq!(
            summary,
            UpdateSummary {
                checked: 2,
                announced: 1,
                failed: 0
            }
        );
        assert_eq!(
            gw.sent(),
            vec![(ChannelId(500), "Episode `5` of One has been released!".to_string())]
        );
        assert_eq!(state.store.find_show(1).await.unwrap().unwrap().latest_episode, 5);
        // Not-airing shows are never looked up.
        assert!(!anime.calls().contains(&3));

        // A second run with nothing new is silent.
        task.run_once().await.unwrap();
        assert_eq!(gw.sent().len(), 1);
    }

    #[tokio::test]
    async fn one_failing_show_does_not_abort_the_batch() {
        let mut anime = FakeAnime::with(&[(1, "One", true, 2), (2, "Two", true, 9)]);
        anime.failing.insert(1);
        let state = state_with(test_config(), Arc::new(anime), None).await;
        track(&state, 1, 1, true).await;
        track(&state, 2, 8, true).await;

        let gw = Arc::new(FakeGateway::default());
        let summary = TrackUpdate::new(state.clone(), gw.clone())
            .run_once()
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.announced, 1);
        assert_eq!(gw.sent().len(), 1);
        assert_eq!(state.store.find_show(1).await.unwrap().unwrap().latest_episode, 1);
    }

    #[tokio::test]
    async fn refreshes_airing_flag_when_show_ends() {
        let anime = Arc::new(FakeAnime::with(&[(1, "One", false, 12)]));
        let state = state_with(test_config(), anime, None).await;
        track(&state, 1, 12, true).await;

        let gw = Arc::new(FakeGateway::default());
        TrackUpdate::new(state.clone(), gw.clone()).run_once().await.unwrap();

        let show = state.store.find_show(1).await.unwrap().unwrap();
        assert!(!show.airing);
        assert!(gw.sent().is_empty());
    }

    #[tokio::test]
    async fn without_channel_only_updates() {
        let mut cfg = test_config();
        cfg.announce_channel_id = None;
        let anime = Arc::new(FakeAnime::with(&[(1, "One", true, 7)]));
        let state = state_with(cfg, anime, None).await;
        track(&state, 1, 6, true).await;

        let gw = Arc::new(FakeGateway::default());
        let summary = TrackUpdate::new(state.clone(), gw.clone()).run_once().await.unwrap();

        assert_eq!(summary.announced, 1);
        assert!(gw.sent().is_empty());
        assert_eq!(state.store.find_show(1).await.unwrap().unwrap().latest_episode, 7);
    }
}
