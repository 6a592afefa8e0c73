use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::location_client::{LocationClient, LOAD_FAILED_MESSAGE};
use crate::features::locations::dtos::LocationResponseDto;
use crate::shared::geo::RadiusFilter;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// What a location list view should currently show
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    /// Nothing fetched yet
    Loading,
    Loaded(Vec<LocationResponseDto>),
    /// The last fetch failed; the previously loaded locations are kept
    Failed {
        message: String,
        locations: Vec<LocationResponseDto>,
    },
}

impl FeedState {
    pub fn locations(&self) -> &[LocationResponseDto] {
        match self {
            FeedState::Loading => &[],
            FeedState::Loaded(locations) | FeedState::Failed { locations, .. } => locations,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FeedState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Keeps a location list fresh by polling on an interval and on demand.
///
/// The background task stops when the feed is dropped.
pub struct LocationFeed {
    state: watch::Receiver<FeedState>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
}

impl LocationFeed {
    /// Start polling. The first fetch happens immediately.
    pub fn spawn(client: LocationClient, filter: Option<RadiusFilter>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(FeedState::Loading);
        let refresh = Arc::new(Notify::new());

        let task = tokio::spawn(poll_locations(client, filter, interval, tx, refresh.clone()));

        Self {
            state: rx,
            refresh,
            task,
        }
    }

    /// Fetch again now, e.g. when the window regains focus
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }
}

impl Drop for LocationFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_locations(
    client: LocationClient,
    filter: Option<RadiusFilter>,
    interval: Duration,
    tx: watch::Sender<FeedState>,
    refresh: Arc<Notify>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = refresh.notified() => {
                debug!("Location feed refresh requested");
                ticker.reset();
            }
        }

        match client.list_locations(filter).await {
            Ok(locations) => {
                tx.send_replace(FeedState::Loaded(locations));
            }
            Err(e) => {
                warn!("Failed to refresh locations from {}: {}", client.base_url(), e);
                let locations = tx.borrow().locations().to_vec();
                tx.send_replace(FeedState::Failed {
                    message: LOAD_FAILED_MESSAGE.to_string(),
                    locations,
                });
            }
        }
    }
}
