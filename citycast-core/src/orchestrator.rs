//! Search pipeline: geocode, fetch, normalize, then reconcile into the watchlist.
//!
//! Only the most recent `search` call may change the observable state. Each
//! call takes a sequence number when it starts; when its result arrives the
//! number is compared against the latest one under the state lock, and stale
//! results are dropped.

use std::{fmt::Debug, future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    Config,
    error::WeatherError,
    model::WeatherSnapshot,
    normalize::normalize,
    provider::Providers,
    watchlist::{CityEntry, SharedWatchlist, Watchlist},
};

pub const PLACE_NOT_FOUND: &str = "place not found";
pub const SEARCH_FAILED: &str = "search failed";

/// Source of "now" for normalization.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Searching,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Transport,
    MalformedPayload,
}

/// What presentation sees when a search fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFailure {
    pub kind: FailureKind,
    /// User-facing message.
    pub message: &'static str,
    /// Underlying error text, for logs and verbose output.
    pub detail: String,
}

impl From<&WeatherError> for SearchFailure {
    fn from(err: &WeatherError) -> Self {
        let (kind, message) = match err {
            WeatherError::NotFound(_) => (FailureKind::NotFound, PLACE_NOT_FOUND),
            WeatherError::Transport(_) => (FailureKind::Transport, SEARCH_FAILED),
            WeatherError::MalformedPayload(_) => (FailureKind::MalformedPayload, SEARCH_FAILED),
        };

        Self {
            kind,
            message,
            detail: err.to_string(),
        }
    }
}

/// Observable orchestration state, cloned out for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub phase: SearchPhase,
    /// Query of the latest accepted search.
    pub query: Option<String>,
    pub error: Option<SearchFailure>,
    pub snapshot: Option<Arc<WeatherSnapshot>>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            phase: SearchPhase::Idle,
            query: None,
            error: None,
            snapshot: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Blank query, or a repeated `initialize`; nothing changed.
    Ignored,
    /// A newer search started before this one finished; its result was dropped.
    Superseded,
    Completed(Arc<WeatherSnapshot>),
    Failed(SearchFailure),
}

#[derive(Debug, Default)]
struct Inner {
    state: SearchState,
    sequence: u64,
    initialized: bool,
}

/// Which stage a failure came from; only geocoding failures drop the shown snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Geocoding,
    Forecast,
    Normalize,
}

#[derive(Debug, Clone)]
pub struct SearchOrchestrator {
    providers: Providers,
    watchlist: SharedWatchlist,
    clock: Arc<dyn Clock>,
    timeout: Option<Duration>,
    inner: Arc<Mutex<Inner>>,
}

impl SearchOrchestrator {
    pub fn new(providers: Providers, watchlist: SharedWatchlist) -> Self {
        Self {
            providers,
            watchlist,
            clock: Arc::new(SystemClock),
            timeout: None,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Open-Meteo providers, seeded watchlist and the configured timeout.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let providers = Providers::from_config(config)?;
        let orchestrator = Self::new(providers, Watchlist::seeded().into_shared());
        Ok(orchestrator.with_timeout(config.request_timeout()))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// A request that outlives `timeout` counts as a transport failure.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Startup search for `seed_query`. Only the first call has any effect.
    pub async fn initialize(&self, seed_query: &str) -> SearchOutcome {
        let first = {
            let mut inner = self.inner.lock();
            !std::mem::replace(&mut inner.initialized, true)
        };

        if !first {
            warn!("initialize called more than once; ignoring");
            return SearchOutcome::Ignored;
        }

        self.search(seed_query).await
    }

    /// City picked from the watchlist; same pipeline as a typed search.
    pub async fn select(&self, name: &str) -> SearchOutcome {
        // Watchlist names carry the country, the geocoder matches on the place alone.
        let place = name.split(',').next().unwrap_or(name);
        self.search(place).await
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            debug!("Ignoring blank search");
            return SearchOutcome::Ignored;
        }

        let seq = self.begin(query);
        info!(query, seq, "Search started");

        let geo = match self.bounded(self.providers.geocoder.resolve(query)).await {
            Ok(geo) => geo,
            Err(err) => return self.fail(seq, Stage::Geocoding, &err),
        };

        if self.is_stale(seq) {
            debug!(query, seq, "Superseded before forecast fetch");
            return SearchOutcome::Superseded;
        }

        let request = self
            .providers
            .forecast
            .fetch_forecast(geo.latitude, geo.longitude);
        let raw = match self.bounded(request).await {
            Ok(raw) => raw,
            Err(err) => return self.fail(seq, Stage::Forecast, &err),
        };

        match normalize(&raw, &geo.display_name, self.clock.now()) {
            Ok(snapshot) => self.complete(seq, snapshot),
            Err(err) => self.fail(seq, Stage::Normalize, &err),
        }
    }

    pub fn state(&self) -> SearchState {
        self.inner.lock().state.clone()
    }

    pub fn watchlist(&self) -> Vec<CityEntry> {
        self.watchlist.lock().entries().to_vec()
    }

    pub fn shared_watchlist(&self) -> SharedWatchlist {
        Arc::clone(&self.watchlist)
    }

    fn begin(&self, query: &str) -> u64 {
        let mut inner = self.inner.lock();
        inner.sequence += 1;
        inner.state.phase = SearchPhase::Searching;
        inner.state.query = Some(query.to_string());
        inner.state.error = None;
        inner.sequence
    }

    fn is_stale(&self, seq: u64) -> bool {
        self.inner.lock().sequence != seq
    }

    async fn bounded<T>(
        &self,
        request: impl Future<Output = Result<T, WeatherError>>,
    ) -> Result<T, WeatherError> {
        let Some(limit) = self.timeout else {
            return request.await;
        };

        match tokio::time::timeout(limit, request).await {
            Ok(result) => result,
            Err(_) => {
                let message = format!("Request timed out after {limit:?}");
                Err(WeatherError::Transport(message))
            }
        }
    }

    fn fail(&self, seq: u64, stage: Stage, err: &WeatherError) -> SearchOutcome {
        let mut inner = self.inner.lock();
        if inner.sequence != seq {
            warn!(
                seq,
                latest = inner.sequence,
                error = %err,
                "Discarding failure of superseded search"
            );
            return SearchOutcome::Superseded;
        }

        let failure = SearchFailure::from(err);
        warn!(?stage, error = %err, "Search failed");

        inner.state.phase = SearchPhase::Failed;
        inner.state.error = Some(failure.clone());
        if stage == Stage::Geocoding {
            inner.state.snapshot = None;
        }

        SearchOutcome::Failed(failure)
    }

    fn complete(&self, seq: u64, snapshot: WeatherSnapshot) -> SearchOutcome {
        let mut inner = self.inner.lock();
        if inner.sequence != seq {
            warn!(
                seq,
                latest = inner.sequence,
                city = %snapshot.current.name,
                "Discarding superseded search result"
            );
            return SearchOutcome::Superseded;
        }

        let current = &snapshot.current;
        self.watchlist.lock().upsert(
            &current.name,
            current.temperature_c,
            &current.observed_at_local.format("%H:%M").to_string(),
            current.weather_code,
        );

        info!(city = %current.name, temperature_c = current.temperature_c, "Search completed");

        let snapshot = Arc::new(snapshot);
        inner.state.phase = SearchPhase::Idle;
        inner.state.error = None;
        inner.state.snapshot = Some(Arc::clone(&snapshot));

        SearchOutcome::Completed(snapshot)
    }
}
