//! Home screen controller.
//!
//! Owns all screen state. Network work is spawned through
//! `services::weather_service` and comes back as messages on one channel;
//! state only changes while a message is applied (`poll_messages` or
//! `next_message`), so nothing here needs a lock.
//!
//! Every forecast and search is numbered. A response is applied only if its
//! number is the latest one issued, so a slow default-city fetch can never
//! overwrite a city the user picked afterwards.

use std::sync::Arc;

use nimbus_core::{ProviderError, ScreenConfig};
use nimbus_services::LastLocationStore;
use nimbus_weather::{ForecastFetcher, Location, LocationResolver, WeatherSnapshot};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::debounce::Debouncer;
use crate::screen_state::ViewState;
use crate::services::{
    request_location_search, request_weather_fetch, FetchOrigin, ForecastRequest,
    WeatherServiceMessage,
};
use crate::view::ScreenView;

/// Collaborators the screen talks to.
#[derive(Clone)]
pub struct ScreenServices {
    pub resolver: Arc<dyn LocationResolver>,
    pub fetcher: Arc<dyn ForecastFetcher>,
    pub last_location: LastLocationStore,
}

/// What applying one message did to the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    /// A settled query was sent to the resolver
    SearchStarted { query: String },
    /// A settled query was too short to search for
    QueryTooShort { query: String },
    /// A settled query arrived after a selection cleared the search
    StaleQueryDiscarded { query: String },
    /// Candidates replaced by a search result
    CandidatesUpdated { query: String, count: usize },
    /// Search failed; previous candidates kept
    SearchFailed { query: String, error: ProviderError },
    /// A search response arrived after a newer one was issued
    StaleSearchDiscarded { seq: u64 },
    /// Forecast applied and the screen is ready
    ForecastApplied { city: String },
    /// Forecast failed and the screen moved to `Failed`
    ForecastFailed { city: String, error: ProviderError },
    /// A forecast response arrived after a newer one was issued
    StaleForecastDiscarded { seq: u64 },
}

pub struct HomeScreenModel {
    services: ScreenServices,
    config: ScreenConfig,
    runtime: Handle,

    tx: UnboundedSender<WeatherServiceMessage>,
    rx: UnboundedReceiver<WeatherServiceMessage>,
    debouncer: Debouncer,

    view: ViewState,
    snapshot: Option<WeatherSnapshot>,
    search_open: bool,
    query: String,
    candidates: Vec<Location>,
    last_search_error: Option<ProviderError>,

    fetch_seq: u64,
    search_seq: u64,
    query_generation: u64,
    fetch_in_flight: bool,
    search_in_flight: bool,
    last_request: Option<ForecastRequest>,
}

impl std::fmt::Debug for HomeScreenModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeScreenModel")
            .field("view", &self.view)
            .field("search_open", &self.search_open)
            .field("query", &self.query)
            .field("candidates", &self.candidates.len())
            .field("fetch_seq", &self.fetch_seq)
            .field("search_seq", &self.search_seq)
            .finish_non_exhaustive()
    }
}

impl HomeScreenModel {
    /// Build the screen. Tasks are spawned on `runtime`.
    pub fn new(services: ScreenServices, config: ScreenConfig, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(config.search_debounce());

        Self {
            services,
            config,
            runtime,
            tx,
            rx,
            debouncer,
            view: ViewState::default(),
            snapshot: None,
            search_open: false,
            query: String::new(),
            candidates: Vec::new(),
            last_search_error: None,
            fetch_seq: 0,
            search_seq: 0,
            query_generation: 0,
            fetch_in_flight: false,
            search_in_flight: false,
            last_request: None,
        }
    }

    // ---- user actions ----

    /// Load the stored city, or the default one, and fetch its forecast.
    pub fn mount(&mut self) {
        let city = match self.services.last_location.get() {
            Some(city) => {
                tracing::info!("Restoring last city {:?}", city);
                city
            }
            None => {
                tracing::info!("No stored city, using default {:?}", self.config.default_city);
                self.config.default_city.clone()
            }
        };
        self.issue_fetch(city, FetchOrigin::Mount);
    }

    /// Open or close the search box. Candidates survive closing.
    pub fn toggle_search(&mut self) {
        self.search_open = !self.search_open;
        tracing::debug!("Search open: {}", self.search_open);
    }

    /// Search box text changed. Only the value that stays put for the quiet
    /// period reaches the resolver.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let query = text.into();
        self.query.clone_from(&query);
        self.query_generation += 1;
        let generation = self.query_generation;

        let tx = self.tx.clone();
        self.debouncer.call(&self.runtime, move || {
            if tx
                .send(WeatherServiceMessage::QuerySettled { generation, query })
                .is_err()
            {
                tracing::debug!("Screen dropped before query settled");
            }
        });
    }

    /// Pick the candidate at `index`. Returns false if there is none.
    pub fn select_candidate(&mut self, index: usize) -> bool {
        match self.candidates.get(index).cloned() {
            Some(location) => {
                self.select_location(location);
                true
            }
            None => {
                tracing::warn!(
                    "Ignoring selection {} of {} candidates",
                    index,
                    self.candidates.len()
                );
                false
            }
        }
    }

    /// Show the forecast for `location`, remembering it once it loads.
    pub fn select_location(&mut self, location: Location) {
        tracing::info!("Selected {}", location.label());

        // Drop everything search-related, including work still in flight
        // and queries that settled but were not applied yet
        self.debouncer.cancel();
        self.query_generation += 1;
        self.search_seq += 1;
        self.search_in_flight = false;
        self.candidates.clear();
        self.query.clear();
        self.search_open = false;

        self.issue_fetch(location.name, FetchOrigin::Selection);
    }

    /// Re-issue the last forecast request. Returns false if nothing was
    /// requested yet.
    pub fn retry(&mut self) -> bool {
        match self.last_request.clone() {
            Some(request) => {
                tracing::info!("Retrying forecast for {:?}", request.city);
                self.issue_fetch(request.city, request.origin);
                true
            }
            None => false,
        }
    }

    // ---- message handling ----

    /// Apply every message that has already arrived.
    pub fn poll_messages(&mut self) -> Vec<ScreenEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(msg) => events.push(self.apply(msg)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Wait for the next message and apply it.
    pub async fn next_message(&mut self) -> Option<ScreenEvent> {
        let msg = self.rx.recv().await?;
        Some(self.apply(msg))
    }

    /// True while a fetch, search or debounced query is outstanding.
    pub fn is_busy(&self) -> bool {
        self.fetch_in_flight || self.search_in_flight || self.debouncer.is_pending()
    }

    /// Apply messages until nothing is outstanding.
    pub async fn settle(&mut self) -> Vec<ScreenEvent> {
        let mut events = Vec::new();
        while self.is_busy() || !self.rx.is_empty() {
            match self.next_message().await {
                Some(event) => events.push(event),
                None => break,
            }
        }
        events
    }

    fn apply(&mut self, msg: WeatherServiceMessage) -> ScreenEvent {
        match msg {
            WeatherServiceMessage::QuerySettled { generation, query } => {
                self.on_query_settled(generation, query)
            }
            WeatherServiceMessage::SearchDone { seq, query, result } => {
                self.on_search_done(seq, query, result)
            }
            WeatherServiceMessage::ForecastDone { request, result } => {
                self.on_forecast_done(request, result)
            }
        }
    }

    fn on_query_settled(&mut self, generation: u64, query: String) -> ScreenEvent {
        if generation != self.query_generation {
            tracing::debug!("Discarding settled query {:?}", query);
            return ScreenEvent::StaleQueryDiscarded { query };
        }

        // Measured the way the resolver will see it
        let query = query.trim().to_string();
        if query.chars().count() <= self.config.min_query_chars {
            tracing::debug!("Query {:?} too short to search", query);
            return ScreenEvent::QueryTooShort { query };
        }

        self.search_seq += 1;
        self.search_in_flight = true;
        tracing::debug!("Searching {:?} (#{})", query, self.search_seq);
        request_location_search(
            &self.tx,
            &self.runtime,
            self.services.resolver.clone(),
            self.search_seq,
            query.clone(),
        );
        ScreenEvent::SearchStarted { query }
    }

    fn on_search_done(
        &mut self,
        seq: u64,
        query: String,
        result: Result<Vec<Location>, ProviderError>,
    ) -> ScreenEvent {
        if seq != self.search_seq {
            tracing::debug!("Discarding search #{} for {:?}", seq, query);
            return ScreenEvent::StaleSearchDiscarded { seq };
        }
        self.search_in_flight = false;

        match result {
            Ok(locations) => {
                let count = locations.len();
                self.candidates = locations;
                self.last_search_error = None;
                ScreenEvent::CandidatesUpdated { query, count }
            }
            Err(error) => {
                tracing::warn!("Search for {:?} failed: {}", query, error);
                self.last_search_error = Some(error.clone());
                ScreenEvent::SearchFailed { query, error }
            }
        }
    }

    fn on_forecast_done(
        &mut self,
        request: ForecastRequest,
        result: Result<WeatherSnapshot, ProviderError>,
    ) -> ScreenEvent {
        if request.seq != self.fetch_seq {
            tracing::debug!(
                "Discarding forecast #{} for {:?}, latest is #{}",
                request.seq,
                request.city,
                self.fetch_seq
            );
            return ScreenEvent::StaleForecastDiscarded { seq: request.seq };
        }
        self.fetch_in_flight = false;

        let view = std::mem::take(&mut self.view);
        match result {
            Ok(snapshot) => {
                tracing::info!("Forecast ready for {}", snapshot.location.label());
                self.snapshot = Some(snapshot);
                self.view = view.on_fetch_succeeded();
                if request.origin == FetchOrigin::Selection {
                    self.services.last_location.set(&request.city);
                }
                ScreenEvent::ForecastApplied { city: request.city }
            }
            Err(error) => {
                tracing::error!("Forecast for {:?} failed: {}", request.city, error);
                self.view = view.on_fetch_failed(error.clone());
                ScreenEvent::ForecastFailed {
                    city: request.city,
                    error,
                }
            }
        }
    }

    fn issue_fetch(&mut self, city: String, origin: FetchOrigin) {
        self.fetch_seq += 1;
        let request = ForecastRequest {
            seq: self.fetch_seq,
            city,
            days: self.config.forecast_days,
            origin,
        };
        tracing::debug!("Fetching forecast for {:?} (#{})", request.city, request.seq);

        self.view = std::mem::take(&mut self.view).on_fetch_started();
        self.fetch_in_flight = true;
        self.last_request = Some(request.clone());
        request_weather_fetch(
            &self.tx,
            &self.runtime,
            self.services.fetcher.clone(),
            request,
        );
    }

    // ---- read side ----

    pub fn state(&self) -> &ViewState {
        &self.view
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn search_open(&self) -> bool {
        self.search_open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn candidates(&self) -> &[Location] {
        &self.candidates
    }

    pub fn last_search_error(&self) -> Option<&ProviderError> {
        self.last_search_error.as_ref()
    }

    /// City of the most recently issued forecast request.
    pub fn current_city(&self) -> Option<&str> {
        self.last_request.as_ref().map(|r| r.city.as_str())
    }

    /// Everything a renderer needs, formatted.
    pub fn view(&self) -> ScreenView {
        ScreenView::build(
            &self.view,
            self.snapshot.as_ref(),
            self.search_open,
            &self.query,
            &self.candidates,
            self.last_search_error.as_ref(),
        )
    }
}
