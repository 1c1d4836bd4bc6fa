//! Weather page controller.
//!
//! Every attempt runs in three steps: [`WeatherController::begin`] shows the
//! loading overlay and hands out a [`RequestTicket`], an `attempt_*` method
//! does the network work through `&self`, and [`WeatherController::complete`]
//! applies the outcome. Only the ticket from the latest `begin` may change
//! state; completions of older tickets are dropped.

use crate::client::WeatherApi;
use crate::geocode::Geocoder;
use crate::location::PositionSource;
use crate::resolver::{LocationResolver, PlaceSelection};
use crate::types::{format_temperature, Location, WeatherSnapshot};
use tracing::instrument;

const FETCH_FAILED: &str = "Unable to fetch weather data. Please try another location.";

/// Everything the weather page shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub overlay_visible: bool,
    pub weather_visible: bool,
    /// Message of the error panel; `None` hides the panel
    pub error: Option<String>,
    /// Shown under the search box when device location failed
    pub manual_entry_prompt: Option<String>,
    pub location: Option<Location>,
    pub snapshot: Option<WeatherSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Loaded {
        location: Location,
        snapshot: WeatherSnapshot,
    },
    /// The location resolved but the report could not be fetched
    FetchFailed {
        location: Location,
        message: String,
    },
    /// Typed text or a selection could not be turned into a location
    ResolveFailed(String),
    /// The device position (or its reverse lookup) failed
    DetectionFailed(String),
}

pub struct WeatherController<G, P, W> {
    resolver: LocationResolver<G, P>,
    api: W,
    state: DisplayState,
    generation: u64,
}

impl<G, P, W> WeatherController<G, P, W>
where
    G: Geocoder,
    P: PositionSource,
    W: WeatherApi,
{
    pub fn new(resolver: LocationResolver<G, P>, api: W) -> Self {
        Self {
            resolver,
            api,
            state: DisplayState::default(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn resolver(&self) -> &LocationResolver<G, P> {
        &self.resolver
    }

    pub fn api(&self) -> &W {
        &self.api
    }

    /// Starts an attempt: shows the overlay and supersedes every older ticket
    pub fn begin(&mut self) -> RequestTicket {
        self.generation += 1;
        self.state.overlay_visible = true;
        RequestTicket(self.generation)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Applies an outcome. Returns false, leaving state untouched, when the
    /// ticket has been superseded.
    pub fn complete(&mut self, ticket: RequestTicket, outcome: AttemptOutcome) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                "Dropping stale weather response (ticket {}, latest {})",
                ticket.0,
                self.generation
            );
            return false;
        }

        let state = &mut self.state;
        state.overlay_visible = false;
        match outcome {
            AttemptOutcome::Loaded { location, snapshot } => {
                state.location = Some(location);
                state.snapshot = Some(snapshot);
                state.weather_visible = true;
                state.error = None;
                state.manual_entry_prompt = None;
            }
            AttemptOutcome::FetchFailed { location, message } => {
                state.location = Some(location);
                state.error = Some(message);
                state.weather_visible = false;
            }
            AttemptOutcome::ResolveFailed(message) => {
                state.error = Some(message);
                state.weather_visible = false;
            }
            AttemptOutcome::DetectionFailed(message) => {
                state.manual_entry_prompt = Some(message);
            }
        }
        true
    }

    pub async fn attempt_fetch(&self, location: Location) -> AttemptOutcome {
        match self.api.fetch(&location).await {
            Ok(snapshot) => AttemptOutcome::Loaded { location, snapshot },
            Err(e) => {
                tracing::error!("Weather fetch error: {}", e);
                AttemptOutcome::FetchFailed {
                    location,
                    message: FETCH_FAILED.to_string(),
                }
            }
        }
    }

    pub async fn attempt_auto(&self) -> AttemptOutcome {
        match self.resolver.resolve_automatic().await {
            Ok(location) => self.attempt_fetch(location).await,
            Err(e) => {
                tracing::info!("Geolocation failed: {}", e);
                AttemptOutcome::DetectionFailed(e.user_message())
            }
        }
    }

    pub async fn attempt_search(&self, text: &str) -> AttemptOutcome {
        match self.resolver.resolve_search(text).await {
            Ok(location) => self.attempt_fetch(location).await,
            Err(e) => AttemptOutcome::ResolveFailed(e.user_message()),
        }
    }

    pub async fn attempt_selection(&self, place: &PlaceSelection) -> AttemptOutcome {
        match self.resolver.resolve_selection(place) {
            Ok(location) => self.attempt_fetch(location).await,
            Err(e) => AttemptOutcome::ResolveFailed(e.user_message()),
        }
    }

    /// Detects the device location and loads its weather. On failure the
    /// overlay is hidden and the manual-entry prompt shown.
    #[instrument(skip(self))]
    pub async fn auto_locate(&mut self) -> bool {
        let ticket = self.begin();
        let outcome = self.attempt_auto().await;
        self.complete(ticket, outcome)
    }

    /// Searches typed text. Blank input is ignored without starting an attempt.
    #[instrument(skip(self))]
    pub async fn search(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let ticket = self.begin();
        let outcome = self.attempt_search(text).await;
        self.complete(ticket, outcome)
    }

    #[instrument(skip(self, place), fields(place = %place.name))]
    pub async fn select_place(&mut self, place: &PlaceSelection) -> bool {
        let ticket = self.begin();
        let outcome = self.attempt_selection(place).await;
        self.complete(ticket, outcome)
    }

    /// Refetches the current location, or just dismisses the error panel
    /// when there is none
    pub async fn retry(&mut self) -> bool {
        let Some(location) = self.state.location.clone() else {
            self.state.error = None;
            return false;
        };
        let ticket = self.begin();
        let outcome = self.attempt_fetch(location).await;
        self.complete(ticket, outcome)
    }

    /// "Enter location manually": dismisses the overlay
    pub fn skip_location(&mut self) {
        self.state.overlay_visible = false;
    }

    /// Current temperature as shown in the panel, e.g. `23°C`
    pub fn temperature_label(&self) -> Option<String> {
        self.state
            .snapshot
            .as_ref()
            .map(|s| format_temperature(s.current.temp))
    }

    /// Text for the share button, once a report is shown
    pub fn share_message(&self, origin: &str) -> Option<String> {
        let location = self.state.location.as_ref()?;
        let snapshot = self.state.snapshot.as_ref()?;
        Some(format!(
            "Weather in {}: {}, {}. Check more details at {}",
            location.display_name,
            format_temperature(snapshot.current.temp),
            snapshot.current.description,
            origin
        ))
    }
}
