//! Debounced search box coordination.
//!
//! Each keystroke re-arms two timers keyed off the same input value: an
//! autocomplete timer (300 ms) and a committed-search timer (800 ms). A timer
//! is in exactly one phase at a time:
//!
//! - `Idle`: nothing scheduled
//! - `Pending`: a task is sleeping and holds the cancellation token
//! - `Suppressed`: the next input change came from the program (suggestion
//!   selection, geolocation) and must not query or search
//!
//! Re-arming or cancelling a pending timer cancels its token, so only the
//! latest input value can ever fire. A suppressed timer swallows the change
//! that suppressed it and is `Idle` again before any later keystroke.

use common::models::CitySuggestion;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::geocoding::{MIN_QUERY_CHARS, SuggestionSource};
use crate::location::{Geolocator, locate};
use crate::store::WeatherStore;

pub const AUTOCOMPLETE_DEBOUNCE: Duration = Duration::from_millis(300);
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTiming {
    pub autocomplete: Duration,
    pub search: Duration,
}

impl Default for DebounceTiming {
    fn default() -> Self {
        Self {
            autocomplete: AUTOCOMPLETE_DEBOUNCE,
            search: SEARCH_DEBOUNCE,
        }
    }
}

/// Observable phase of a debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Pending,
    Suppressed,
}

#[derive(Debug, Default)]
enum TimerPhase {
    #[default]
    Idle,
    Pending(CancellationToken),
    Suppressed,
}

impl TimerPhase {
    fn state(&self) -> TimerState {
        match self {
            TimerPhase::Idle => TimerState::Idle,
            TimerPhase::Pending(_) => TimerState::Pending,
            TimerPhase::Suppressed => TimerState::Suppressed,
        }
    }

    /// Cancel anything pending and clear any suppression.
    fn reset(&mut self) {
        if let TimerPhase::Pending(token) = std::mem::take(self) {
            token.cancel();
        }
    }

    fn suppress(&mut self) {
        self.reset();
        *self = TimerPhase::Suppressed;
    }

    /// React to an input change. Returns the token of a newly scheduled firing.
    fn arm(&mut self) -> Option<CancellationToken> {
        match std::mem::take(self) {
            TimerPhase::Suppressed => None,
            TimerPhase::Pending(previous) => {
                previous.cancel();
                Some(self.schedule())
            }
            TimerPhase::Idle => Some(self.schedule()),
        }
    }

    fn schedule(&mut self) -> CancellationToken {
        let token = CancellationToken::new();
        *self = TimerPhase::Pending(token.clone());
        token
    }
}

#[derive(Debug, Clone, Copy)]
enum TimerKind {
    Autocomplete,
    Search,
}

#[derive(Debug, Default)]
struct InputState {
    value: String,
    using_location: bool,
    suggestions: Vec<CitySuggestion>,
    show_suggestions: bool,
    suggestion_requests: usize,
    // Bumped whenever pending work is superseded; stale suggestion replies are dropped
    epoch: u64,
    autocomplete: TimerPhase,
    search: TimerPhase,
}

impl InputState {
    fn trimmed(&self) -> &str {
        self.value.trim()
    }

    fn is_committable(&self) -> bool {
        self.trimmed().chars().count() >= MIN_QUERY_CHARS
    }

    fn hide_suggestions(&mut self) {
        self.suggestions.clear();
        self.show_suggestions = false;
    }

    fn cancel_timers(&mut self) {
        self.autocomplete.reset();
        self.search.reset();
        self.epoch += 1;
    }
}

/// Snapshot of the search box for rendering and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSnapshot {
    pub value: String,
    pub using_location: bool,
    pub suggestions: Vec<CitySuggestion>,
    pub show_suggestions: bool,
    pub loading_suggestions: bool,
    pub autocomplete: TimerState,
    pub search: TimerState,
}

struct Inner {
    store: Arc<WeatherStore>,
    suggestions: Arc<dyn SuggestionSource>,
    geolocator: Arc<dyn Geolocator>,
    timing: DebounceTiming,
    state: Mutex<InputState>,
}

/// Input coordinator for the city search box.
#[derive(Clone)]
pub struct SearchInput {
    inner: Arc<Inner>,
}

impl SearchInput {
    pub fn new(
        store: Arc<WeatherStore>,
        suggestions: Arc<dyn SuggestionSource>,
        geolocator: Arc<dyn Geolocator>,
        timing: DebounceTiming,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                suggestions,
                geolocator,
                timing,
                state: Mutex::new(InputState::default()),
            }),
        }
    }

    pub async fn snapshot(&self) -> InputSnapshot {
        let state = self.inner.state.lock().await;
        InputSnapshot {
            value: state.value.clone(),
            using_location: state.using_location,
            suggestions: state.suggestions.clone(),
            show_suggestions: state.show_suggestions,
            loading_suggestions: state.suggestion_requests > 0,
            autocomplete: state.autocomplete.state(),
            search: state.search.state(),
        }
    }

    /// A keystroke: replace the value and re-arm both timers.
    pub async fn on_text_changed(&self, text: &str) {
        let mut state = self.inner.state.lock().await;
        state.value = text.to_string();
        state.using_location = false;
        self.reschedule(&mut state);
    }

    /// Pick a suggestion: fill in its display name and search right away.
    pub async fn select_suggestion(&self, suggestion: &CitySuggestion) {
        let city = suggestion.display_name();
        info!(city = %city, "Suggestion selected");
        {
            let mut state = self.inner.state.lock().await;
            state.cancel_timers();
            state.hide_suggestions();
            self.set_value_programmatically(&mut state, city.clone());
        }
        self.inner.store.search(&city).await;
    }

    /// Select the suggestion at `index` in the shown list.
    pub async fn select_suggestion_at(&self, index: usize) -> bool {
        let suggestion = {
            let state = self.inner.state.lock().await;
            if !state.show_suggestions {
                return false;
            }
            state.suggestions.get(index).cloned()
        };
        match suggestion {
            Some(s) => {
                self.select_suggestion(&s).await;
                true
            }
            None => false,
        }
    }

    /// Toggle location mode.
    ///
    /// Turning it off clears the input and the shown weather. Turning it on
    /// resolves the current city and searches for it; refusals and failures
    /// leave everything as it was.
    pub async fn use_current_location(&self) {
        {
            let mut state = self.inner.state.lock().await;
            state.cancel_timers();
            if state.using_location {
                state.using_location = false;
                state.hide_suggestions();
                self.set_value_programmatically(&mut state, String::new());
                drop(state);
                self.inner.store.search("").await;
                return;
            }
        }

        debug!("Getting geolocation");
        let Some(location) = locate(self.inner.geolocator.as_ref()).await else {
            return;
        };

        {
            let mut state = self.inner.state.lock().await;
            state.cancel_timers();
            state.hide_suggestions();
            self.set_value_programmatically(&mut state, location.city.clone());
            state.using_location = true;
        }
        self.inner.store.search(&location.city).await;
    }

    /// The clear button: reset everything and clear the shown weather.
    pub async fn clear(&self) {
        {
            let mut state = self.inner.state.lock().await;
            state.cancel_timers();
            state.value.clear();
            state.using_location = false;
            state.hide_suggestions();
        }
        self.inner.store.search("").await;
    }

    /// Explicit commit: search the trimmed value now, skipping both debounce windows.
    pub async fn submit(&self) {
        let city = {
            let mut state = self.inner.state.lock().await;
            if !state.is_committable() {
                return;
            }
            state.cancel_timers();
            state.hide_suggestions();
            state.trimmed().to_string()
        };
        self.inner.store.search(&city).await;
    }

    fn set_value_programmatically(&self, state: &mut InputState, value: String) {
        state.autocomplete.suppress();
        state.search.suppress();
        state.value = value;
        // Runs the same path as a keystroke; the suppression absorbs it
        self.reschedule(state);
    }

    fn reschedule(&self, state: &mut InputState) {
        state.epoch += 1;

        if let Some(token) = state.autocomplete.arm() {
            self.spawn_timer(token, self.inner.timing.autocomplete, TimerKind::Autocomplete);
        }

        // The committed search only arms while no suggestion list is shown
        if state.show_suggestions {
            state.search.reset();
        } else if let Some(token) = state.search.arm() {
            self.spawn_timer(token, self.inner.timing.search, TimerKind::Search);
        }
    }

    fn spawn_timer(&self, token: CancellationToken, delay: Duration, kind: TimerKind) {
        let input = self.clone();
        tokio::spawn(async move {
            let elapsed = tokio::select! {
                _ = token.cancelled() => false,
                _ = tokio::time::sleep(delay) => true,
            };
            if !elapsed {
                return;
            }
            match kind {
                TimerKind::Autocomplete => input.fire_autocomplete(&token).await,
                TimerKind::Search => input.fire_search(&token).await,
            }
        });
    }

    async fn fire_autocomplete(&self, token: &CancellationToken) {
        let (query, epoch) = {
            let mut state = self.inner.state.lock().await;
            if token.is_cancelled() {
                return;
            }
            state.autocomplete = TimerPhase::Idle;

            if !state.is_committable() {
                state.hide_suggestions();
                return;
            }
            state.suggestion_requests += 1;
            (state.trimmed().to_string(), state.epoch)
        };

        let suggestions = self.inner.suggestions.suggestions(&query).await;

        let mut state = self.inner.state.lock().await;
        state.suggestion_requests -= 1;
        if state.epoch != epoch {
            debug!(query = %query, "Discarding suggestions for superseded input");
            return;
        }
        // An empty list is never shown, so it does not hold back the committed search
        let was_shown = state.show_suggestions;
        state.show_suggestions = !suggestions.is_empty();
        state.suggestions = suggestions;
        if state.show_suggestions {
            state.search.reset();
        } else if was_shown && state.is_committable() {
            // The shown list had cancelled the committed search; hiding it re-arms it
            if let Some(token) = state.search.arm() {
                self.spawn_timer(token, self.inner.timing.search, TimerKind::Search);
            }
        }
    }

    async fn fire_search(&self, token: &CancellationToken) {
        let city = {
            let mut state = self.inner.state.lock().await;
            if token.is_cancelled() {
                return;
            }
            state.search = TimerPhase::Idle;

            if state.show_suggestions || !state.is_committable() {
                return;
            }
            state.trimmed().to_string()
        };

        debug!(city = %city, "Debounced search triggered");
        self.inner.store.search(&city).await;
    }
}
