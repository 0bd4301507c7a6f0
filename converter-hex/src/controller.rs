//! Per-widget converter controller.
//!
//! Wires the fetcher, rate cache and favorites to the UI port and owns the
//! `Idle → Refreshing → Ready | Degraded` lifecycle. At most one fetch runs
//! at a time; overlapping refresh requests are dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use converter_types::{
    CachedRates, Clock, ConversionError, ConversionRequest, ConversionView, ConverterState,
    FavoritePair, KeyValueStore, RateMap, RateOrigin, UiEvent, UiSink,
};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::{ConverterConfig, FallbackFetcher, FavoritesStore, RateCache};

const DEGRADED_WARNING: &str =
    "Live exchange rates are unavailable. Showing approximate offline rates.";

/// Why a refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// Startup with a missing or stale cache.
    Initial,
    /// Periodic timer tick. Always fetches, so rates are never older than
    /// one refresh interval.
    Scheduled,
    /// User pressed refresh.
    Manual,
    /// A conversion found no usable rate.
    OnDemand,
}

impl RefreshTrigger {
    /// Only the startup refresh looks at the cache age.
    fn forces_fetch(self) -> bool {
        !matches!(self, RefreshTrigger::Initial)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Live rates installed.
    Refreshed { provider: String },
    /// Every provider failed; offline rates installed.
    Degraded,
    /// Cache still fresh, nothing fetched.
    Fresh,
    /// Another refresh was already running; this one was dropped.
    InFlight,
}

/// Result of [`ConverterController::convert`].
#[derive(Debug)]
pub enum Conversion {
    Rendered(ConversionView),
    /// No usable rate yet. The UI was told to show its loading state and a
    /// refresh is running in the background.
    Loading(PendingRefresh),
    /// Rates are available but the result cannot be shown. The UI got a
    /// warning and no refresh was started.
    Rejected(ConversionError),
}

/// Handle to a background refresh started by a conversion.
///
/// Dropping it does not cancel the refresh.
#[derive(Debug)]
pub struct PendingRefresh {
    handle: Option<JoinHandle<RefreshOutcome>>,
}

impl PendingRefresh {
    /// Waits for the refresh. `None` if it could not be started or panicked.
    pub async fn settled(self) -> Option<RefreshOutcome> {
        match self.handle {
            Some(handle) => handle.await.ok(),
            None => None,
        }
    }
}

struct Shared<S: KeyValueStore> {
    config: ConverterConfig,
    fetcher: FallbackFetcher,
    cache: RateCache<S>,
    favorites: FavoritesStore<S>,
    ui: Arc<dyn UiSink>,
    clock: Arc<dyn Clock>,
    state: RwLock<ConverterState>,
    in_flight: AtomicBool,
    selection: Mutex<ConversionRequest>,
}

/// Clears the in-flight flag when a refresh ends, and puts the previous
/// state back if the refresh was cancelled before it finished.
struct RefreshGuard<'a> {
    in_flight: &'a AtomicBool,
    state: &'a RwLock<ConverterState>,
    previous: ConverterState,
    finished: bool,
}

impl<'a> RefreshGuard<'a> {
    fn acquire(in_flight: &'a AtomicBool, state: &'a RwLock<ConverterState>) -> Option<Self> {
        in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        let previous = std::mem::replace(
            &mut *state.write().unwrap_or_else(PoisonError::into_inner),
            ConverterState::Refreshing,
        );
        Some(Self {
            in_flight,
            state,
            previous,
            finished: false,
        })
    }

    /// Commits the new state. The in-flight flag stays set until drop.
    fn finish(&mut self, next: ConverterState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
        self.finished = true;
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.state.write().unwrap_or_else(PoisonError::into_inner) = self.previous;
        }
        self.in_flight.store(false, Ordering::Release);
    }
}

impl<S: KeyValueStore> Shared<S> {
    fn state(&self) -> ConverterState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: ConverterState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state != next {
            debug!(from = %*state, to = %next, "Converter state changed");
            *state = next;
        }
    }

    fn selection(&self) -> ConversionRequest {
        *self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remember(&self, request: ConversionRequest) {
        *self.selection.lock().unwrap_or_else(PoisonError::into_inner) = request;
    }

    #[instrument(skip(self))]
    async fn refresh(&self, trigger: RefreshTrigger) -> RefreshOutcome {
        if !trigger.forces_fetch() && !self.cache.is_stale(self.clock.now_millis()) {
            debug!("Cached rates still fresh, skipping fetch");
            return RefreshOutcome::Fresh;
        }

        let Some(mut guard) = RefreshGuard::acquire(&self.in_flight, &self.state) else {
            debug!("Refresh already in flight, ignoring request");
            return RefreshOutcome::InFlight;
        };

        let base = self.config.base_currency;
        let fetched = self.fetcher.fetch(base).await;

        // No await between the cache write and the state change.
        let outcome = match fetched {
            Ok(fetched) => {
                self.cache.write(
                    fetched.rates,
                    RateOrigin::live(&fetched.provider),
                    self.clock.now_millis(),
                );
                guard.finish(ConverterState::Ready);
                info!(provider = %fetched.provider, "Exchange rates refreshed");
                RefreshOutcome::Refreshed {
                    provider: fetched.provider,
                }
            }
            Err(failed) => {
                warn!(error = %failed, "Serving offline exchange rates");
                self.cache.write(
                    RateMap::offline(base),
                    RateOrigin::Offline,
                    self.clock.now_millis(),
                );
                guard.finish(ConverterState::Degraded);
                self.ui.warn(DEGRADED_WARNING);
                RefreshOutcome::Degraded
            }
        };
        self.rerender();

        if let Err(e) = self.cache.persist().await {
            warn!(error = %e, "Failed to persist exchange rates");
        }
        outcome
    }

    fn render(&self, request: &ConversionRequest) -> Result<ConversionView, ConversionError> {
        self.cache
            .with_current(|cached| view_of(request, cached))
            .unwrap_or_else(|| Err(ConversionError::RateUnavailable(request.from.to_string())))
    }

    /// Re-renders the remembered selection against the current cache.
    fn rerender(&self) {
        let selection = self.selection();
        match self.render(&selection) {
            Ok(view) => self.ui.render(&view),
            Err(e) => debug!(error = %e, "Selection not renderable with current rates"),
        }
    }
}

fn view_of(
    request: &ConversionRequest,
    cached: &CachedRates,
) -> Result<ConversionView, ConversionError> {
    let converted =
        exchange_rates::convert(request.amount, request.from, request.to, &cached.rates)?;
    Ok(ConversionView {
        converted_amount_text: exchange_rates::format_in(converted, request.to),
        rate_summary_text: exchange_rates::rate_summary(request.from, request.to, &cached.rates)?,
        is_degraded: cached.origin.is_offline(),
    })
}

/// Explicitly constructed controller for one converter widget.
///
/// Generic over `S: KeyValueStore`, which backs both the rate cache and the
/// favorites list. The periodic refresh task started by
/// [`ConverterController::start`] is aborted on [`ConverterController::stop`]
/// or drop.
pub struct ConverterController<S: KeyValueStore> {
    shared: Arc<Shared<S>>,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl<S: KeyValueStore> ConverterController<S> {
    pub fn new(
        config: ConverterConfig,
        fetcher: FallbackFetcher,
        store: Arc<S>,
        ui: Arc<dyn UiSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = RateCache::new(store.clone(), config.rates_key(), config.cache_ttl);
        let favorites =
            FavoritesStore::new(store, config.favorites_key(), config.favorites_capacity);
        let selection = Mutex::new(config.default_request);

        Self {
            shared: Arc::new(Shared {
                config,
                fetcher,
                cache,
                favorites,
                ui,
                clock,
                state: RwLock::new(ConverterState::Idle),
                in_flight: AtomicBool::new(false),
                selection,
            }),
            scheduler: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConverterState {
        self.shared.state()
    }

    pub fn favorites(&self) -> Vec<FavoritePair> {
        self.shared.favorites.list()
    }

    /// Last conversion the UI asked for.
    pub fn selection(&self) -> ConversionRequest {
        self.shared.selection()
    }

    pub fn cached_rates(&self) -> Option<CachedRates> {
        self.shared.cache.read()
    }

    /// Loads persisted rates and favorites, then either serves the fresh
    /// cache directly or fetches.
    ///
    /// A fresh cache holding offline rates starts out degraded. Unreadable
    /// storage is logged and treated as empty.
    pub async fn initialize(&self) -> RefreshOutcome {
        let shared = &self.shared;

        if let Err(e) = shared.cache.load().await {
            warn!(error = %e, "Failed to load cached rates");
        }
        match shared.favorites.load().await {
            Ok(favorites) => shared.ui.favorites_changed(&favorites),
            Err(e) => warn!(error = %e, "Failed to load favorites"),
        }

        let now = shared.clock.now_millis();
        let ttl = shared.cache.ttl_ms();
        match shared
            .cache
            .with_current(|cached| (cached.is_stale(now, ttl), cached.origin.is_offline()))
        {
            Some((false, offline)) => {
                if offline {
                    shared.set_state(ConverterState::Degraded);
                    shared.ui.warn(DEGRADED_WARNING);
                } else {
                    shared.set_state(ConverterState::Ready);
                }
                info!(state = %shared.state(), "Serving cached exchange rates");
                shared.rerender();
                RefreshOutcome::Fresh
            }
            _ => shared.refresh(RefreshTrigger::Initial).await,
        }
    }

    /// Runs one refresh to completion.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> RefreshOutcome {
        self.shared.refresh(trigger).await
    }

    /// Converts from the current cache without waiting on the network.
    ///
    /// The request becomes the remembered selection. If no usable rate is
    /// cached, the UI shows its loading state and an on-demand refresh is
    /// started; the selection is re-rendered when it completes.
    pub fn convert(&self, request: ConversionRequest) -> Conversion {
        self.shared.remember(request);
        match self.shared.render(&request) {
            Ok(view) => {
                self.shared.ui.render(&view);
                Conversion::Rendered(view)
            }
            Err(ConversionError::OutOfRange) => {
                let error = ConversionError::OutOfRange;
                debug!(amount = request.amount, "Conversion result out of range");
                self.shared.ui.warn(&error.to_string());
                Conversion::Rejected(error)
            }
            Err(e) => self.loading(e),
        }
    }

    /// Like [`ConverterController::convert`] for raw form values. An unknown
    /// currency code takes the loading path.
    pub fn convert_input(&self, amount: &str, from: &str, to: &str) -> Conversion {
        match ConversionRequest::from_input(amount, from, to) {
            Ok(request) => self.convert(request),
            Err(e) => self.loading(e),
        }
    }

    fn loading(&self, error: ConversionError) -> Conversion {
        debug!(error = %error, "Rates unavailable, refreshing on demand");
        self.shared.ui.show_loading();
        Conversion::Loading(self.spawn_refresh(RefreshTrigger::OnDemand))
    }

    fn spawn_refresh(&self, trigger: RefreshTrigger) -> PendingRefresh {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let shared = Arc::clone(&self.shared);
                Some(runtime.spawn(async move { shared.refresh(trigger).await }))
            }
            Err(e) => {
                warn!(error = %e, "No async runtime, cannot refresh rates");
                None
            }
        };
        PendingRefresh { handle }
    }

    /// Routes one UI event.
    pub async fn handle(&self, event: UiEvent) {
        match event {
            UiEvent::Convert(request) => {
                self.convert(request);
            }
            UiEvent::Swap => {
                self.convert(self.selection().swapped());
            }
            UiEvent::Refresh => {
                let outcome = self.refresh(RefreshTrigger::Manual).await;
                debug!(?outcome, "Manual refresh finished");
            }
            UiEvent::ToggleFavorite(pair) => {
                self.toggle_favorite(pair).await;
            }
        }
    }

    /// Toggles `pair` and pushes the new list to the UI. Returns whether the
    /// pair is a favorite afterwards.
    pub async fn toggle_favorite(&self, pair: FavoritePair) -> bool {
        let favorites = &self.shared.favorites;
        let is_favorite = match favorites.toggle(pair).await {
            Ok(added) => added,
            Err(e) => {
                warn!(pair = %pair, error = %e, "Failed to persist favorites");
                favorites.contains(&pair)
            }
        };
        self.shared.ui.favorites_changed(&favorites.list());
        is_favorite
    }

    /// Starts the periodic refresh task. The first tick fires one interval
    /// from now. Calling it again while running does nothing.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start(&self) {
        let mut scheduler = self.scheduler.lock().unwrap_or_else(PoisonError::into_inner);
        if scheduler.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let period = shared.config.refresh_interval;
        info!(?period, "Starting scheduled rate refresh");
        *scheduler = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let outcome = shared.refresh(RefreshTrigger::Scheduled).await;
                debug!(?outcome, "Scheduled refresh finished");
            }
        }));
    }

    pub fn stop(&self) {
        if let Some(task) = self
            .scheduler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
            info!("Stopped scheduled rate refresh");
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl<S: KeyValueStore> Drop for ConverterController<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
