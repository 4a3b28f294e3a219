use crate::charts::{AxisUpdate, ChartPane, build_series};
use crate::config::StatsSource;
use crate::errors::{GatewayError, SaveError};
use crate::gateway::DataGateway;
use crate::models::{Entry, EntryPayload, SaveMode, StatsPayload};
use crate::presenter::{StatsPanel, present_payload, present_zoom};
use crate::sequencer::{CycleToken, RequestSequencer};
use crate::stats::{compute_aggregates, local_payload};
use crate::sync::{ChartRangeSynchronizer, SyncOutcome, lock};
use crate::window::{VisibleRange, WindowSelector, filter_by_range};
use chrono::{Local, NaiveDate};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

pub type PanelListener = Box<dyn Fn(&StatsPanel) + Send + Sync>;

struct ViewState {
    window: WindowSelector,
    /// Entries of the current window, ascending by date, one per day.
    entries: Vec<Entry>,
    /// The last entries fetch failed; `entries` is empty, not authoritative.
    entries_failed: bool,
    panel: StatsPanel,
}

impl ViewState {
    fn zoom_panel(&self, range: &VisibleRange) -> StatsPanel {
        let in_range = filter_by_range(&self.entries, Some(range));
        debug!(start = %range.start, end = %range.end, count = in_range.len(), "zoom statistics");
        present_zoom(&in_range)
    }
}

enum StatsResult {
    Loaded(StatsPayload),
    Empty,
    Failed(GatewayError),
    NoEntries,
}

/// All mutable dashboard state, and the operations that change it.
///
/// Every load runs under a [`CycleToken`]; its results reach the view only
/// if no newer cycle has started in the meantime. The token check and the
/// mutation happen under the same lock that starting a cycle takes.
pub struct DashboardSession<G> {
    gateway: G,
    sequencer: RequestSequencer,
    sync: Arc<ChartRangeSynchronizer>,
    stats_source: StatsSource,
    today: fn() -> NaiveDate,
    view: Mutex<ViewState>,
    listeners: Mutex<Vec<PanelListener>>,
}

impl<G: DataGateway> DashboardSession<G> {
    pub fn new(gateway: G, stats_source: StatsSource) -> Self {
        Self {
            gateway,
            sequencer: RequestSequencer::new(),
            sync: Arc::new(ChartRangeSynchronizer::new()),
            stats_source,
            today: local_today,
            view: Mutex::new(ViewState {
                window: WindowSelector::AllTime,
                entries: Vec::new(),
                entries_failed: false,
                panel: StatsPanel::loading(),
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Pins the date windows are resolved against.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn synchronizer(&self) -> &Arc<ChartRangeSynchronizer> {
        &self.sync
    }

    pub fn mount(&self, pane: Arc<dyn ChartPane>) {
        self.sync.mount(pane);
    }

    pub fn window(&self) -> WindowSelector {
        lock(&self.view).window
    }

    pub fn entries(&self) -> Vec<Entry> {
        lock(&self.view).entries.clone()
    }

    pub fn panel(&self) -> StatsPanel {
        lock(&self.view).panel.clone()
    }

    pub fn active_range(&self) -> Option<VisibleRange> {
        self.sync.active_range()
    }

    pub fn current_cycle(&self) -> CycleToken {
        self.sequencer.current()
    }

    /// Called with every panel that reaches the view.
    pub fn subscribe(&self, listener: PanelListener) {
        lock(&self.listeners).push(listener);
    }

    /// Switches to `window` and reloads charts and statistics for it.
    pub async fn select_window(&self, window: WindowSelector) -> CycleToken {
        let token = {
            let mut view = lock(&self.view);
            view.window = window;
            self.sequencer.begin_cycle()
        };
        info!(cycle = token.id(), %window, "loading window");

        self.sync.clear_active_range();
        self.load_charts(token, window).await;
        self.load_stats(token, window).await;
        token
    }

    /// Reloads the current window.
    pub async fn refresh(&self) -> CycleToken {
        self.select_window(self.window()).await
    }

    /// Handles a pan, zoom or reset reported by pane `source`, then brings
    /// the stats panel in line with what the charts now show.
    pub async fn handle_relayout(&self, source: &str, update: AxisUpdate) -> SyncOutcome {
        let outcome = self.sync.handle_relayout(source, update);
        if matches!(outcome, SyncOutcome::Synced { .. }) {
            self.present_for_active_view().await;
        }
        outcome
    }

    /// With a zoom active, statistics are recomputed from the loaded entries
    /// inside it; otherwise the selected window's statistics are loaded.
    pub async fn present_for_active_view(&self) {
        let token = self.sequencer.current();
        let Some(range) = self.sync.active_range() else {
            let window = self.window();
            self.load_stats(token, window).await;
            return;
        };

        let panel = self.commit(token, |view| {
            let panel = view.zoom_panel(&range);
            view.panel = panel.clone();
            panel
        });
        if let Some(panel) = panel {
            self.notify(&panel);
        }
    }

    pub async fn load_entry(&self, date: NaiveDate) -> Result<Option<Entry>, GatewayError> {
        self.gateway.fetch_entry(date).await
    }

    pub async fn save_entry(&self, payload: &EntryPayload) -> Result<SaveMode, SaveError> {
        match self.gateway.create_or_update_entry(payload).await {
            Ok(mode) => {
                info!(date = %payload.date, %mode, "entry saved");
                Ok(mode)
            }
            Err(cause) => {
                error!(date = %payload.date, "failed to save entry: {cause}");
                Err(SaveError { cause })
            }
        }
    }

    async fn load_charts(&self, token: CycleToken, window: WindowSelector) {
        let fetched = self.gateway.fetch_entries(window).await;
        let window_axis =
            AxisUpdate::from(window.range_ending((self.today)()).map(VisibleRange::from));

        self.commit(token, |view| {
            match fetched {
                Ok(mut entries) => {
                    entries.sort_by_key(|entry| entry.date);
                    let before = entries.len();
                    entries.dedup_by_key(|entry| entry.date);
                    if entries.len() != before {
                        let dropped = before - entries.len();
                        warn!(dropped, "duplicate entry dates in response");
                    }
                    view.entries = entries;
                    view.entries_failed = false;
                }
                Err(err) => {
                    error!(cycle = token.id(), "failed to load entries: {err}");
                    view.entries.clear();
                    view.entries_failed = true;
                }
            }

            // A zoom made while the fetch was in flight outranks the window.
            let axis = self.sync.active_range().map_or(window_axis, AxisUpdate::Range);
            for pane in self.sync.panes() {
                let series = build_series(pane.kind(), &view.entries);
                if let Err(err) = pane.draw(series, &axis) {
                    warn!(pane = pane.id(), %err, "failed to draw chart");
                }
            }
        });
    }

    async fn load_stats(&self, token: CycleToken, window: WindowSelector) {
        let result = match self.stats_source {
            StatsSource::Remote => match self.gateway.fetch_statistics(window).await {
                Ok(payload) => StatsResult::Loaded(payload),
                Err(err) if err.is_not_found() => StatsResult::Empty,
                Err(err) => StatsResult::Failed(err),
            },
            StatsSource::Local => {
                let (entries, failed) = {
                    let view = lock(&self.view);
                    (view.entries.clone(), view.entries_failed)
                };
                if failed {
                    StatsResult::NoEntries
                } else {
                    match self.local_statistics(window, &entries) {
                        Some(payload) => StatsResult::Loaded(payload),
                        None => StatsResult::Empty,
                    }
                }
            }
        };

        let panel = self.commit(token, |view| {
            let panel = match (self.sync.active_range(), result) {
                (Some(range), _) => view.zoom_panel(&range),
                (None, result) => Self::window_panel(result, window, &view.entries),
            };
            view.panel = panel.clone();
            panel
        });
        if let Some(panel) = panel {
            self.notify(&panel);
        }
    }

    fn window_panel(
        result: StatsResult,
        window: WindowSelector,
        entries: &[Entry],
    ) -> StatsPanel {
        match result {
            StatsResult::Loaded(payload) => present_payload(&payload, window, entries),
            StatsResult::Empty => {
                info!(%window, "no statistics for window");
                StatsPanel::no_data()
            }
            StatsResult::Failed(err) => {
                error!("failed to load statistics: {err}");
                StatsPanel::unavailable()
            }
            StatsResult::NoEntries => {
                warn!(%window, "no entries to compute statistics from");
                StatsPanel::unavailable()
            }
        }
    }

    /// Mirrors what the statistics endpoint reports for `window`.
    fn local_statistics(&self, window: WindowSelector, entries: &[Entry]) -> Option<StatsPayload> {
        let Some(range) = window.range_ending((self.today)()) else {
            return local_payload(entries);
        };
        let in_window = filter_by_range(entries, Some(&VisibleRange::from(range)));
        if in_window.is_empty() {
            return None;
        }
        Some(StatsPayload {
            window_days: Some(range.day_count()),
            start_date: Some(range.start.to_string()),
            end_date: Some(range.end.to_string()),
            stats: compute_aggregates(&in_window),
        })
    }

    fn commit<T>(&self, token: CycleToken, effect: impl FnOnce(&mut ViewState) -> T) -> Option<T> {
        let mut view = lock(&self.view);
        self.sequencer.run_if_current(token, || effect(&mut view))
    }

    fn notify(&self, panel: &StatsPanel) {
        for listener in lock(&self.listeners).iter() {
            listener(panel);
        }
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
