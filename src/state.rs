use crate::charts::{ChartKind, ChartPane, PaneSnapshot, RecordedPane};
use crate::gateway::HttpGateway;
use crate::presenter::StatsPanel;
use crate::session::DashboardSession;
use crate::window::{VisibleRange, WindowSelector};
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<DashboardSession<HttpGateway>>,
    pub panes: Arc<Vec<Arc<RecordedPane>>>,
}

impl AppState {
    /// Mounts one recorded pane per chart on `session`.
    pub fn new(session: DashboardSession<HttpGateway>) -> Self {
        let panes: Vec<Arc<RecordedPane>> = ChartKind::ALL
            .into_iter()
            .map(|kind| Arc::new(RecordedPane::new(kind)))
            .collect();
        for pane in &panes {
            session.mount(pane.clone());
        }
        Self {
            session: Arc::new(session),
            panes: Arc::new(panes),
        }
    }

    pub fn pane(&self, id: &str) -> Option<&Arc<RecordedPane>> {
        let kind = ChartKind::from_id(id)?;
        self.panes.iter().find(|pane| pane.kind() == kind)
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            window: self.session.window(),
            visible_range: self.session.active_range(),
            panel: self.session.panel(),
            charts: self.panes.iter().map(|pane| pane.snapshot()).collect(),
        }
    }
}

/// Everything the page needs to draw itself.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub window: WindowSelector,
    pub visible_range: Option<VisibleRange>,
    pub panel: StatsPanel,
    pub charts: Vec<PaneSnapshot>,
}
