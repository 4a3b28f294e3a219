pub mod app;
pub mod charts;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod presenter;
pub mod sequencer;
pub mod session;
pub mod state;
pub mod stats;
pub mod sync;
pub mod ui;
pub mod window;

pub use app::router;
pub use config::{DashboardConfig, StatsSource};
pub use gateway::{DataGateway, HttpGateway};
pub use session::DashboardSession;
pub use state::AppState;
