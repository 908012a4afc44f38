pub mod screener_app;

pub use screener_app::{DetailView, PollStats, ScreenerApp};
