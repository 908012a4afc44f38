use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use flow_screener::config::GlobalConfig;
use flow_screener::poller::{PollError, PollResult, PollUpdate, ScreenerSource};
use flow_screener::screener::store::VISIBLE_COLUMNS_KEY;
use flow_screener::screener::{
    ColumnVisibility, FilePreferenceStore, Language, PreferenceStore, ScreenerQuery, ScreenerRow, SymbolDetail,
};
use flow_screener::ScreenerApp;

struct NoSource;

#[async_trait]
impl ScreenerSource for NoSource {
    async fn fetch_rows(&self, _query: &ScreenerQuery) -> PollResult<Vec<ScreenerRow>> {
        Err(PollError::Status(404))
    }

    async fn fetch_symbol(&self, _symbol: &str) -> PollResult<SymbolDetail> {
        Err(PollError::Status(404))
    }
}

fn temp_prefs(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("flow_screener_prefs_{}_{}.json", name, std::process::id()))
}

fn open_app(path: &PathBuf) -> ScreenerApp {
    let store: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::open(path));
    ScreenerApp::new(GlobalConfig::default(), store, Arc::new(NoSource))
}

#[test]
fn test_visibility_round_trips_through_file() {
    let path = temp_prefs("roundtrip");
    let _ = fs::remove_file(&path);

    let mut app = open_app(&path);
    let seq = app.list_sequence().next();
    app.apply(PollUpdate::Rows {
        seq,
        rows: vec![ScreenerRow::new("BTC").with_value("price", 1.0).with_value("ticks_5m", 12.0)],
    });

    app.toggle_column("price");
    app.toggle_column("ticks_5m");
    let before: Vec<(String, bool)> = app.view().rows[0]
        .cells
        .iter()
        .map(|c| (c.column.to_string(), c.visible))
        .collect();
    drop(app);

    let mut reopened = open_app(&path);
    let seq = reopened.list_sequence().next();
    reopened.apply(PollUpdate::Rows {
        seq,
        rows: vec![ScreenerRow::new("BTC").with_value("price", 1.0).with_value("ticks_5m", 12.0)],
    });
    let after: Vec<(String, bool)> = reopened.view().rows[0]
        .cells
        .iter()
        .map(|c| (c.column.to_string(), c.visible))
        .collect();

    assert_eq!(before, after);
    assert!(!reopened.visibility().is_visible("price"));
    assert!(reopened.visibility().is_visible("ticks_5m"));
    let _ = fs::remove_file(&path);
}

#[test]
fn test_malformed_preferences_fall_back_to_defaults() {
    let path = temp_prefs("malformed");
    fs::write(&path, r#"{"screener_visible_columns": "not-json[", "language": "klingon"}"#).unwrap();

    let app = open_app(&path);
    assert_eq!(app.visibility(), &ColumnVisibility::default());
    assert_eq!(app.language(), Language::En);
    let _ = fs::remove_file(&path);
}

#[test]
fn test_reset_restores_defaults_and_persists() {
    let path = temp_prefs("reset");
    let _ = fs::remove_file(&path);

    let mut app = open_app(&path);
    app.set_column_visible("vdelta_1h", true);
    app.set_column_visible("symbol", false);
    app.reset_columns();
    drop(app);

    let store = FilePreferenceStore::open(&path);
    let raw = store.get(VISIBLE_COLUMNS_KEY).unwrap();
    assert_eq!(ColumnVisibility::from_json(&raw), ColumnVisibility::default());
    let _ = fs::remove_file(&path);
}
