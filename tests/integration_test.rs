use flow_screener::screener::{
    parse_rows, render, render_history, render_latest, ColumnVisibility, DeltaState, FieldFamily, ScreenerQuery,
    ScreenerState, SortOrder, SymbolDetail,
};
use flow_screener::screener::formatter::format_value;
use serde_json::json;

#[test]
fn test_end_to_end_poll_render() {
    let first = json!([
        {"symbol": "BTC", "price": 1234.5, "volume_15m": 2_500_000, "change_15m": -1.2345}
    ]);
    let rows = parse_rows(&first).unwrap();
    let (state, view) = render(ScreenerState::default(), &rows, None);

    let btc = view.row("BTC").unwrap();
    assert_eq!(btc.cell("price").unwrap().text, "1.23K");
    assert_eq!(btc.cell("volume_15m").unwrap().text, "2.50M");
    assert_eq!(btc.cell("change_15m").unwrap().text, "-1.23%");
    assert!(btc.cells.iter().all(|c| c.delta == DeltaState::Neutral));

    let second = json!([
        {"symbol": "BTC", "price": 1300, "volume_15m": 2_500_000, "change_15m": -1.2345}
    ]);
    let rows = parse_rows(&second).unwrap();
    let (_, view) = render(state, &rows, None);

    let btc = view.row("BTC").unwrap();
    assert_eq!(btc.cell("price").unwrap().delta, DeltaState::Up);
    assert_eq!(btc.cell("volume_15m").unwrap().delta, DeltaState::Neutral);
}

#[test]
fn test_delta_rule_is_sign_agnostic() {
    for column in ["change_15m", "volume_15m"] {
        let mk = |v: f64| parse_rows(&json!([{ "symbol": "ETH", column: v }])).unwrap();

        let state = ScreenerState::default().seed(&mk(10.0));
        let (state, view) = render(state, &mk(10.00005), None);
        assert_eq!(view.row("ETH").unwrap().cell(column).unwrap().delta, DeltaState::Neutral);

        let (state, view) = render(state, &mk(11.0), None);
        assert_eq!(view.row("ETH").unwrap().cell(column).unwrap().delta, DeltaState::Up);

        let (_, view) = render(state, &mk(9.0), None);
        assert_eq!(view.row("ETH").unwrap().cell(column).unwrap().delta, DeltaState::Down);
    }
}

#[test]
fn test_string_decimals_and_server_presentation() {
    let payload = json!([
        {
            "symbol": "SOLUSDT",
            "price": "142.5",
            "funding_rate": "0.0001",
            "open_interest": 12_500_000.0,
            "open_interest_display": "12.5M",
            "oi_change_15m": 0.42,
            "oi_change_15m_class": "value-down"
        },
        {"price": 1.0},
        "garbage"
    ]);
    let rows = parse_rows(&payload).unwrap();
    assert_eq!(rows.len(), 1);

    let (state, view) = render(ScreenerState::default(), &rows, None);
    let sol = view.row("SOLUSDT").unwrap();
    assert_eq!(sol.cell("price").unwrap().text, "142.50");
    assert_eq!(sol.cell("funding_rate").unwrap().text, "0.000100");
    assert_eq!(sol.cell("open_interest").unwrap().text, "12.5M");
    assert_eq!(sol.cell("oi_change_15m").unwrap().delta, DeltaState::Down);
    assert_eq!(state.cache.get("SOLUSDT", "open_interest"), Some(12_500_000.0));
}

#[test]
fn test_formatter_thresholds() {
    assert_eq!(format_value(FieldFamily::Volume, Some(999.0)), "999.00");
    assert_eq!(format_value(FieldFamily::Volume, Some(1000.0)), "1.00K");
    assert_eq!(format_value(FieldFamily::Volume, Some(1_000_000.0)), "1.00M");
    assert_eq!(format_value(FieldFamily::Volume, Some(f64::NAN)), "0.00");
    assert_eq!(format_value(FieldFamily::Percent, None), "0.00%");
    assert_eq!(format_value(FieldFamily::Vdelta, Some(42.0)), "42");
    assert_eq!(format_value(FieldFamily::Vdelta, Some(42.5)), "42.5");
}

#[test]
fn test_hidden_columns_stay_hidden_across_renders() {
    let mut visibility = ColumnVisibility::default();
    visibility.set_visible("price", false);
    let state = ScreenerState::new(visibility);

    let rows = parse_rows(&json!([{"symbol": "BTC", "price": 1.0}])).unwrap();
    let (state, view) = render(state, &rows, None);
    assert!(!view.row("BTC").unwrap().cell("price").unwrap().visible);
    assert!(view.visible_headers().all(|h| h.column != "price"));

    let (_, view) = render(state, &rows, None);
    assert!(!view.row("BTC").unwrap().cell("price").unwrap().visible);
}

#[test]
fn test_sort_navigation_target() {
    let query = ScreenerQuery::parse("market_type=futures&min_volume_15m=5000&sort=change_15m&order=desc");
    let next = query.sorted_by("change_15m");
    assert_eq!(next.sort.as_ref().unwrap().order, SortOrder::Asc);
    assert_eq!(next.filter("min_volume_15m"), Some("5000"));

    let other = next.sorted_by("price");
    assert_eq!(other.sort.as_ref().unwrap().column, "price");
    assert_eq!(other.sort.as_ref().unwrap().order, SortOrder::Desc);

    let (_, view) = render(ScreenerState::default(), &[], other.sort.as_ref());
    let price = view.headers.iter().find(|h| h.column == "price").unwrap();
    assert_eq!(price.sort, Some(SortOrder::Desc));
}

#[test]
fn test_symbol_detail_history() {
    let payload = json!({
        "symbol": "BTCUSDT",
        "latest": {"price": 103.0, "ts": "2024-05-01T12:02:00+00:00"},
        "snapshots": [
            {"price": 100.0, "ts": "2024-05-01T12:00:00+00:00"},
            {"price": 104.0, "ts": "2024-05-01T12:01:00+00:00"},
            {"price": 103.0, "ts": "2024-05-01T12:02:00+00:00"}
        ]
    });
    let detail = SymbolDetail::from_json(&payload, "BTCUSDT").unwrap();
    assert_eq!(detail.snapshots.len(), 3);

    let history = render_history(&detail);
    let prices: Vec<_> = history
        .rows
        .iter()
        .map(|r| r.cell("price").unwrap().delta)
        .collect();
    assert_eq!(prices, vec![DeltaState::Neutral, DeltaState::Up, DeltaState::Down]);
    assert_eq!(history.rows[0].cell("ts").unwrap().text, "2024-05-01 12:00:00");

    let latest = render_latest(&detail);
    let price = latest.iter().find(|c| c.column == "price").unwrap();
    assert_eq!(price.text, "103.00");
    assert_eq!(price.delta, DeltaState::Down);
}
