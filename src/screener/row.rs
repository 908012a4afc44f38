/// 筛选器数据行
///
/// 服务端返回的 JSON 字段类型并不稳定（Decimal 会被序列化成字符串,
/// 缺失字段为 null）, 这里统一做宽松解析。

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use super::columns::{column_spec, COLUMNS};
use super::delta::DeltaState;
use super::formatter::as_number;

#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("row is not a JSON object")]
    NotAnObject,

    #[error("row has no symbol")]
    MissingSymbol,

    #[error("expected a JSON array of rows")]
    NotAnArray,
}

/// 一个交易对的最新快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenerRow {
    /// 行键
    pub symbol: String,
    pub name: Option<String>,
    pub ts: Option<String>,
    values: HashMap<&'static str, f64>,
    /// 服务端预先格式化的文本
    display: HashMap<&'static str, String>,
    /// 服务端预先计算的颜色
    classes: HashMap<&'static str, DeltaState>,
}

impl ScreenerRow {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// 设置数值字段（未知列忽略）
    pub fn with_value(mut self, column: &str, value: f64) -> Self {
        if let Some(spec) = column_spec(column) {
            if spec.family.is_numeric() && value.is_finite() {
                self.values.insert(spec.id, value);
            }
        }
        self
    }

    pub fn with_ts(mut self, ts: impl Into<String>) -> Self {
        self.ts = Some(ts.into());
        self
    }

    pub fn with_display(mut self, column: &str, text: impl Into<String>) -> Self {
        if let Some(spec) = column_spec(column) {
            self.display.insert(spec.id, text.into());
        }
        self
    }

    pub fn with_class(mut self, column: &str, state: DeltaState) -> Self {
        if let Some(spec) = column_spec(column) {
            self.classes.insert(spec.id, state);
        }
        self
    }

    /// 从 JSON 对象解析
    pub fn from_json(value: &Value) -> Result<Self, RowError> {
        Self::from_json_with_symbol(value, None)
    }

    /// 解析历史快照（快照中可能没有 symbol 字段）
    pub fn from_json_with_symbol(value: &Value, fallback_symbol: Option<&str>) -> Result<Self, RowError> {
        let object = value.as_object().ok_or(RowError::NotAnObject)?;

        let symbol = object
            .get("symbol")
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| fallback_symbol.map(str::to_string))
            .ok_or(RowError::MissingSymbol)?;

        let mut row = ScreenerRow::new(symbol);
        row.name = object.get("name").and_then(Value::as_str).map(str::to_string);
        row.ts = object.get("ts").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        for spec in COLUMNS.iter() {
            if spec.family.is_numeric() {
                if let Some(v) = object.get(spec.id).and_then(as_number) {
                    row.values.insert(spec.id, v);
                }
            }

            if let Some(text) = object.get(&format!("{}_display", spec.id)).and_then(Value::as_str) {
                row.display.insert(spec.id, text.to_string());
            }

            if let Some(class) = object.get(&format!("{}_class", spec.id)).and_then(Value::as_str) {
                row.classes.insert(spec.id, DeltaState::from_class(class));
            }
        }

        Ok(row)
    }

    /// 数值字段
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    /// 文本字段 (symbol / ts)
    pub fn text(&self, column: &str) -> Option<&str> {
        match column {
            "symbol" => Some(self.symbol.as_str()),
            "ts" => self.ts.as_deref(),
            _ => None,
        }
    }

    pub fn server_display(&self, column: &str) -> Option<&str> {
        self.display.get(column).map(String::as_str)
    }

    pub fn server_class(&self, column: &str) -> Option<DeltaState> {
        self.classes.get(column).copied()
    }
}

/// 解析列表接口的响应, 跳过无法识别的行
pub fn parse_rows(value: &Value) -> Result<Vec<ScreenerRow>, RowError> {
    let items = value.as_array().ok_or(RowError::NotAnArray)?;

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        match ScreenerRow::from_json(item) {
            Ok(row) => rows.push(row),
            Err(e) => log::debug!("跳过无效数据行: {}", e),
        }
    }
    Ok(rows)
}

/// 单个交易对的详情（最新值 + 历史快照, 从旧到新）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolDetail {
    pub symbol: String,
    pub name: Option<String>,
    pub latest: Option<ScreenerRow>,
    pub snapshots: Vec<ScreenerRow>,
}

impl SymbolDetail {
    pub fn from_json(value: &Value, requested_symbol: &str) -> Result<Self, RowError> {
        let object = value.as_object().ok_or(RowError::NotAnObject)?;

        let symbol = object
            .get("symbol")
            .and_then(Value::as_str)
            .unwrap_or(requested_symbol)
            .to_string();

        let latest = match object.get("latest") {
            Some(v) if v.is_object() => ScreenerRow::from_json_with_symbol(v, Some(&symbol)).ok(),
            _ => None,
        };

        let snapshots = object
            .get("snapshots")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| ScreenerRow::from_json_with_symbol(item, Some(&symbol)).ok())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            name: object.get("name").and_then(Value::as_str).map(str::to_string),
            symbol,
            latest,
            snapshots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_numbers() {
        let row = ScreenerRow::from_json(&json!({
            "symbol": "BTCUSDT",
            "price": "1234.5",
            "volume_15m": 2500000,
            "change_15m": null,
            "funding_rate": "bad",
            "ts": "2024-05-01T12:00:00+00:00"
        }))
        .unwrap();

        assert_eq!(row.value("price"), Some(1234.5));
        assert_eq!(row.value("volume_15m"), Some(2_500_000.0));
        assert_eq!(row.value("change_15m"), None);
        assert_eq!(row.value("funding_rate"), None);
        assert_eq!(row.text("ts"), Some("2024-05-01T12:00:00+00:00"));
        assert_eq!(row.text("symbol"), Some("BTCUSDT"));
    }

    #[test]
    fn test_server_presentation_fields() {
        let row = ScreenerRow::from_json(&json!({
            "symbol": "ETHUSDT",
            "price": 3000.0,
            "price_display": "3,000",
            "price_class": "value-down"
        }))
        .unwrap();

        assert_eq!(row.server_display("price"), Some("3,000"));
        assert_eq!(row.server_class("price"), Some(DeltaState::Down));
        assert_eq!(row.server_display("volume_15m"), None);
    }

    #[test]
    fn test_parse_rows_skips_invalid() {
        let rows = parse_rows(&json!([
            {"symbol": "BTCUSDT", "price": 1.0},
            {"price": 2.0},
            "garbage",
            {"symbol": "ETHUSDT"}
        ]))
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(parse_rows(&json!({"rows": []})), Err(RowError::NotAnArray));
    }

    #[test]
    fn test_symbol_detail() {
        let detail = SymbolDetail::from_json(
            &json!({
                "symbol": "BTCUSDT",
                "latest": {"ts": "t2", "price": 101.0},
                "snapshots": [
                    {"ts": "t1", "price": 100.0},
                    {"ts": "t2", "price": 101.0}
                ]
            }),
            "btcusdt",
        )
        .unwrap();

        assert_eq!(detail.symbol, "BTCUSDT");
        assert_eq!(detail.latest.as_ref().and_then(|r| r.value("price")), Some(101.0));
        assert_eq!(detail.snapshots.len(), 2);
        assert_eq!(detail.snapshots[0].symbol, "BTCUSDT");
    }

    #[test]
    fn test_symbol_detail_without_latest() {
        let detail = SymbolDetail::from_json(&json!({"latest": null, "snapshots": []}), "XRPUSDT").unwrap();
        assert_eq!(detail.symbol, "XRPUSDT");
        assert!(detail.latest.is_none());
        assert!(detail.snapshots.is_empty());
    }
}
