/// 增量着色
///
/// 单元格颜色只反映"与上一次观察相比的变化", 与数值本身的正负无关。

use std::collections::HashMap;

use super::columns::comparable_columns;
use super::row::ScreenerRow;

/// 判定上涨/下跌的最小变化量
pub const DELTA_EPSILON: f64 = 1e-4;

/// 单元格的视觉状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeltaState {
    Up,
    Down,
    #[default]
    Neutral,
}

impl DeltaState {
    /// 比较当前值与上一次的值
    pub fn classify(previous: Option<f64>, current: f64) -> Self {
        let previous = match previous {
            Some(p) if p.is_finite() => p,
            _ => return DeltaState::Neutral,
        };
        if !current.is_finite() {
            return DeltaState::Neutral;
        }

        let diff = current - previous;
        if diff > DELTA_EPSILON {
            DeltaState::Up
        } else if diff < -DELTA_EPSILON {
            DeltaState::Down
        } else {
            DeltaState::Neutral
        }
    }

    /// 解析服务端提供的样式类名
    pub fn from_class(class: &str) -> Self {
        match class.trim() {
            "value-up" | "up" => DeltaState::Up,
            "value-down" | "down" => DeltaState::Down,
            _ => DeltaState::Neutral,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            DeltaState::Up => "value-up",
            DeltaState::Down => "value-down",
            DeltaState::Neutral => "",
        }
    }

    /// 纯文本输出用的变化标记
    pub fn marker(&self) -> &'static str {
        match self {
            DeltaState::Up => " ↑",
            DeltaState::Down => " ↓",
            DeltaState::Neutral => "",
        }
    }
}

/// 每个交易对上一次渲染的数值
///
/// 只增不减, 大小受交易对数量约束。
#[derive(Debug, Clone, Default)]
pub struct PreviousValueCache {
    entries: HashMap<String, HashMap<&'static str, f64>>,
}

impl PreviousValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str, column: &str) -> Option<f64> {
        self.entries.get(symbol).and_then(|fields| fields.get(column)).copied()
    }

    pub fn classify(&self, symbol: &str, column: &str, current: f64) -> DeltaState {
        DeltaState::classify(self.get(symbol, column), current)
    }

    pub fn record(&mut self, symbol: &str, column: &'static str, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.entries
            .entry(symbol.to_string())
            .or_default()
            .insert(column, value);
    }

    /// 用一行的当前值覆盖缓存
    pub fn record_row(&mut self, row: &ScreenerRow) {
        for spec in comparable_columns() {
            if let Some(value) = row.value(spec.id) {
                self.record(&row.symbol, spec.id, value);
            }
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
