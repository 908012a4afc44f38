/// 表格视图渲染
///
/// `render(state, rows) -> (state', view)` 是纯函数: 不依赖任何界面框架,
/// 界面层只负责把 `TableView` 画出来。

use chrono::DateTime;

use super::columns::{column_spec, ColumnSpec, COLUMNS};
use super::delta::{DeltaState, PreviousValueCache};
use super::formatter::{format_value, FieldFamily};
use super::row::{ScreenerRow, SymbolDetail};
use super::sort::{SortInstruction, SortOrder};
use super::visibility::ColumnVisibility;

/// 详情页历史表格的列
pub const HISTORY_COLUMNS: [&str; 7] = [
    "ts",
    "price",
    "change_15m",
    "volume_15m",
    "open_interest",
    "oi_change_15m",
    "funding_rate",
];

/// 详情页"最新值"区域的列
pub const LATEST_COLUMNS: [&str; 7] = [
    "price",
    "volatility_15m",
    "volume_5m",
    "oi_change_15m",
    "funding_rate",
    "open_interest",
    "ts",
];

/// 筛选器会话状态
#[derive(Debug, Clone, Default)]
pub struct ScreenerState {
    pub cache: PreviousValueCache,
    pub visibility: ColumnVisibility,
}

impl ScreenerState {
    pub fn new(visibility: ColumnVisibility) -> Self {
        Self {
            cache: PreviousValueCache::new(),
            visibility,
        }
    }

    /// 用初始数据预填缓存, 使第一次刷新就有颜色
    pub fn seed(mut self, rows: &[ScreenerRow]) -> Self {
        for row in rows {
            self.cache.record_row(row);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub column: &'static str,
    pub label: String,
    pub visible: bool,
    pub sortable: bool,
    /// 当前排序列的方向
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub column: &'static str,
    pub text: String,
    pub delta: DeltaState,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub symbol: String,
    pub cells: Vec<CellView>,
}

impl RowView {
    pub fn cell(&self, column: &str) -> Option<&CellView> {
        self.cells.iter().find(|c| c.column == column)
    }

    pub fn visible_cells(&self) -> impl Iterator<Item = &CellView> {
        self.cells.iter().filter(|c| c.visible)
    }
}

/// 渲染结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn visible_headers(&self) -> impl Iterator<Item = &HeaderView> {
        self.headers.iter().filter(|h| h.visible)
    }

    pub fn row(&self, symbol: &str) -> Option<&RowView> {
        self.rows.iter().find(|r| r.symbol == symbol)
    }

    /// 重新应用列可见性, 不重新渲染; 可以重复调用
    pub fn apply_visibility(&mut self, visibility: &ColumnVisibility) {
        for header in &mut self.headers {
            header.visible = visibility.is_visible(header.column);
        }
        for row in &mut self.rows {
            for cell in &mut row.cells {
                cell.visible = visibility.is_visible(cell.column);
            }
        }
    }

    /// 只更新表头的排序标记
    pub fn apply_sort(&mut self, sort: Option<&SortInstruction>) {
        for header in &mut self.headers {
            header.sort = sort.filter(|s| s.column == header.column).map(|s| s.order);
        }
    }
}

/// 渲染一次轮询结果
///
/// 先用旧缓存计算颜色, 再用本次的数值覆盖缓存。
pub fn render(
    mut state: ScreenerState,
    rows: &[ScreenerRow],
    sort: Option<&SortInstruction>,
) -> (ScreenerState, TableView) {
    let headers = build_headers(&state.visibility, sort);

    let row_views = rows
        .iter()
        .map(|row| RowView {
            symbol: row.symbol.clone(),
            cells: build_cells(row, COLUMNS.iter(), |column| state.cache.get(&row.symbol, column), Some(&state.visibility)),
        })
        .collect();

    for row in rows {
        state.cache.record_row(row);
    }

    (state, TableView { headers, rows: row_views })
}

fn build_headers(visibility: &ColumnVisibility, sort: Option<&SortInstruction>) -> Vec<HeaderView> {
    COLUMNS
        .iter()
        .map(|spec| HeaderView {
            column: spec.id,
            label: spec.label(),
            visible: visibility.is_visible(spec.id),
            sortable: spec.sortable(),
            sort: sort.filter(|s| s.column == spec.id).map(|s| s.order),
        })
        .collect()
}

fn build_cells<'a, F>(
    row: &ScreenerRow,
    columns: impl Iterator<Item = &'a ColumnSpec>,
    previous: F,
    visibility: Option<&ColumnVisibility>,
) -> Vec<CellView>
where
    F: Fn(&str) -> Option<f64>,
{
    columns
        .map(|spec| {
            let text = match row.server_display(spec.id) {
                Some(text) => text.to_string(),
                None => cell_text(row, spec),
            };

            let delta = match row.server_class(spec.id) {
                Some(state) => state,
                None if spec.comparable => row
                    .value(spec.id)
                    .map(|current| DeltaState::classify(previous(spec.id), current))
                    .unwrap_or_default(),
                None => DeltaState::Neutral,
            };

            CellView {
                column: spec.id,
                text,
                delta,
                visible: visibility.map(|v| v.is_visible(spec.id)).unwrap_or(true),
            }
        })
        .collect()
}

fn cell_text(row: &ScreenerRow, spec: &ColumnSpec) -> String {
    match spec.family {
        FieldFamily::Text if spec.id == "ts" => row.ts.as_deref().map(display_timestamp).unwrap_or_default(),
        FieldFamily::Text => row.text(spec.id).unwrap_or_default().to_string(),
        family => format_value(family, row.value(spec.id)),
    }
}

/// ISO 时间戳显示为 "YYYY-MM-DD HH:MM:SS", 无法解析时原样显示
pub fn display_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn specs(ids: &'static [&'static str]) -> impl Iterator<Item = &'static ColumnSpec> {
    ids.iter().filter_map(|id| column_spec(id))
}

/// 渲染详情页历史表格; 每个快照与前一个快照比较
pub fn render_history(detail: &SymbolDetail) -> TableView {
    let headers = specs(&HISTORY_COLUMNS)
        .map(|spec| HeaderView {
            column: spec.id,
            label: spec.label(),
            visible: true,
            sortable: false,
            sort: None,
        })
        .collect();

    let mut previous: Option<&ScreenerRow> = None;
    let mut rows = Vec::with_capacity(detail.snapshots.len());
    for snapshot in &detail.snapshots {
        let cells = build_cells(
            snapshot,
            specs(&HISTORY_COLUMNS),
            |column| previous.and_then(|p| p.value(column)),
            None,
        );
        rows.push(RowView {
            symbol: snapshot.symbol.clone(),
            cells,
        });
        previous = Some(snapshot);
    }

    TableView { headers, rows }
}

/// 渲染详情页最新值, 与倒数第二个快照比较
pub fn render_latest(detail: &SymbolDetail) -> Vec<CellView> {
    let latest = match &detail.latest {
        Some(latest) => latest,
        None => return Vec::new(),
    };

    let previous = detail
        .snapshots
        .len()
        .checked_sub(2)
        .and_then(|i| detail.snapshots.get(i));

    build_cells(
        latest,
        specs(&LATEST_COLUMNS),
        |column| previous.and_then(|p| p.value(column)),
        None,
    )
}
