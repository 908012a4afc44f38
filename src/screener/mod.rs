/// 筛选器核心: 列目录、格式化、差值着色、列可见性与纯渲染
///
/// 本模块不依赖界面框架, 所有状态都显式传入和返回。

pub mod columns;
pub mod delta;
pub mod formatter;
pub mod i18n;
pub mod render;
pub mod row;
pub mod sort;
pub mod store;
pub mod visibility;

pub use columns::{column_label, column_spec, columns_in, ColumnCategory, ColumnSpec, COLUMNS, DEFAULT_VISIBLE};
pub use delta::{DeltaState, PreviousValueCache, DELTA_EPSILON};
pub use formatter::{format_json, format_value, FieldFamily};
pub use i18n::{Language, UiStrings};
pub use render::{render, render_history, render_latest, CellView, HeaderView, RowView, ScreenerState, TableView};
pub use row::{parse_rows, RowError, ScreenerRow, SymbolDetail};
pub use sort::{detail_url, MarketType, ScreenerQuery, SortInstruction, SortOrder};
pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, StoreError};
pub use visibility::ColumnVisibility;
