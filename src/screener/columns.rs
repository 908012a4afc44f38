/// 列目录 - 所有已知列的静态描述
///
/// 每一列包含: 标识符、所属分类、格式化族、是否参与增量着色。
/// 设置面板按分类顺序展示, 表格按目录顺序渲染。

use std::fmt;

use super::formatter::FieldFamily;

/// 列分类（设置面板分组）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnCategory {
    Change,
    OiChange,
    Volatility,
    Ticks,
    Vdelta,
    Volume,
    Others,
}

impl ColumnCategory {
    /// 设置面板中的分类顺序
    pub const ALL: [ColumnCategory; 7] = [
        ColumnCategory::Change,
        ColumnCategory::OiChange,
        ColumnCategory::Volatility,
        ColumnCategory::Ticks,
        ColumnCategory::Vdelta,
        ColumnCategory::Volume,
        ColumnCategory::Others,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ColumnCategory::Change => "Change",
            ColumnCategory::OiChange => "OI Change",
            ColumnCategory::Volatility => "Volatility",
            ColumnCategory::Ticks => "Ticks",
            ColumnCategory::Vdelta => "Vdelta",
            ColumnCategory::Volume => "Volume",
            ColumnCategory::Others => "Others",
        }
    }
}

impl fmt::Display for ColumnCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// 单列描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub id: &'static str,
    pub category: ColumnCategory,
    pub family: FieldFamily,
    /// 数值列参与增量着色, symbol/ts 不参与
    pub comparable: bool,
}

impl ColumnSpec {
    const fn numeric(id: &'static str, category: ColumnCategory, family: FieldFamily) -> Self {
        Self { id, category, family, comparable: true }
    }

    const fn text(id: &'static str) -> Self {
        Self { id, category: ColumnCategory::Others, family: FieldFamily::Text, comparable: false }
    }

    /// 所有列都可以排序
    pub fn sortable(&self) -> bool {
        true
    }

    /// 由标识符派生的显示名: "change_15m" -> "Change 15m"
    pub fn label(&self) -> String {
        column_label(self.id)
    }
}

use ColumnCategory as Cat;
use FieldFamily as Fam;

/// 表格列顺序
pub static COLUMNS: [ColumnSpec; 31] = [
    ColumnSpec::text("symbol"),
    ColumnSpec::numeric("price", Cat::Others, Fam::Price),
    ColumnSpec::numeric("change_5m", Cat::Change, Fam::Percent),
    ColumnSpec::numeric("change_15m", Cat::Change, Fam::Percent),
    ColumnSpec::numeric("change_1h", Cat::Change, Fam::Percent),
    ColumnSpec::numeric("change_8h", Cat::Change, Fam::Percent),
    ColumnSpec::numeric("change_1d", Cat::Change, Fam::Percent),
    ColumnSpec::numeric("oi_change_5m", Cat::OiChange, Fam::Percent),
    ColumnSpec::numeric("oi_change_15m", Cat::OiChange, Fam::Percent),
    ColumnSpec::numeric("oi_change_1h", Cat::OiChange, Fam::Percent),
    ColumnSpec::numeric("oi_change_8h", Cat::OiChange, Fam::Percent),
    ColumnSpec::numeric("oi_change_1d", Cat::OiChange, Fam::Percent),
    ColumnSpec::numeric("volatility_5m", Cat::Volatility, Fam::Volatility),
    ColumnSpec::numeric("volatility_15m", Cat::Volatility, Fam::Volatility),
    ColumnSpec::numeric("volatility_1h", Cat::Volatility, Fam::Volatility),
    ColumnSpec::numeric("ticks_5m", Cat::Ticks, Fam::Ticks),
    ColumnSpec::numeric("ticks_15m", Cat::Ticks, Fam::Ticks),
    ColumnSpec::numeric("ticks_1h", Cat::Ticks, Fam::Ticks),
    ColumnSpec::numeric("vdelta_5m", Cat::Vdelta, Fam::Vdelta),
    ColumnSpec::numeric("vdelta_15m", Cat::Vdelta, Fam::Vdelta),
    ColumnSpec::numeric("vdelta_1h", Cat::Vdelta, Fam::Vdelta),
    ColumnSpec::numeric("vdelta_8h", Cat::Vdelta, Fam::Vdelta),
    ColumnSpec::numeric("vdelta_1d", Cat::Vdelta, Fam::Vdelta),
    ColumnSpec::numeric("volume_5m", Cat::Volume, Fam::Volume),
    ColumnSpec::numeric("volume_15m", Cat::Volume, Fam::Volume),
    ColumnSpec::numeric("volume_1h", Cat::Volume, Fam::Volume),
    ColumnSpec::numeric("volume_8h", Cat::Volume, Fam::Volume),
    ColumnSpec::numeric("volume_1d", Cat::Volume, Fam::Volume),
    ColumnSpec::numeric("funding_rate", Cat::Others, Fam::Funding),
    ColumnSpec::numeric("open_interest", Cat::Others, Fam::Volume),
    ColumnSpec::text("ts"),
];

/// 默认可见列
pub const DEFAULT_VISIBLE: [&str; 8] = [
    "symbol",
    "price",
    "change_15m",
    "volume_15m",
    "oi_change_15m",
    "funding_rate",
    "open_interest",
    "ts",
];

/// 按标识符查找列
pub fn column_spec(id: &str) -> Option<&'static ColumnSpec> {
    COLUMNS.iter().find(|c| c.id == id)
}

pub fn is_known_column(id: &str) -> bool {
    column_spec(id).is_some()
}

/// 某分类下的列（保持目录顺序）
pub fn columns_in(category: ColumnCategory) -> impl Iterator<Item = &'static ColumnSpec> {
    COLUMNS.iter().filter(move |c| c.category == category)
}

/// 参与增量着色的列
pub fn comparable_columns() -> impl Iterator<Item = &'static ColumnSpec> {
    COLUMNS.iter().filter(|c| c.comparable)
}

pub fn column_label(id: &str) -> String {
    id.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
