/// 列可见性偏好

use std::collections::BTreeSet;

use super::columns::{is_known_column, DEFAULT_VISIBLE};
use super::store::{PreferenceStore, StoreResult, VISIBLE_COLUMNS_KEY};

/// 用户希望显示的列集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnVisibility {
    visible: BTreeSet<String>,
}

impl Default for ColumnVisibility {
    fn default() -> Self {
        Self {
            visible: DEFAULT_VISIBLE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ColumnVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, column: &str) -> bool {
        self.visible.contains(column)
    }

    pub fn set_visible(&mut self, column: &str, visible: bool) {
        if !is_known_column(column) {
            return;
        }
        if visible {
            self.visible.insert(column.to_string());
        } else {
            self.visible.remove(column);
        }
    }

    /// 切换一列, 返回切换后的状态
    pub fn toggle(&mut self, column: &str) -> bool {
        let visible = !self.is_visible(column);
        self.set_visible(column, visible);
        self.is_visible(column)
    }

    /// 恢复默认列
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.visible.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// 序列化为 JSON 字符串数组
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.visible).unwrap_or_else(|_| "[]".to_string())
    }

    /// 解析持久化数据; 格式错误时回退到默认集合, 未知列被忽略
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Array(items)) => Self {
                visible: items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .filter(|column| is_known_column(column))
                    .map(str::to_string)
                    .collect(),
            },
            Ok(_) => {
                log::warn!("可见列偏好不是数组, 使用默认列");
                Self::default()
            }
            Err(e) => {
                log::warn!("可见列偏好解析失败, 使用默认列: {}", e);
                Self::default()
            }
        }
    }

    /// 从存储加载
    pub fn load(store: &dyn PreferenceStore) -> Self {
        match store.get(VISIBLE_COLUMNS_KEY) {
            Some(raw) => Self::from_json(&raw),
            None => Self::default(),
        }
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> StoreResult<()> {
        store.set(VISIBLE_COLUMNS_KEY, &self.to_json())
    }
}
