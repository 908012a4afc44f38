/// 排序与查询参数
///
/// 排序是一次完整的"导航": 生成新的查询参数并重新加载, 客户端不做排序。

use std::fmt;
use std::str::FromStr;

use url::Url;

use super::columns::column_spec;

/// 市场类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarketType {
    #[default]
    Futures,
    Spot,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Futures => "futures",
            MarketType::Spot => "spot",
        }
    }
}

impl FromStr for MarketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "futures" => Ok(MarketType::Futures),
            "spot" => Ok(MarketType::Spot),
            other => Err(format!("unknown market type: {}", other)),
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// 表头排序标记
    pub fn arrow(&self) -> &'static str {
        match self {
            SortOrder::Asc => "▲",
            SortOrder::Desc => "▼",
        }
    }
}

/// 排序指令
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortInstruction {
    pub column: String,
    pub order: SortOrder,
}

impl SortInstruction {
    pub fn new(column: impl Into<String>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }

    /// 点击表头后的排序指令:
    /// 点击当前列则翻转方向, 点击其他列则从降序开始
    pub fn after_click(current: Option<&SortInstruction>, clicked: &str) -> SortInstruction {
        match current {
            Some(active) if active.column == clicked => SortInstruction::new(clicked, active.order.flipped()),
            _ => SortInstruction::new(clicked, SortOrder::Desc),
        }
    }
}

/// 当前视图的查询参数 (market_type + 排序 + 透传的过滤参数)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScreenerQuery {
    pub market_type: MarketType,
    pub sort: Option<SortInstruction>,
    /// 其他参数, 保持原始顺序
    filters: Vec<(String, String)>,
}

impl ScreenerQuery {
    pub fn new(market_type: MarketType) -> Self {
        Self {
            market_type,
            ..Default::default()
        }
    }

    /// 从查询字符串解析, 允许带或不带前导 '?'
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()));
        Self::from_pairs(pairs)
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())))
    }

    fn from_pairs(pairs: impl Iterator<Item = (String, String)>) -> Self {
        let mut query = ScreenerQuery::default();
        let mut sort_column: Option<String> = None;
        let mut order: Option<SortOrder> = None;

        for (key, value) in pairs {
            match key.as_str() {
                "market_type" => {
                    query.market_type = value.parse().unwrap_or_default();
                }
                "sort" => {
                    if !value.trim().is_empty() {
                        sort_column = Some(value);
                    }
                }
                "order" => order = SortOrder::parse(&value),
                _ => query.set_filter(&key, &value),
            }
        }

        query.sort = sort_column.map(|column| SortInstruction::new(column, order.unwrap_or_default()));
        query
    }

    /// 设置过滤参数; 空值表示移除
    pub fn set_filter(&mut self, key: &str, value: &str) {
        if matches!(key, "market_type" | "sort" | "order") {
            return;
        }
        let value = value.trim();
        if value.is_empty() {
            self.filters.retain(|(k, _)| k != key);
            return;
        }
        match self.filters.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.filters.push((key.to_string(), value.to_string())),
        }
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    /// 点击表头后的导航目标, 其他参数保持不变
    pub fn sorted_by(&self, column: &str) -> ScreenerQuery {
        let mut next = self.clone();
        if column_spec(column).map(|spec| spec.sortable()).unwrap_or(false) {
            next.sort = Some(SortInstruction::after_click(self.sort.as_ref(), column));
        }
        next
    }

    pub fn with_market_type(&self, market_type: MarketType) -> ScreenerQuery {
        let mut next = self.clone();
        next.market_type = market_type;
        next
    }

    /// 查询参数列表, 总是包含 market_type
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("market_type".to_string(), self.market_type.as_str().to_string())];
        pairs.extend(self.filters.iter().cloned());
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.column.clone()));
            pairs.push(("order".to_string(), sort.order.as_str().to_string()));
        }
        pairs
    }

    /// 编码后的查询字符串 (不含 '?')
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_pairs())
            .finish()
    }

    /// 列表接口地址
    pub fn list_url(&self, base: &Url, list_path: &str) -> Result<Url, url::ParseError> {
        let mut url = base.join(list_path)?;
        url.set_query(Some(&self.to_query_string()));
        Ok(url)
    }
}

impl fmt::Display for ScreenerQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.to_query_string())
    }
}

/// 单个交易对的详情接口地址
pub fn detail_url(base: &Url, symbol_path: &str, symbol: &str) -> Result<Url, url::ParseError> {
    let mut url = base.join(symbol_path)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push(symbol)
        .push("");
    Ok(url)
}
