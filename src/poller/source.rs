/// 数据源
///
/// `ScreenerSource` 抽象了两个 HTTP 接口, 测试中使用内存实现。

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::error::{PollError, PollResult};
use crate::config::ApiConfig;
use crate::screener::{detail_url, parse_rows, ScreenerQuery, ScreenerRow, SymbolDetail};

#[async_trait]
pub trait ScreenerSource: Send + Sync {
    /// 按查询参数获取行列表
    async fn fetch_rows(&self, query: &ScreenerQuery) -> PollResult<Vec<ScreenerRow>>;

    /// 获取单个交易对的最新值和历史快照
    async fn fetch_symbol(&self, symbol: &str) -> PollResult<SymbolDetail>;
}

/// 基于 reqwest 的 HTTP 数据源
pub struct HttpScreenerSource {
    client: reqwest::Client,
    base_url: Url,
    list_path: String,
    symbol_path: String,
}

impl HttpScreenerSource {
    pub fn new(base_url: Url, list_path: impl Into<String>, symbol_path: impl Into<String>, timeout: Duration) -> PollResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            list_path: list_path.into(),
            symbol_path: symbol_path.into(),
        })
    }

    pub fn from_config(api: &ApiConfig) -> PollResult<Self> {
        let base_url = Url::parse(&api.base_url)?;
        Self::new(
            base_url,
            api.list_path.clone(),
            api.symbol_path.clone(),
            Duration::from_millis(api.request_timeout_ms),
        )
    }

    pub fn list_url(&self, query: &ScreenerQuery) -> PollResult<Url> {
        Ok(query.list_url(&self.base_url, &self.list_path)?)
    }

    pub fn symbol_url(&self, symbol: &str) -> PollResult<Url> {
        Ok(detail_url(&self.base_url, &self.symbol_path, symbol)?)
    }

    async fn get_json(&self, url: Url) -> PollResult<Value> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(PollError::from_body)
    }
}

#[async_trait]
impl ScreenerSource for HttpScreenerSource {
    async fn fetch_rows(&self, query: &ScreenerQuery) -> PollResult<Vec<ScreenerRow>> {
        let url = self.list_url(query)?;
        let body = self.get_json(url).await?;
        Ok(parse_rows(&body)?)
    }

    async fn fetch_symbol(&self, symbol: &str) -> PollResult<SymbolDetail> {
        let url = self.symbol_url(symbol)?;
        let body = self.get_json(url).await?;
        Ok(SymbolDetail::from_json(&body, symbol)?)
    }
}
