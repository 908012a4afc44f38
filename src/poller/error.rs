use thiserror::Error;

use crate::screener::RowError;

/// 轮询错误; 控制器只记录日志, 保留上一次的表格
#[derive(Debug, Error)]
pub enum PollError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl PollError {
    /// 读取响应体的错误: 解码失败归为 Decode, 其余保持 Http
    pub fn from_body(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PollError::Decode(e.to_string())
        } else {
            PollError::Http(e)
        }
    }
}

impl From<RowError> for PollError {
    fn from(e: RowError) -> Self {
        PollError::Decode(e.to_string())
    }
}

pub type PollResult<T> = Result<T, PollError>;
