/// 定时轮询
///
/// 两个独立的定时任务: 列表轮询 (短间隔) 和详情轮询 (长间隔, 仅在详情打开时运行)。
/// 每次 tick 取一个新序号并发起请求, 请求不等待、不取消, 允许重叠;
/// 结果通过无界通道送回界面线程, 由控制器按序号过滤过期响应。

pub mod error;
pub mod interaction;
pub mod sequence;
pub mod source;

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub use error::{PollError, PollResult};
pub use interaction::InteractionGate;
pub use sequence::RequestSequence;
pub use source::{HttpScreenerSource, ScreenerSource};

use crate::config::PollerConfig;
use crate::screener::{ScreenerQuery, ScreenerRow, SymbolDetail};

/// 轮询结果消息
#[derive(Debug, Clone)]
pub enum PollUpdate {
    /// 列表响应
    Rows { seq: u64, rows: Vec<ScreenerRow> },
    /// 详情响应
    Detail { seq: u64, symbol: String, detail: SymbolDetail },
}

impl PollUpdate {
    pub fn seq(&self) -> u64 {
        match self {
            PollUpdate::Rows { seq, .. } | PollUpdate::Detail { seq, .. } => *seq,
        }
    }
}

/// 轮询任务句柄, 停止或丢弃时中止定时任务
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// 轮询器
#[derive(Clone)]
pub struct Poller {
    source: Arc<dyn ScreenerSource>,
    list_sequence: RequestSequence,
    detail_sequence: RequestSequence,
    gate: InteractionGate,
    list_interval: Duration,
    detail_interval: Duration,
    updates: mpsc::UnboundedSender<PollUpdate>,
}

impl Poller {
    pub fn new(source: Arc<dyn ScreenerSource>, config: &PollerConfig) -> (Self, mpsc::UnboundedReceiver<PollUpdate>) {
        Self::with_intervals(
            source,
            Duration::from_millis(config.list_interval_ms),
            Duration::from_millis(config.detail_interval_ms),
            Duration::from_millis(config.interaction_quiet_ms),
        )
    }

    pub fn with_intervals(
        source: Arc<dyn ScreenerSource>,
        list_interval: Duration,
        detail_interval: Duration,
        quiet_period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<PollUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        let poller = Self {
            source,
            list_sequence: RequestSequence::new(),
            detail_sequence: RequestSequence::new(),
            gate: InteractionGate::new(quiet_period),
            list_interval,
            detail_interval,
            updates,
        };
        (poller, receiver)
    }

    pub fn list_sequence(&self) -> &RequestSequence {
        &self.list_sequence
    }

    pub fn detail_sequence(&self) -> &RequestSequence {
        &self.detail_sequence
    }

    pub fn gate(&self) -> &InteractionGate {
        &self.gate
    }

    /// 启动列表轮询; 第一次 tick 立即执行且不受交互防抖影响
    pub fn spawn_list(&self, runtime: &Handle, query: ScreenerQuery) -> PollerHandle {
        let poller = self.clone();
        let task = runtime.spawn(async move {
            log::info!("列表轮询启动: {}", query);
            poller
                .run_ticks(poller.list_interval, |poller| {
                    poller.issue_list(query.clone());
                })
                .await;
            log::info!("列表轮询结束");
        });
        PollerHandle { task }
    }

    /// 启动单个交易对的详情轮询
    pub fn spawn_detail(&self, runtime: &Handle, symbol: String) -> PollerHandle {
        let poller = self.clone();
        let task = runtime.spawn(async move {
            log::info!("详情轮询启动: {}", symbol);
            poller
                .run_ticks(poller.detail_interval, |poller| {
                    poller.issue_detail(symbol.clone());
                })
                .await;
            log::info!("详情轮询结束: {}", symbol);
        });
        PollerHandle { task }
    }

    async fn run_ticks<F>(&self, period: Duration, mut issue: F)
    where
        F: FnMut(&Poller),
    {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut first = true;

        loop {
            ticker.tick().await;
            if self.updates.is_closed() {
                break;
            }
            if !first && !self.gate.is_quiet() {
                log::trace!("用户交互中, 跳过本次轮询");
                continue;
            }
            first = false;
            issue(self);
        }
    }

    /// 发起一次列表请求, 返回其序号
    pub fn issue_list(&self, query: ScreenerQuery) -> u64 {
        let seq = self.list_sequence.next();
        let source = self.source.clone();
        let updates = self.updates.clone();

        tokio::spawn(async move {
            match source.fetch_rows(&query).await {
                Ok(rows) => {
                    log::debug!("列表响应 #{}: {} 行", seq, rows.len());
                    let _ = updates.send(PollUpdate::Rows { seq, rows });
                }
                Err(e) => log::warn!("列表请求 #{} 失败: {}", seq, e),
            }
        });
        seq
    }

    /// 发起一次详情请求, 返回其序号
    pub fn issue_detail(&self, symbol: String) -> u64 {
        let seq = self.detail_sequence.next();
        let source = self.source.clone();
        let updates = self.updates.clone();

        tokio::spawn(async move {
            match source.fetch_symbol(&symbol).await {
                Ok(detail) => {
                    log::debug!("详情响应 #{}: {} 个快照", seq, detail.snapshots.len());
                    let _ = updates.send(PollUpdate::Detail { seq, symbol, detail });
                }
                Err(e) => log::warn!("详情请求 #{} ({}) 失败: {}", seq, symbol, e),
            }
        });
        seq
    }
}
