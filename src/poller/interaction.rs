use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// 用户交互防抖
///
/// 界面在指针按下、拖动、滚动或键盘输入时调用 `mark`,
/// 轮询任务在每次 tick 前检查 `is_quiet`。
#[derive(Debug, Clone)]
pub struct InteractionGate {
    quiet_period: Duration,
    last_input: Arc<Mutex<Option<Instant>>>,
}

impl InteractionGate {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            last_input: Arc::new(Mutex::new(None)),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn mark(&self) {
        self.mark_at(Instant::now());
    }

    pub fn mark_at(&self, at: Instant) {
        if let Ok(mut last) = self.last_input.lock() {
            *last = Some(at);
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.is_quiet_at(Instant::now())
    }

    pub fn is_quiet_at(&self, now: Instant) -> bool {
        match self.last_input.lock() {
            Ok(last) => match *last {
                Some(at) => now.saturating_duration_since(at) >= self.quiet_period,
                None => true,
            },
            // 锁中毒时不阻塞轮询
            Err(_) => true,
        }
    }
}
