use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 单调递增的请求序号
///
/// 每次发出请求前取号。响应的序号必须大于已应用 (或已作废) 的最高序号才会被接受,
/// 因此慢响应只要没有被更新的响应抢先, 仍然会被应用。
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    issued: Arc<AtomicU64>,
    /// 已应用或已作废的最高序号
    floor: Arc<AtomicU64>,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 发出新请求, 返回它的序号 (从 1 开始)
    pub fn next(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// 作废所有在途请求: 下限提升到一个新取的序号
    pub fn invalidate(&self) -> u64 {
        let seq = self.next();
        self.floor.fetch_max(seq, Ordering::AcqRel);
        seq
    }

    pub fn latest(&self) -> u64 {
        self.issued.load(Ordering::Acquire)
    }

    pub fn floor(&self) -> u64 {
        self.floor.load(Ordering::Acquire)
    }

    /// 序号是否比已应用的响应更新
    pub fn is_newer(&self, seq: u64) -> bool {
        seq > self.floor()
    }

    /// 接受一个响应; 成功时把下限提升到该序号
    pub fn accept(&self, seq: u64) -> bool {
        self.floor.fetch_max(seq, Ordering::AcqRel) < seq
    }
}
