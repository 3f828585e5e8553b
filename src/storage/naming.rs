use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;

/// 生成落盘文件名（不含扩展名）。
///
/// 只需在一次转换内无冲突；不基于内容哈希。
pub trait NameGenerator {
    fn next_name(&self) -> String;
}

impl<F> NameGenerator for F
where
    F: Fn() -> String,
{
    fn next_name(&self) -> String {
        self()
    }
}

/// 默认实现：`<prefix>_<本地时间到微秒>_<序号>`。
///
/// 序号单调递增，同一微秒内生成多个名字也不会冲突。
#[derive(Debug, Default)]
pub struct TimestampNameGenerator {
    prefix: String,
    sequence: AtomicU64,
}

impl TimestampNameGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sequence: AtomicU64::new(0),
        }
    }
}

impl NameGenerator for TimestampNameGenerator {
    fn next_name(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let timestamp = Local::now().format("%Y%m%d%H%M%S%f");
        if self.prefix.is_empty() {
            format!("{}_{:04}", timestamp, seq)
        } else {
            format!("{}_{}_{:04}", self.prefix, timestamp, seq)
        }
    }
}
