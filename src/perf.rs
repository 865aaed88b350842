// ==========================================
// 关键耗材覆盖看板 - 性能统计
// ==========================================
// 输出: target = "perf"，字段 op / elapsed_ms / depth
// 开关: CRITICAL_SUPPLY_SLOW_MS 配置慢操作告警阈值（毫秒）
// ==========================================

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;
use std::time::Instant;

pub const SLOW_OP_ENV: &str = "CRITICAL_SUPPLY_SLOW_MS";

static SLOW_OP_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);
static SLOW_OP_INIT: Once = Once::new();

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
}

fn slow_threshold_ms() -> u64 {
    SLOW_OP_INIT.call_once(|| {
        let ms = std::env::var(SLOW_OP_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
        SLOW_OP_THRESHOLD_MS.store(ms, Ordering::Relaxed);
    });
    SLOW_OP_THRESHOLD_MS.load(Ordering::Relaxed)
}

/// 性能统计 Guard：drop 时记录 elapsed_ms，超阈值时额外告警
///
/// 使用方式：
/// ```ignore
/// let _perf = critical_supply_coverage::perf::PerfGuard::new("dashboard.recompute");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    depth: u32,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        let depth = PERF_DEPTH.with(|d| {
            let next = d.get().saturating_add(1);
            d.set(next);
            next
        });
        Self {
            op,
            start: Instant::now(),
            depth,
        }
    }

    pub fn op(&self) -> &'static str {
        self.op
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            depth = self.depth,
            "done"
        );

        let threshold = slow_threshold_ms();
        if threshold > 0 && elapsed_ms >= threshold {
            tracing::warn!(target: "perf", op = self.op, elapsed_ms, "slow op");
        }

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// 当前线程上活跃的 PerfGuard 数量
pub fn current_depth() -> u32 {
    PERF_DEPTH.with(|d| d.get())
}
