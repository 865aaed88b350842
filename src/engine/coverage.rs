// ==========================================
// 关键耗材覆盖看板 - 覆盖天数引擎
// ==========================================
// 职责: KPI 行 + 库存覆盖层 → 覆盖天数、三级状态、展示排序
// 输入: 已按品目选择集过滤的 KPI 行、库存快照、分级阈值
// 输出: 排序后的 CoverageRow 列表
// ==========================================
// 红线: 纯函数，无副作用，不报错；数值异常一律按 0 处理
// ==========================================

use crate::config::thresholds::CoverageThresholds;
use crate::domain::overlay::StockOverlay;
use crate::domain::records::{CoverageRow, KpiRecord};
use crate::domain::types::CoverageState;
use crate::importer::data_cleaner::clamp_quantity;
use serde::Serialize;
use std::cmp::Ordering;

// ==========================================
// CoverageCalculator - 覆盖天数引擎
// ==========================================
pub struct CoverageCalculator {
    thresholds: CoverageThresholds,
}

impl Default for CoverageCalculator {
    fn default() -> Self {
        Self::new(CoverageThresholds::default())
    }
}

impl CoverageCalculator {
    pub fn new(thresholds: CoverageThresholds) -> Self {
        Self { thresholds }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算并排序覆盖行
    pub fn calculate(&self, kpis: &[KpiRecord], overlay: &StockOverlay) -> Vec<CoverageRow> {
        let rows = kpis.iter().map(|kpi| self.build_row(kpi, overlay)).collect();
        sort_rows(rows)
    }

    /// 单行计算
    pub fn build_row(&self, kpi: &KpiRecord, overlay: &StockOverlay) -> CoverageRow {
        let stock = overlay.stock_of(&kpi.item);
        let avg_daily_30d = clamp_quantity(kpi.avg_daily_30d);
        let coverage_days = coverage_days(stock, avg_daily_30d);

        CoverageRow {
            item: kpi.item.clone(),
            total_quantity: clamp_quantity(kpi.total_quantity),
            quantity_7d: clamp_quantity(kpi.quantity_7d),
            quantity_30d: clamp_quantity(kpi.quantity_30d),
            avg_daily_30d,
            stock,
            coverage_days,
            state: self.classify_row(coverage_days, avg_daily_30d),
        }
    }

    /// 行级分级: 30 日无消耗（日均 = 0）视为无风险 → OK，否则按覆盖天数分级
    pub fn classify_row(&self, coverage_days: f64, avg_daily_30d: f64) -> CoverageState {
        if avg_daily_30d <= 0.0 {
            CoverageState::Ok
        } else {
            self.classify(coverage_days)
        }
    }

    /// 状态分级（按顺序，首个命中即返回）
    ///
    /// 1) 非有限（无穷） → OK
    /// 2) < crit_days → CRITICAL
    /// 3) < warn_days → WARNING
    /// 4) 其余 → OK
    pub fn classify(&self, coverage_days: f64) -> CoverageState {
        if !coverage_days.is_finite() {
            CoverageState::Ok
        } else if coverage_days < self.thresholds.crit_days {
            CoverageState::Critical
        } else if coverage_days < self.thresholds.warn_days {
            CoverageState::Warning
        } else {
            CoverageState::Ok
        }
    }
}

/// 覆盖天数
///
/// - 日均 > 0: 库存 / 日均
/// - 日均 = 0 且有库存: 正无穷
/// - 其余: 0
pub fn coverage_days(stock: u64, avg_daily_30d: f64) -> f64 {
    if avg_daily_30d > 0.0 {
        stock as f64 / avg_daily_30d
    } else if stock > 0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// 展示排序: 状态 rank 升序，同级覆盖天数降序（无穷在前），其余保持原顺序
pub fn sort_rows(mut rows: Vec<CoverageRow>) -> Vec<CoverageRow> {
    rows.sort_by(compare_rows);
    rows
}

fn compare_rows(a: &CoverageRow, b: &CoverageRow) -> Ordering {
    a.state
        .rank()
        .cmp(&b.state.rank())
        .then_with(|| b.coverage_days.total_cmp(&a.coverage_days))
}

// ==========================================
// CoverageSummary - 状态计数（看板卡片）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageSummary {
    pub critical: usize,
    pub warning: usize,
    pub ok: usize,
}

impl CoverageSummary {
    pub fn from_rows(rows: &[CoverageRow]) -> Self {
        rows.iter().fold(Self::default(), |mut acc, row| {
            match row.state {
                CoverageState::Critical => acc.critical += 1,
                CoverageState::Warning => acc.warning += 1,
                CoverageState::Ok => acc.ok += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.critical + self.warning + self.ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kpi(item: &str, avg: f64) -> KpiRecord {
        KpiRecord {
            item: item.to_string(),
            total_quantity: 100.0,
            quantity_7d: 10.0,
            quantity_30d: avg * 30.0,
            avg_daily_30d: avg,
        }
    }

    fn row(item: &str, days: f64, state: CoverageState) -> CoverageRow {
        CoverageRow {
            item: item.to_string(),
            total_quantity: 0.0,
            quantity_7d: 0.0,
            quantity_30d: 0.0,
            avg_daily_30d: 0.0,
            stock: 0,
            coverage_days: days,
            state,
        }
    }

    #[test]
    fn test_coverage_days_branches() {
        assert_eq!(coverage_days(30, 3.0), 10.0);
        assert_eq!(coverage_days(5, 0.0), f64::INFINITY);
        assert_eq!(coverage_days(0, 0.0), 0.0);
        assert_eq!(coverage_days(0, 2.0), 0.0);
    }

    #[test]
    fn test_classify_thresholds() {
        let calc = CoverageCalculator::default();
        assert_eq!(calc.classify(6.9), CoverageState::Critical);
        assert_eq!(calc.classify(7.0), CoverageState::Warning);
        assert_eq!(calc.classify(13.9), CoverageState::Warning);
        assert_eq!(calc.classify(14.0), CoverageState::Ok);
        assert_eq!(calc.classify(f64::INFINITY), CoverageState::Ok);
        assert_eq!(calc.classify(0.0), CoverageState::Critical);
    }

    #[test]
    fn test_classify_custom_thresholds() {
        let calc = CoverageCalculator::new(CoverageThresholds {
            crit_days: 3.0,
            warn_days: 5.0,
        });
        assert_eq!(calc.classify(4.0), CoverageState::Warning);
        assert_eq!(calc.classify(6.9), CoverageState::Ok);
    }

    #[test]
    fn test_build_row_uses_overlay() {
        let calc = CoverageCalculator::default();
        let mut overlay = StockOverlay::new();
        overlay.set("ALCOHOL", 35.0);

        let with_stock = calc.build_row(&kpi("ALCOHOL", 5.0), &overlay);
        assert_eq!(with_stock.stock, 35);
        assert_eq!(with_stock.coverage_days, 7.0);
        assert_eq!(with_stock.state, CoverageState::Warning);

        let without_stock = calc.build_row(&kpi("GUANTES", 5.0), &overlay);
        assert_eq!(without_stock.stock, 0);
        assert_eq!(without_stock.coverage_days, 0.0);
        assert_eq!(without_stock.state, CoverageState::Critical);
    }

    #[test]
    fn test_zero_average_zero_stock_is_ok() {
        let calc = CoverageCalculator::default();
        let row = calc.build_row(&kpi("ALGODON", 0.0), &StockOverlay::new());
        assert_eq!(row.coverage_days, 0.0);
        assert_eq!(row.state, CoverageState::Ok);
    }

    #[test]
    fn test_zero_average_with_stock_is_infinite_ok() {
        let calc = CoverageCalculator::default();
        let mut overlay = StockOverlay::new();
        overlay.set("ALGODON", 4.0);
        let row = calc.build_row(&kpi("ALGODON", 0.0), &overlay);
        assert!(row.coverage_days.is_infinite());
        assert_eq!(row.state, CoverageState::Ok);
    }

    #[test]
    fn test_sort_groups_by_state_then_days_desc() {
        let rows = vec![
            row("A", 20.0, CoverageState::Ok),
            row("B", 1.0, CoverageState::Critical),
            row("C", 10.0, CoverageState::Warning),
            row("D", 5.0, CoverageState::Critical),
            row("E", f64::INFINITY, CoverageState::Ok),
        ];
        let sorted = sort_rows(rows);
        let order: Vec<&str> = sorted.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(order, vec!["D", "B", "C", "E", "A"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let rows = vec![
            row("X", 3.0, CoverageState::Critical),
            row("Y", 3.0, CoverageState::Critical),
        ];
        let sorted = sort_rows(rows);
        assert_eq!(sorted[0].item, "X");
        assert_eq!(sorted[1].item, "Y");
    }

    #[test]
    fn test_summary_counts() {
        let rows = vec![
            row("A", 1.0, CoverageState::Critical),
            row("B", 8.0, CoverageState::Warning),
            row("C", 30.0, CoverageState::Ok),
            row("D", 2.0, CoverageState::Critical),
        ];
        let summary = CoverageSummary::from_rows(&rows);
        assert_eq!(summary.critical, 2);
        assert_eq!(summary.warning, 1);
        assert_eq!(summary.ok, 1);
        assert_eq!(summary.total(), 4);
    }
}
