// ==========================================
// 关键耗材覆盖看板 - 引擎编排器
// ==========================================
// 用途: 任一输入变化后整体重算看板视图
// 流程: 序列提取 → 三个维度汇总 → 覆盖天数 → 状态计数
// 红线: 相同输入必须得到相同视图（幂等）
// ==========================================

use crate::config::thresholds::DashboardConfig;
use crate::domain::dataset::DatasetStore;
use crate::domain::filter::FilterState;
use crate::domain::overlay::StockOverlay;
use crate::domain::records::{CoverageRow, KpiRecord};
use crate::domain::types::{Dimension, SeriesFrequency};
use crate::engine::coverage::{CoverageCalculator, CoverageSummary};
use crate::engine::dimension::{DimensionAggregator, DimensionBreakdown};
use crate::engine::series::{ItemSeries, SeriesExtractor};
use crate::perf::PerfGuard;
use serde::Serialize;
use tracing::{debug, info};

// ==========================================
// DashboardView - 看板视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    // 序列输出
    pub frequency: SeriesFrequency,
    pub total_quantity: f64,
    pub series: Vec<ItemSeries>,

    // 维度输出
    pub warehouses: DimensionBreakdown,
    pub services: DimensionBreakdown,
    pub practitioners: DimensionBreakdown,

    // 覆盖天数输出
    pub rows: Vec<CoverageRow>,
    pub summary: CoverageSummary,
}

// ==========================================
// DashboardOrchestrator - 引擎编排器
// ==========================================
pub struct DashboardOrchestrator {
    calculator: CoverageCalculator,
    aggregator: DimensionAggregator,
    frequency: SeriesFrequency,
}

impl DashboardOrchestrator {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            calculator: CoverageCalculator::new(config.thresholds),
            aggregator: DimensionAggregator::new(config.dimension_top_n),
            frequency: config.series_frequency,
        }
    }

    /// 执行完整重算
    ///
    /// # 参数
    /// - store: 只读数据集
    /// - filter: 生效中的筛选状态
    /// - overlay: 库存覆盖层快照
    pub fn recompute(
        &self,
        store: &DatasetStore,
        filter: &FilterState,
        overlay: &StockOverlay,
    ) -> DashboardView {
        let _perf = PerfGuard::new("dashboard.recompute");

        // ==========================================
        // 步骤1: 时间序列
        // ==========================================
        let extraction = SeriesExtractor::extract_with(store.series(), filter, self.frequency);
        debug!(
            frequency = %self.frequency,
            series_count = extraction.series.len(),
            total_quantity = extraction.total_quantity,
            "步骤1: 序列提取完成"
        );

        // ==========================================
        // 步骤2: 维度汇总（不受日期区间影响）
        // ==========================================
        let warehouses = self.aggregator.aggregate(
            store.dimension(Dimension::Warehouse),
            &filter.items,
            Some(&filter.warehouses),
        );
        let services = self.aggregator.aggregate(
            store.dimension(Dimension::Service),
            &filter.items,
            Some(&filter.services),
        );
        let practitioners =
            self.aggregator
                .aggregate(store.dimension(Dimension::Practitioner), &filter.items, None);
        debug!(
            warehouses = warehouses.totals.len(),
            services = services.totals.len(),
            practitioners = practitioners.totals.len(),
            "步骤2: 维度汇总完成"
        );

        // ==========================================
        // 步骤3: 覆盖天数
        // ==========================================
        let kpis: Vec<KpiRecord> = store
            .kpis()
            .iter()
            .filter(|k| filter.allows_item(&k.item))
            .cloned()
            .collect();
        let rows = self.calculator.calculate(&kpis, overlay);
        let summary = CoverageSummary::from_rows(&rows);

        info!(
            rows = rows.len(),
            critical = summary.critical,
            warning = summary.warning,
            ok = summary.ok,
            "看板重算完成"
        );

        DashboardView {
            frequency: self.frequency,
            total_quantity: extraction.total_quantity,
            series: extraction.series,
            warehouses,
            services,
            practitioners,
            rows,
            summary,
        }
    }
}
