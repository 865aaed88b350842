// ==========================================
// 关键耗材覆盖看板 - 引擎层
// ==========================================
// 职责: 纯计算（覆盖天数 / 维度汇总 / 序列 / KPI / 品目归类 / 导出）
// 红线: 引擎不访问存储
// ==========================================

pub mod classifier;
pub mod coverage;
pub mod dimension;
pub mod exporter;
pub mod kpi;
pub mod orchestrator;
pub mod series;

// 重导出核心引擎
pub use classifier::{normalize_product_name, CriticalItemClassifier, CRITICAL_ITEM_RULES};
pub use coverage::{coverage_days, sort_rows, CoverageCalculator, CoverageSummary};
pub use dimension::{DimensionAggregator, DimensionBreakdown, DimensionTotal};
pub use exporter::{CsvExporter, ExportError, ExportResult, CSV_HEADER};
pub use kpi::{compare_kpis, kpis_to_json, KpiDeriver, KpiMismatch};
pub use orchestrator::{DashboardOrchestrator, DashboardView};
pub use series::{ItemSeries, SeriesExtraction, SeriesExtractor, SeriesPoint};
