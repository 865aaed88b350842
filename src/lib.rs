// ==========================================
// 关键耗材覆盖看板 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 决策支持（库存覆盖天数 + 消耗分析），人工录入库存
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 库存覆盖层持久化
pub mod repository;

// 引擎层 - 纯计算
pub mod engine;

// 导入层 - 数据集加载
pub mod importer;

// 配置层 - 阈值与看板配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - 会话门面
pub mod api;

// 命令行定义
pub mod cli;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CoverageState, Dimension, SeriesFrequency};

// 领域实体
pub use domain::{
    ConsumptionRecord, CoverageRow, DatasetStore, DimensionCollection, DimensionRecord,
    FilterInput, FilterState, KpiRecord, StockOverlay,
};

// 引擎
pub use engine::{
    CoverageCalculator, CriticalItemClassifier, CsvExporter, DashboardOrchestrator, DashboardView,
    DimensionAggregator, KpiDeriver, SeriesExtractor,
};

// API
pub use api::{ApiError, ApiResult, CsvExport, DashboardApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "关键耗材覆盖看板";
