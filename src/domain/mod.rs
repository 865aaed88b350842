// ==========================================
// 关键耗材覆盖看板 - 领域层
// ==========================================
// 职责: 实体、值对象与枚举类型
// ==========================================

pub mod dataset;
pub mod filter;
pub mod overlay;
pub mod records;
pub mod types;

// 重导出核心类型
pub use dataset::DatasetStore;
pub use filter::{FilterInput, FilterState};
pub use overlay::{coerce_stock_input, coerce_stock_quantity, StockOverlay};
pub use records::{ConsumptionRecord, CoverageRow, DimensionCollection, DimensionRecord, KpiRecord};
pub use types::{CoverageState, Dimension, SeriesFrequency};
