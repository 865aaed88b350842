// ==========================================
// 关键耗材覆盖看板 - 数据仓储层
// ==========================================
// 职责: 本地持久化（库存覆盖层）
// 说明: 配置读写见 config::ConfigManager
// ==========================================

pub mod error;
pub mod stock_overlay_repo;

// 重导出核心类型
pub use error::{RepositoryError, RepositoryResult};
pub use stock_overlay_repo::{
    InMemoryStockOverlayStore, SqliteStockOverlayRepository, StockOverlayStore,
    STOCK_OVERLAY_KEY,
};
