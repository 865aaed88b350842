// ==========================================
// 关键耗材覆盖看板 - 配置层
// ==========================================
// 职责: 具名常量 + 可覆写的看板配置
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod error;
pub mod thresholds;

// 重导出核心配置
pub use config_manager::{config_keys, validate_config_entry, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use thresholds::{
    CoverageThresholds, DashboardConfig, CRIT_DAYS, DIMENSION_TOP_N, EXPORT_FILE_NAME,
    SELECT_ALL_ITEMS_DEFAULT, WARN_DAYS,
};
