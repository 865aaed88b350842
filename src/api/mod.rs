// ==========================================
// 关键耗材覆盖看板 - API 层
// ==========================================
// 职责: 会话门面，供 CLI / 前端调用
// ==========================================

pub mod dashboard_api;
pub mod error;

// 重导出核心类型
pub use dashboard_api::{CsvExport, DashboardApi};
pub use error::{ApiError, ApiResult};
