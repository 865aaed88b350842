// ==========================================
// 关键耗材覆盖看板 - API 层错误类型
// ==========================================
// 职责: 汇聚导入 / 仓储 / 配置 / 导出错误，提供面向用户的本地化消息
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::exporter::ExportError;
use crate::i18n::t_with_args;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 数据集错误（初始化阶段，致命）
    // ==========================================
    #[error("数据集加载失败 ({resource}): {message}")]
    DatasetLoad { resource: String, message: String },

    #[error("数据集格式错误 ({resource}): {message}")]
    DatasetFormat { resource: String, message: String },

    // ==========================================
    // 业务错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 本地化后的用户消息
    pub fn user_message(&self) -> String {
        match self {
            ApiError::DatasetLoad { resource, message } => t_with_args(
                "dataset.load_failed",
                &[("resource", resource), ("message", message)],
            ),
            ApiError::DatasetFormat { resource, message } => t_with_args(
                "dataset.format_error",
                &[("resource", resource), ("message", message)],
            ),
            other => other.to_string(),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::DatasetLoad { resource, message } => {
                ApiError::DatasetLoad { resource, message }
            }
            ImportError::DatasetFormat { resource, message } => {
                ApiError::DatasetFormat { resource, message }
            }
            ImportError::FileNotFound(path) => ApiError::DatasetLoad {
                resource: path.clone(),
                message: format!("文件不存在: {}", path),
            },
            ImportError::FileReadError(msg) => ApiError::InternalError(msg),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Repository(inner) => inner.into(),
            other => ApiError::ConfigError(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
