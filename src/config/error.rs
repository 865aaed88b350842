// ==========================================
// 关键耗材覆盖看板 - 配置层错误类型
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("未知配置项: {0}")]
    UnknownKey(String),

    #[error("配置值非法: {key}={value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
