// ==========================================
// 关键耗材覆盖看板 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 规则: 任一数据集加载失败即终止初始化，错误中必须指明数据集
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 数据集错误 =====
    #[error("数据集加载失败 ({resource}): {message}")]
    DatasetLoad { resource: String, message: String },

    #[error("数据集格式错误 ({resource}): {message}")]
    DatasetFormat { resource: String, message: String },

    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),
}

impl ImportError {
    /// 出错的数据集名称（若可识别）
    pub fn resource(&self) -> Option<&str> {
        match self {
            ImportError::DatasetLoad { resource, .. }
            | ImportError::DatasetFormat { resource, .. } => Some(resource.as_str()),
            _ => None,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
