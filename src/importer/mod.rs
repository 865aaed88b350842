// ==========================================
// 关键耗材覆盖看板 - 导入层
// ==========================================
// 职责: 外部数据集读取、清洗，生成只读数据集容器
// 支持: JSON (本地目录)
// ==========================================

pub mod data_cleaner;
pub mod dataset_loader;
pub mod error;

// 重导出核心类型
pub use dataset_loader::{DatasetLoader, DatasetResource, DatasetSource, FsDatasetSource};
pub use error::{ImportError, ImportResult};
