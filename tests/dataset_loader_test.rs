// ==========================================
// 数据集加载集成测试
// ==========================================
// 测试范围:
// 1. 四个数据集并发加载，构建只读 DatasetStore
// 2. 任一数据集缺失 / 格式错误 → 单一错误且指明数据集
// 3. 自定义 DatasetSource（内存）
// ==========================================


use async_trait::async_trait;
use critical_supply_coverage::domain::types::Dimension;
use critical_supply_coverage::importer::dataset_loader::{
    DatasetLoader, DatasetResource, DatasetSource, FsDatasetSource,
};
use critical_supply_coverage::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;
use test_helpers::*;

// ==========================================
// 文件系统加载
// ==========================================

#[tokio::test]
async fn test_load_all_datasets() {
    let dir = create_dataset_dir().expect("无法创建数据集目录");
    let store = DatasetLoader::new(FsDatasetSource::new(dir.path()))
        .load()
        .await
        .expect("加载失败");

    assert_eq!(store.items().len(), 4);
    assert_eq!(store.kpis().len(), 4);
    assert_eq!(store.series().len(), 8);
    assert_eq!(
        store.period_bounds(),
        Some((date(2025, 1, 1), date(2025, 1, 5)))
    );

    // 数量字符串被强制转换
    let guantes: f64 = store
        .series()
        .iter()
        .filter(|r| r.item == "GUANTES NITRILO")
        .map(|r| r.quantity)
        .sum();
    assert_eq!(guantes, 9.0);

    // 维度集合按维度固定
    assert_eq!(store.dimension(Dimension::Warehouse).records.len(), 4);
    assert_eq!(store.dimension(Dimension::Service).records.len(), 3);
    assert_eq!(
        store.dimension(Dimension::Practitioner).dimension,
        Dimension::Practitioner
    );
}

#[tokio::test]
async fn test_unparsed_period_kept_without_date() {
    let dir = create_dataset_dir().expect("无法创建数据集目录");
    let store = DatasetLoader::new(FsDatasetSource::new(dir.path()))
        .load()
        .await
        .expect("加载失败");

    let unparsed: Vec<_> = store.series().iter().filter(|r| r.period.is_none()).collect();
    assert_eq!(unparsed.len(), 1);
    assert_eq!(unparsed[0].item, "ALGODON");
}

#[tokio::test]
async fn test_missing_dataset_names_resource() {
    let dir = create_dataset_dir().expect("无法创建数据集目录");
    std::fs::remove_file(dir.path().join("agg_dim.json")).unwrap();

    let err = DatasetLoader::new(FsDatasetSource::new(dir.path()))
        .load()
        .await
        .expect_err("缺少数据集时应失败");

    assert!(matches!(err, ImportError::DatasetLoad { .. }));
    assert_eq!(err.resource(), Some("agg_dim.json"));
}

#[tokio::test]
async fn test_malformed_dataset_names_resource() {
    let dir = create_dataset_dir().expect("无法创建数据集目录");
    write_dataset(dir.path(), "kpi.json", "{ not json").unwrap();

    let err = DatasetLoader::new(FsDatasetSource::new(dir.path()))
        .load()
        .await
        .expect_err("格式错误时应失败");

    assert!(matches!(err, ImportError::DatasetFormat { .. }));
    assert_eq!(err.resource(), Some("kpi.json"));
}

// ==========================================
// 自定义数据源
// ==========================================

struct MemorySource {
    files: HashMap<&'static str, String>,
}

#[async_trait]
impl DatasetSource for MemorySource {
    async fn fetch(&self, resource: DatasetResource) -> ImportResult<String> {
        self.files
            .get(resource.file_name())
            .cloned()
            .ok_or_else(|| ImportError::FileNotFound(resource.file_name().to_string()))
    }
}

fn memory_source() -> MemorySource {
    let mut files = HashMap::new();
    files.insert("items.json", ITEMS_JSON.to_string());
    files.insert("kpi.json", KPI_JSON.to_string());
    files.insert("series_day.json", SERIES_JSON.to_string());
    files.insert("agg_dim.json", AGG_DIM_JSON.to_string());
    MemorySource { files }
}

#[tokio::test]
async fn test_memory_source_loads() {
    let store = DatasetLoader::new(memory_source())
        .load()
        .await
        .expect("加载失败");
    assert_eq!(store.kpis().len(), 4);
}

#[tokio::test]
async fn test_memory_source_failure_is_wrapped() {
    let mut source = memory_source();
    source.files.remove("series_day.json");

    let err = DatasetLoader::new(source)
        .load()
        .await
        .expect_err("缺少数据集时应失败");

    assert_eq!(err.resource(), Some("series_day.json"));
    assert!(err.to_string().contains("series_day.json"));
}
