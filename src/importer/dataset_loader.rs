// ==========================================
// 关键耗材覆盖看板 - 数据集加载器
// ==========================================
// 数据集 (启动时加载一次):
// - items.json       品目清单
// - kpi.json         单品滚动指标
// - series_day.json  日消耗序列
// - agg_dim.json     仓库 / 科室 / 医生 三个维度汇总
// ==========================================
// 规则: 四个数据集并发获取，任一失败即终止并指明数据集
// ==========================================

use crate::domain::dataset::DatasetStore;
use crate::domain::records::{
    ConsumptionRecord, DimensionCollection, DimensionRecord, KpiRecord,
};
use crate::domain::types::Dimension;
use crate::importer::data_cleaner::{clean_item, clean_key, coerce_quantity, parse_period};
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

// ==========================================
// DatasetResource - 数据集标识
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetResource {
    Items,
    Kpi,
    SeriesDay,
    AggDim,
}

impl DatasetResource {
    pub fn file_name(&self) -> &'static str {
        match self {
            DatasetResource::Items => "items.json",
            DatasetResource::Kpi => "kpi.json",
            DatasetResource::SeriesDay => "series_day.json",
            DatasetResource::AggDim => "agg_dim.json",
        }
    }
}

impl fmt::Display for DatasetResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

// ==========================================
// DatasetSource - 数据集来源
// ==========================================
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// 获取单个数据集的原始 JSON 文本
    async fn fetch(&self, resource: DatasetResource) -> ImportResult<String>;
}

/// 本地目录数据源（目录内按文件名存放四个数据集）
pub struct FsDatasetSource {
    base_dir: PathBuf,
}

impl FsDatasetSource {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DatasetSource for FsDatasetSource {
    async fn fetch(&self, resource: DatasetResource) -> ImportResult<String> {
        let path = self.base_dir.join(resource.file_name());
        tracing::debug!(path = %path.display(), "读取数据集");

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ImportError::FileNotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ==========================================
// DatasetLoader - 数据集加载器
// ==========================================
pub struct DatasetLoader<S: DatasetSource> {
    source: S,
}

impl<S: DatasetSource> DatasetLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// 并发加载四个数据集
    ///
    /// # 返回
    /// - Ok(DatasetStore): 只读数据集容器
    /// - Err(ImportError::DatasetLoad / DatasetFormat): 首个失败的数据集
    pub async fn load(&self) -> ImportResult<DatasetStore> {
        let (items_raw, kpi_raw, series_raw, dims_raw) = futures::try_join!(
            self.fetch_resource(DatasetResource::Items),
            self.fetch_resource(DatasetResource::Kpi),
            self.fetch_resource(DatasetResource::SeriesDay),
            self.fetch_resource(DatasetResource::AggDim),
        )?;

        let items = parse_items(&items_raw)?;
        let kpis = parse_kpis(&kpi_raw)?;
        let series = parse_series(&series_raw)?;
        let (warehouses, services, practitioners) = parse_dimensions(&dims_raw)?;

        tracing::info!(
            items = items.len(),
            kpis = kpis.len(),
            series = series.len(),
            warehouses = warehouses.records.len(),
            services = services.records.len(),
            practitioners = practitioners.records.len(),
            "数据集加载完成"
        );

        Ok(DatasetStore::new(
            items,
            kpis,
            series,
            warehouses,
            services,
            practitioners,
        ))
    }

    async fn fetch_resource(&self, resource: DatasetResource) -> ImportResult<String> {
        self.source.fetch(resource).await.map_err(|e| {
            tracing::error!(resource = %resource, error = %e, "数据集获取失败");
            match e {
                ImportError::DatasetLoad { .. } | ImportError::DatasetFormat { .. } => e,
                other => ImportError::DatasetLoad {
                    resource: resource.file_name().to_string(),
                    message: other.to_string(),
                },
            }
        })
    }
}

// ==========================================
// 原始记录结构（字段名与源 JSON 一致）
// ==========================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawItemEntry {
    Row {
        #[serde(rename = "ITEM_CRITICO")]
        item: Value,
    },
    Plain(Value),
}

#[derive(Debug, Deserialize)]
struct RawKpiRow {
    #[serde(rename = "ITEM_CRITICO", default)]
    item: Value,
    #[serde(rename = "Q_TOTAL", default)]
    total: Value,
    #[serde(rename = "Q_7D", default)]
    q7d: Value,
    #[serde(rename = "Q_30D", default)]
    q30d: Value,
    #[serde(rename = "AVG_DAILY_30D", default)]
    avg_daily_30d: Value,
}

#[derive(Debug, Deserialize)]
struct RawSeriesRow {
    #[serde(rename = "ITEM_CRITICO", default)]
    item: Value,
    #[serde(rename = "PERIODO", default)]
    period: Value,
    #[serde(rename = "Q", default)]
    quantity: Value,
}

#[derive(Debug, Deserialize)]
struct RawWarehouseRow {
    #[serde(rename = "ITEM_CRITICO", default)]
    item: Value,
    #[serde(rename = "ALMACEN", default)]
    key: Value,
    #[serde(rename = "Q", default)]
    quantity: Value,
}

#[derive(Debug, Deserialize)]
struct RawServiceRow {
    #[serde(rename = "ITEM_CRITICO", default)]
    item: Value,
    #[serde(rename = "SERVICIO", default)]
    key: Value,
    #[serde(rename = "Q", default)]
    quantity: Value,
}

#[derive(Debug, Deserialize)]
struct RawPractitionerRow {
    #[serde(rename = "ITEM_CRITICO", default)]
    item: Value,
    #[serde(rename = "MEDICO", default)]
    key: Value,
    #[serde(rename = "Q", default)]
    quantity: Value,
}

#[derive(Debug, Deserialize)]
struct RawAggDim {
    #[serde(default)]
    almacen: Option<Vec<RawWarehouseRow>>,
    #[serde(default)]
    servicio: Option<Vec<RawServiceRow>>,
    #[serde(default)]
    medico: Option<Vec<RawPractitionerRow>>,
}

/// 维度原始行 → 领域记录
trait RawDimensionRow {
    fn parts(&self) -> (&Value, &Value, &Value);

    fn into_record(self) -> DimensionRecord
    where
        Self: Sized,
    {
        let (item, key, quantity) = self.parts();
        DimensionRecord {
            item: clean_item(item),
            key: clean_key(key),
            quantity: coerce_quantity(quantity),
        }
    }
}

impl RawDimensionRow for RawWarehouseRow {
    fn parts(&self) -> (&Value, &Value, &Value) {
        (&self.item, &self.key, &self.quantity)
    }
}

impl RawDimensionRow for RawServiceRow {
    fn parts(&self) -> (&Value, &Value, &Value) {
        (&self.item, &self.key, &self.quantity)
    }
}

impl RawDimensionRow for RawPractitionerRow {
    fn parts(&self) -> (&Value, &Value, &Value) {
        (&self.item, &self.key, &self.quantity)
    }
}

// ==========================================
// 解析函数
// ==========================================

fn format_error(resource: DatasetResource, err: serde_json::Error) -> ImportError {
    ImportError::DatasetFormat {
        resource: resource.file_name().to_string(),
        message: err.to_string(),
    }
}

/// 解析 items.json（支持对象行或纯字符串）
pub fn parse_items(raw: &str) -> ImportResult<Vec<String>> {
    let rows: Vec<RawItemEntry> =
        serde_json::from_str(raw).map_err(|e| format_error(DatasetResource::Items, e))?;

    Ok(rows
        .iter()
        .map(|row| match row {
            RawItemEntry::Row { item } => clean_item(item),
            RawItemEntry::Plain(item) => clean_item(item),
        })
        .filter(|item| !item.is_empty())
        .collect())
}

/// 解析 kpi.json
pub fn parse_kpis(raw: &str) -> ImportResult<Vec<KpiRecord>> {
    let rows: Vec<RawKpiRow> =
        serde_json::from_str(raw).map_err(|e| format_error(DatasetResource::Kpi, e))?;

    let total = rows.len();
    let kpis: Vec<KpiRecord> = rows
        .into_iter()
        .map(|row| KpiRecord {
            item: clean_item(&row.item),
            total_quantity: coerce_quantity(&row.total),
            quantity_7d: coerce_quantity(&row.q7d),
            quantity_30d: coerce_quantity(&row.q30d),
            avg_daily_30d: coerce_quantity(&row.avg_daily_30d),
        })
        .filter(|kpi| !kpi.item.is_empty())
        .collect();

    if kpis.len() < total {
        tracing::debug!(dropped = total - kpis.len(), "KPI 行品目为空，已丢弃");
    }
    Ok(kpis)
}

/// 解析 series_day.json
///
/// 日期无法解析的记录保留（period = None），由区间运算排除
pub fn parse_series(raw: &str) -> ImportResult<Vec<ConsumptionRecord>> {
    let rows: Vec<RawSeriesRow> =
        serde_json::from_str(raw).map_err(|e| format_error(DatasetResource::SeriesDay, e))?;

    let series: Vec<ConsumptionRecord> = rows
        .into_iter()
        .map(|row| ConsumptionRecord {
            item: clean_item(&row.item),
            period: parse_period(&row.period),
            quantity: coerce_quantity(&row.quantity),
        })
        .filter(|r| !r.item.is_empty())
        .collect();

    let unparsed = series.iter().filter(|r| r.period.is_none()).count();
    if unparsed > 0 {
        tracing::debug!(unparsed, "序列中存在无法解析的日期");
    }
    Ok(series)
}

/// 解析 agg_dim.json，返回 (仓库, 科室, 医生)
pub fn parse_dimensions(
    raw: &str,
) -> ImportResult<(DimensionCollection, DimensionCollection, DimensionCollection)> {
    let payload: RawAggDim =
        serde_json::from_str(raw).map_err(|e| format_error(DatasetResource::AggDim, e))?;

    Ok((
        collect_dimension(Dimension::Warehouse, payload.almacen),
        collect_dimension(Dimension::Service, payload.servicio),
        collect_dimension(Dimension::Practitioner, payload.medico),
    ))
}

fn collect_dimension<R: RawDimensionRow>(
    dimension: Dimension,
    rows: Option<Vec<R>>,
) -> DimensionCollection {
    let rows = rows.unwrap_or_else(|| {
        tracing::warn!(section = dimension.section_name(), "agg_dim.json 缺少维度分组");
        Vec::new()
    });

    let records = rows
        .into_iter()
        .map(RawDimensionRow::into_record)
        .filter(|r| !r.item.is_empty())
        .collect();
    DimensionCollection::new(dimension, records)
}
