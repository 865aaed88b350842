// ==========================================
// 关键耗材覆盖看板 - 记录实体
// ==========================================
// 职责: 加载后的四类记录 + 派生的覆盖行
// 说明: 所有数值在导入阶段已完成清洗（非负、有限）
// ==========================================

use crate::domain::types::{CoverageState, Dimension};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ConsumptionRecord - 日消耗记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub item: String,
    /// None 表示源值无法解析为日期，不参与日期区间运算
    pub period: Option<NaiveDate>,
    pub quantity: f64,
}

// ==========================================
// KpiRecord - 单品滚动指标
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRecord {
    pub item: String,
    pub total_quantity: f64,
    pub quantity_7d: f64,
    pub quantity_30d: f64,
    pub avg_daily_30d: f64,
}

// ==========================================
// DimensionRecord - 维度汇总记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRecord {
    pub item: String,
    pub key: String,
    pub quantity: f64,
}

/// 单一维度的记录集合（维度在集合级别固定）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionCollection {
    pub dimension: Dimension,
    pub records: Vec<DimensionRecord>,
}

impl DimensionCollection {
    pub fn new(dimension: Dimension, records: Vec<DimensionRecord>) -> Self {
        Self { dimension, records }
    }

    pub fn empty(dimension: Dimension) -> Self {
        Self::new(dimension, Vec::new())
    }
}

// ==========================================
// CoverageRow - 覆盖天数行（派生，不持久化）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRow {
    pub item: String,
    pub total_quantity: f64,
    pub quantity_7d: f64,
    pub quantity_30d: f64,
    pub avg_daily_30d: f64,
    pub stock: u64,
    /// 可能为正无穷（日均为 0 且有库存）
    pub coverage_days: f64,
    pub state: CoverageState,
}
