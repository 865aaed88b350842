// ==========================================
// 关键耗材覆盖看板 - 维度汇总引擎
// ==========================================
// 职责: 按仓库 / 科室 / 医生汇总消耗量，取前 N
// 规则:
// - 仅保留选中品目的记录
// - 去空白后为空的维度键丢弃
// - 键选择集非空时，仅保留集合内的键
// - 汇总值降序，同值保持首次出现顺序
// - 不受日期区间影响（数据源已预先汇总）
// - 条目数上限为 DIMENSION_TOP_N，配置值只能收紧
// ==========================================

use crate::config::thresholds::DIMENSION_TOP_N;
use crate::domain::filter::selection_allows;
use crate::domain::records::DimensionCollection;
use crate::domain::types::Dimension;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// 单个维度键的汇总值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionTotal {
    pub key: String,
    pub quantity: f64,
}

/// 单个维度的前 N 汇总结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionBreakdown {
    pub dimension: Dimension,
    pub totals: Vec<DimensionTotal>,
}

// ==========================================
// DimensionAggregator - 维度汇总引擎
// ==========================================
pub struct DimensionAggregator {
    top_n: usize,
}

impl DimensionAggregator {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n: top_n.min(DIMENSION_TOP_N),
        }
    }

    /// 汇总单个维度
    ///
    /// # 参数
    /// - collection: 维度记录集合
    /// - items: 品目选择集（空 = 不限制）
    /// - keys: 维度键选择集（None 或空 = 不限制）
    pub fn aggregate(
        &self,
        collection: &DimensionCollection,
        items: &BTreeSet<String>,
        keys: Option<&BTreeSet<String>>,
    ) -> DimensionBreakdown {
        // 首次出现顺序 + 累计值
        let mut order: Vec<String> = Vec::new();
        let mut sums: HashMap<String, f64> = HashMap::new();
        let mut dropped = 0usize;

        for record in &collection.records {
            if !selection_allows(items, &record.item) {
                continue;
            }

            let key = record.key.trim();
            if key.is_empty() {
                dropped += 1;
                continue;
            }
            if !keys.map_or(true, |selection| selection_allows(selection, key)) {
                continue;
            }

            match sums.get_mut(key) {
                Some(sum) => *sum += record.quantity,
                None => {
                    order.push(key.to_string());
                    sums.insert(key.to_string(), record.quantity);
                }
            }
        }

        if dropped > 0 {
            tracing::debug!(
                dimension = %collection.dimension,
                key_field = collection.dimension.key_field(),
                dropped,
                "丢弃空维度键记录"
            );
        }

        let mut totals: Vec<DimensionTotal> = order
            .into_iter()
            .map(|key| {
                let quantity = sums.get(&key).copied().unwrap_or(0.0);
                DimensionTotal { key, quantity }
            })
            .collect();

        // sort_by 为稳定排序
        totals.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));
        totals.truncate(self.top_n);

        DimensionBreakdown {
            dimension: collection.dimension,
            totals,
        }
    }
}
