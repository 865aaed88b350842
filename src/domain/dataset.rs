// ==========================================
// 关键耗材覆盖看板 - 数据集容器
// ==========================================
// 职责: 持有会话期内只读的四类数据集
// 生命周期: 启动时加载一次，之后不可变
// ==========================================

use crate::domain::records::{ConsumptionRecord, DimensionCollection, KpiRecord};
use crate::domain::types::Dimension;
use chrono::NaiveDate;
use std::collections::BTreeSet;

// ==========================================
// DatasetStore - 数据集容器
// ==========================================
#[derive(Debug, Clone)]
pub struct DatasetStore {
    items: Vec<String>,
    kpis: Vec<KpiRecord>,
    series: Vec<ConsumptionRecord>,
    warehouses: DimensionCollection,
    services: DimensionCollection,
    practitioners: DimensionCollection,
}

impl DatasetStore {
    /// 构造数据集容器
    ///
    /// 品目清单会与 KPI / 序列 / 三个维度集合中出现的品目合并，
    /// 去空白、去重后按字典序排列，保证"全选"与"不限制"等价
    pub fn new(
        items: Vec<String>,
        kpis: Vec<KpiRecord>,
        series: Vec<ConsumptionRecord>,
        warehouses: DimensionCollection,
        services: DimensionCollection,
        practitioners: DimensionCollection,
    ) -> Self {
        let dimension_items = [&warehouses, &services, &practitioners]
            .into_iter()
            .flat_map(|collection| collection.records.iter().map(|r| r.item.clone()));

        let universe: BTreeSet<String> = items
            .into_iter()
            .chain(kpis.iter().map(|k| k.item.clone()))
            .chain(series.iter().map(|r| r.item.clone()))
            .chain(dimension_items)
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();

        Self {
            items: universe.into_iter().collect(),
            kpis,
            series,
            warehouses,
            services,
            practitioners,
        }
    }

    /// 全部品目（排序、去重）
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn kpis(&self) -> &[KpiRecord] {
        &self.kpis
    }

    pub fn series(&self) -> &[ConsumptionRecord] {
        &self.series
    }

    /// 按维度取集合
    pub fn dimension(&self, dimension: Dimension) -> &DimensionCollection {
        match dimension {
            Dimension::Warehouse => &self.warehouses,
            Dimension::Service => &self.services,
            Dimension::Practitioner => &self.practitioners,
        }
    }

    /// 序列中可解析日期的最小/最大值
    ///
    /// 无任何可解析日期时返回 None
    pub fn period_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.series.iter().filter_map(|r| r.period);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::DimensionRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(item: &str, period: Option<NaiveDate>, quantity: f64) -> ConsumptionRecord {
        ConsumptionRecord {
            item: item.to_string(),
            period,
            quantity,
        }
    }

    #[test]
    fn test_items_universe_is_merged_and_sorted() {
        let store = DatasetStore::new(
            vec!["GUANTES".to_string(), "ALCOHOL".to_string()],
            vec![KpiRecord {
                item: "ALGODON".to_string(),
                total_quantity: 1.0,
                quantity_7d: 0.0,
                quantity_30d: 0.0,
                avg_daily_30d: 0.0,
            }],
            vec![record("GUANTES", Some(date(2025, 1, 1)), 2.0)],
            DimensionCollection::new(
                Dimension::Warehouse,
                vec![DimensionRecord {
                    item: "VOLUTROL".to_string(),
                    key: "CENTRAL".to_string(),
                    quantity: 1.0,
                }],
            ),
            DimensionCollection::empty(Dimension::Service),
            DimensionCollection::empty(Dimension::Practitioner),
        );

        assert_eq!(store.items(), &["ALCOHOL", "ALGODON", "GUANTES", "VOLUTROL"]);
        assert_eq!(store.dimension(Dimension::Warehouse).records.len(), 1);
    }

    #[test]
    fn test_period_bounds_skips_unparsed_dates() {
        let store = DatasetStore::new(
            vec![],
            vec![],
            vec![
                record("A", Some(date(2025, 3, 10)), 1.0),
                record("A", None, 1.0),
                record("B", Some(date(2025, 1, 5)), 1.0),
                record("B", Some(date(2025, 2, 1)), 1.0),
            ],
            DimensionCollection::empty(Dimension::Warehouse),
            DimensionCollection::empty(Dimension::Service),
            DimensionCollection::empty(Dimension::Practitioner),
        );

        assert_eq!(
            store.period_bounds(),
            Some((date(2025, 1, 5), date(2025, 3, 10)))
        );
    }

    #[test]
    fn test_period_bounds_none_without_dates() {
        let store = DatasetStore::new(
            vec![],
            vec![],
            vec![record("A", None, 1.0)],
            DimensionCollection::empty(Dimension::Warehouse),
            DimensionCollection::empty(Dimension::Service),
            DimensionCollection::empty(Dimension::Practitioner),
        );
        assert_eq!(store.period_bounds(), None);
    }
}
