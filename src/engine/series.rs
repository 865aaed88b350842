// ==========================================
// 关键耗材覆盖看板 - 时间序列提取
// ==========================================
// 职责: 按日期区间 + 品目选择集过滤日消耗，按品目分组
// 规则:
// - 闭区间 [start, end]；区间未设限时全部通过
// - 组内按日期升序（稳定），组间按品目名排序
// - 按月粒度: 先按日过滤，再归到当月 1 日并合并同月点
// ==========================================

use crate::domain::filter::FilterState;
use crate::domain::records::ConsumptionRecord;
use crate::domain::types::SeriesFrequency;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period: Option<NaiveDate>,
    pub quantity: f64,
}

/// 单个品目的时间序列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSeries {
    pub item: String,
    pub points: Vec<SeriesPoint>,
}

impl ItemSeries {
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.quantity).sum()
    }

    /// 合并相邻同期点（点已按期排序）
    fn merge_periods(&mut self) {
        let mut merged: Vec<SeriesPoint> = Vec::with_capacity(self.points.len());
        for point in self.points.drain(..) {
            match merged.last_mut() {
                Some(last) if last.period == point.period => last.quantity += point.quantity,
                _ => merged.push(point),
            }
        }
        self.points = merged;
    }
}

/// 序列提取结果
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SeriesExtraction {
    pub series: Vec<ItemSeries>,
    /// 保留记录的消耗总量
    pub total_quantity: f64,
}

pub struct SeriesExtractor;

impl SeriesExtractor {
    /// 按日提取
    pub fn extract(records: &[ConsumptionRecord], filter: &FilterState) -> SeriesExtraction {
        Self::extract_with(records, filter, SeriesFrequency::Daily)
    }

    /// 按指定粒度提取
    pub fn extract_with(
        records: &[ConsumptionRecord],
        filter: &FilterState,
        frequency: SeriesFrequency,
    ) -> SeriesExtraction {
        let mut groups: BTreeMap<String, Vec<SeriesPoint>> = BTreeMap::new();
        let mut total_quantity = 0.0;

        for record in records {
            if !filter.allows_period(record.period) || !filter.allows_item(&record.item) {
                continue;
            }
            total_quantity += record.quantity;
            groups
                .entry(record.item.trim().to_string())
                .or_default()
                .push(SeriesPoint {
                    period: record.period.map(|d| frequency.bucket(d)),
                    quantity: record.quantity,
                });
        }

        let series = groups
            .into_iter()
            .map(|(item, mut points)| {
                // None 仅在区间未设限时出现，排在最后
                points.sort_by_key(|p| (p.period.is_none(), p.period));
                let mut series = ItemSeries { item, points };
                if frequency == SeriesFrequency::Monthly {
                    series.merge_periods();
                }
                series
            })
            .collect();

        SeriesExtraction {
            series,
            total_quantity,
        }
    }
}
