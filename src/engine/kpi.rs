// ==========================================
// 关键耗材覆盖看板 - KPI 推导
// ==========================================
// 职责: 由日消耗序列重建单品滚动指标
// 规则:
// - 锚点 = 序列中最大的可解析日期
// - Q_7D  = [锚点-6, 锚点] 内消耗
// - Q_30D = [锚点-29, 锚点] 内消耗
// - AVG_DAILY_30D = Q_30D / 30
// - 结果按 Q_TOTAL 降序
// ==========================================

use crate::domain::records::{ConsumptionRecord, KpiRecord};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

pub const SHORT_WINDOW_DAYS: i64 = 7;
pub const LONG_WINDOW_DAYS: i64 = 30;

pub struct KpiDeriver;

impl KpiDeriver {
    /// 推导 KPI 行
    ///
    /// 无可解析日期时窗口为空，Q_7D / Q_30D 均为 0
    pub fn derive(series: &[ConsumptionRecord]) -> Vec<KpiRecord> {
        let anchor = series.iter().filter_map(|r| r.period).max();
        let short_start = anchor.and_then(|a| window_start(a, SHORT_WINDOW_DAYS));
        let long_start = anchor.and_then(|a| window_start(a, LONG_WINDOW_DAYS));

        let mut order: Vec<String> = Vec::new();
        let mut acc: HashMap<String, KpiRecord> = HashMap::new();

        for record in series {
            let item = record.item.trim();
            if item.is_empty() {
                continue;
            }
            let kpi = acc.entry(item.to_string()).or_insert_with(|| {
                order.push(item.to_string());
                KpiRecord {
                    item: item.to_string(),
                    total_quantity: 0.0,
                    quantity_7d: 0.0,
                    quantity_30d: 0.0,
                    avg_daily_30d: 0.0,
                }
            });

            kpi.total_quantity += record.quantity;
            if in_window(record.period, short_start, anchor) {
                kpi.quantity_7d += record.quantity;
            }
            if in_window(record.period, long_start, anchor) {
                kpi.quantity_30d += record.quantity;
            }
        }

        let mut kpis: Vec<KpiRecord> = order
            .into_iter()
            .filter_map(|item| acc.remove(&item))
            .map(|mut kpi| {
                kpi.avg_daily_30d = kpi.quantity_30d / LONG_WINDOW_DAYS as f64;
                kpi
            })
            .collect();

        kpis.sort_by(|a, b| b.total_quantity.total_cmp(&a.total_quantity));

        tracing::debug!(anchor = ?anchor, items = kpis.len(), "KPI 推导完成");
        kpis
    }
}

/// kpi.json 行（字段名与数据集一致）
#[derive(Debug, Serialize)]
struct KpiJsonRow<'a> {
    #[serde(rename = "ITEM_CRITICO")]
    item: &'a str,
    #[serde(rename = "Q_TOTAL")]
    total: f64,
    #[serde(rename = "Q_7D")]
    q7d: f64,
    #[serde(rename = "Q_30D")]
    q30d: f64,
    #[serde(rename = "AVG_DAILY_30D")]
    avg_daily_30d: f64,
}

/// 序列化为 kpi.json 格式
pub fn kpis_to_json(kpis: &[KpiRecord]) -> serde_json::Result<String> {
    let rows: Vec<KpiJsonRow<'_>> = kpis
        .iter()
        .map(|k| KpiJsonRow {
            item: &k.item,
            total: k.total_quantity,
            q7d: k.quantity_7d,
            q30d: k.quantity_30d,
            avg_daily_30d: k.avg_daily_30d,
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}

/// 推导值与已发布 KPI 的差异
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiMismatch {
    pub item: String,
    pub field: &'static str,
    pub expected: Option<f64>,
    pub actual: Option<f64>,
}

/// 比对推导 KPI 与已发布 KPI（容差 tolerance，按品目名匹配）
pub fn compare_kpis(
    derived: &[KpiRecord],
    published: &[KpiRecord],
    tolerance: f64,
) -> Vec<KpiMismatch> {
    let published_by_item: HashMap<&str, &KpiRecord> =
        published.iter().map(|k| (k.item.as_str(), k)).collect();
    let derived_by_item: HashMap<&str, &KpiRecord> =
        derived.iter().map(|k| (k.item.as_str(), k)).collect();

    let mut mismatches = Vec::new();

    for d in derived {
        let Some(p) = published_by_item.get(d.item.as_str()) else {
            mismatches.push(KpiMismatch {
                item: d.item.clone(),
                field: "ITEM_CRITICO",
                expected: None,
                actual: Some(d.total_quantity),
            });
            continue;
        };

        let fields = [
            ("Q_TOTAL", p.total_quantity, d.total_quantity),
            ("Q_7D", p.quantity_7d, d.quantity_7d),
            ("Q_30D", p.quantity_30d, d.quantity_30d),
            ("AVG_DAILY_30D", p.avg_daily_30d, d.avg_daily_30d),
        ];
        for (field, expected, actual) in fields {
            if (expected - actual).abs() > tolerance {
                mismatches.push(KpiMismatch {
                    item: d.item.clone(),
                    field,
                    expected: Some(expected),
                    actual: Some(actual),
                });
            }
        }
    }

    for p in published {
        if !derived_by_item.contains_key(p.item.as_str()) {
            mismatches.push(KpiMismatch {
                item: p.item.clone(),
                field: "ITEM_CRITICO",
                expected: Some(p.total_quantity),
                actual: None,
            });
        }
    }

    mismatches
}

/// 窗口起点；越过日期下界时返回 None（窗口为空）
fn window_start(anchor: NaiveDate, days: i64) -> Option<NaiveDate> {
    anchor.checked_sub_signed(Duration::days(days - 1))
}

fn in_window(period: Option<NaiveDate>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    match (period, start, end) {
        (Some(p), Some(s), Some(e)) => p >= s && p <= e,
        _ => false,
    }
}
