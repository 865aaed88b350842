// ==========================================
// 关键耗材覆盖看板 - 筛选状态
// ==========================================
// 职责: 日期区间 + 三个可选选择集 (品目 / 仓库 / 科室)
// 规则:
// - 选择集为空 = 不限制（全选），不是"什么都不选"
// - 每次 apply / reset 整体替换，不做独立持久化
// ==========================================

use crate::domain::dataset::DatasetStore;
use crate::importer::data_cleaner::parse_date_text;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// FilterInput - 界面原始输入
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterInput {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub warehouses: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

// ==========================================
// FilterState - 生效中的筛选状态
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    /// None 表示该端不设限
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub items: BTreeSet<String>,
    pub warehouses: BTreeSet<String>,
    pub services: BTreeSet<String>,
}

impl FilterState {
    /// 默认筛选状态
    ///
    /// - 日期区间取序列中可解析日期的最小/最大值；无可解析日期时不设限
    /// - `select_all_items` 为 true 时品目选择集为全部品目
    pub fn default_for(store: &DatasetStore, select_all_items: bool) -> Self {
        let (start, end) = match store.period_bounds() {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };

        let items = if select_all_items {
            store.items().iter().cloned().collect()
        } else {
            BTreeSet::new()
        };

        Self {
            start,
            end,
            items,
            warehouses: BTreeSet::new(),
            services: BTreeSet::new(),
        }
    }

    /// 应用界面输入，生成新的筛选状态
    ///
    /// - 无法解析的起止日期回退为默认推断值
    /// - 起始晚于结束时交换
    /// - 选择集条目去空白，空条目丢弃
    pub fn apply(input: &FilterInput, store: &DatasetStore) -> Self {
        let bounds = store.period_bounds();
        let default_start = bounds.map(|(min, _)| min);
        let default_end = bounds.map(|(_, max)| max);

        let mut start = input
            .start
            .as_deref()
            .and_then(parse_date_text)
            .or(default_start);
        let mut end = input
            .end
            .as_deref()
            .and_then(parse_date_text)
            .or(default_end);

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                tracing::debug!(start = %s, end = %e, "筛选起止日期倒置，已交换");
                start = Some(e);
                end = Some(s);
            }
        }

        Self {
            start,
            end,
            items: normalize_selection(&input.items),
            warehouses: normalize_selection(&input.warehouses),
            services: normalize_selection(&input.services),
        }
    }

    /// 重置为默认筛选状态
    pub fn reset(store: &DatasetStore, select_all_items: bool) -> Self {
        Self::default_for(store, select_all_items)
    }

    /// 日期区间是否完全未设限
    pub fn has_date_range(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// 日期是否落在区间内（闭区间）
    ///
    /// 区间未设限时全部通过（包括无法解析的日期）；
    /// 区间设限时无法解析的日期被排除
    pub fn allows_period(&self, period: Option<NaiveDate>) -> bool {
        if !self.has_date_range() {
            return true;
        }
        match period {
            Some(d) => {
                self.start.map_or(true, |s| d >= s) && self.end.map_or(true, |e| d <= e)
            }
            None => false,
        }
    }

    pub fn allows_item(&self, item: &str) -> bool {
        selection_allows(&self.items, item)
    }
}

/// 选择集判定: 空集不限制
pub fn selection_allows(selection: &BTreeSet<String>, value: &str) -> bool {
    selection.is_empty() || selection.contains(value.trim())
}

fn normalize_selection(raw: &[String]) -> BTreeSet<String> {
    raw.iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect()
}
