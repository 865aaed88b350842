// ==========================================
// 关键耗材覆盖看板 - 库存覆盖层
// ==========================================
// 职责: 用户手工录入的在库数量 (item → 数量)
// 规则: 缺失视为 0；非法输入强制为 0，不拒绝
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// StockOverlay - 库存快照
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockOverlay {
    entries: BTreeMap<String, u64>,
}

impl StockOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取品目库存，缺失为 0
    pub fn stock_of(&self, item: &str) -> u64 {
        self.entries.get(item.trim()).copied().unwrap_or(0)
    }

    /// 写入单个品目（数量先经过强制转换）
    pub fn set(&mut self, item: &str, quantity: f64) {
        let item = item.trim();
        if item.is_empty() {
            return;
        }
        self.entries
            .insert(item.to_string(), coerce_stock_quantity(quantity));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &BTreeMap<String, u64> {
        &self.entries
    }
}

impl FromIterator<(String, u64)> for StockOverlay {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        let entries = iter
            .into_iter()
            .map(|(item, qty)| (item.trim().to_string(), qty))
            .filter(|(item, _)| !item.is_empty())
            .collect();
        Self { entries }
    }
}

/// 数量强制转换: 非有限/负数 → 0，其余向下取整
pub fn coerce_stock_quantity(quantity: f64) -> u64 {
    if !quantity.is_finite() || quantity <= 0.0 {
        return 0;
    }
    quantity.floor() as u64
}

/// 界面原始输入强制转换（支持小数逗号）
///
/// # 示例
/// - "12" → 12
/// - "3,7" → 3
/// - "abc" / "-4" / "" → 0
pub fn coerce_stock_input(raw: &str) -> u64 {
    let normalized = raw.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .map(coerce_stock_quantity)
        .unwrap_or(0)
}
