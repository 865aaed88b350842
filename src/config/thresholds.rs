// ==========================================
// 关键耗材覆盖看板 - 阈值与默认配置
// ==========================================
// 职责: 覆盖天数分级阈值、维度 TopN、导出文件名等具名常量
// ==========================================

use crate::domain::types::SeriesFrequency;
use serde::{Deserialize, Serialize};

/// 覆盖天数低于此值 → CRITICAL
pub const CRIT_DAYS: f64 = 7.0;

/// 覆盖天数低于此值 → WARNING
pub const WARN_DAYS: f64 = 14.0;

/// 默认是否全选品目
pub const SELECT_ALL_ITEMS_DEFAULT: bool = true;

/// 维度汇总保留的最大键数
pub const DIMENSION_TOP_N: usize = 20;

/// 导出 CSV 文件名
pub const EXPORT_FILE_NAME: &str = "resumen_cobertura.csv";

// ==========================================
// CoverageThresholds - 分级阈值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageThresholds {
    pub crit_days: f64,
    pub warn_days: f64,
}

impl Default for CoverageThresholds {
    fn default() -> Self {
        Self {
            crit_days: CRIT_DAYS,
            warn_days: WARN_DAYS,
        }
    }
}

impl CoverageThresholds {
    /// 阈值是否合法（有限、非负、crit <= warn）
    pub fn is_valid(&self) -> bool {
        self.crit_days.is_finite()
            && self.warn_days.is_finite()
            && self.crit_days >= 0.0
            && self.crit_days <= self.warn_days
    }
}

// ==========================================
// DashboardConfig - 看板配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub thresholds: CoverageThresholds,
    pub select_all_items_by_default: bool,
    pub dimension_top_n: usize,
    pub export_file_name: String,
    #[serde(default)]
    pub series_frequency: SeriesFrequency,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            thresholds: CoverageThresholds::default(),
            select_all_items_by_default: SELECT_ALL_ITEMS_DEFAULT,
            dimension_top_n: DIMENSION_TOP_N,
            export_file_name: EXPORT_FILE_NAME.to_string(),
            series_frequency: SeriesFrequency::Daily,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.thresholds.crit_days, 7.0);
        assert_eq!(config.thresholds.warn_days, 14.0);
        assert!(config.select_all_items_by_default);
        assert_eq!(config.dimension_top_n, 20);
        assert_eq!(config.export_file_name, "resumen_cobertura.csv");
        assert_eq!(config.series_frequency, SeriesFrequency::Daily);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(CoverageThresholds::default().is_valid());
        assert!(!CoverageThresholds {
            crit_days: 10.0,
            warn_days: 5.0
        }
        .is_valid());
        assert!(!CoverageThresholds {
            crit_days: f64::NAN,
            warn_days: 5.0
        }
        .is_valid());
    }
}
