// ==========================================
// 关键耗材覆盖看板 - 领域类型定义
// ==========================================
// 覆盖状态 (CRITICAL / WARNING / OK)、维度类型、序列粒度
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 覆盖状态 (Coverage State)
// ==========================================
// 红线: 等级制,分类与排序共用同一 rank
// 顺序: Critical < Warning < Ok
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoverageState {
    Critical, // 严重不足
    Warning,  // 关注
    Ok,       // 正常
}

impl CoverageState {
    /// 展示排序用的等级（越小越靠前）
    pub fn rank(&self) -> u8 {
        match self {
            CoverageState::Critical => 0,
            CoverageState::Warning => 1,
            CoverageState::Ok => 2,
        }
    }

    /// 导出/展示用的状态码
    pub fn as_code(&self) -> &'static str {
        match self {
            CoverageState::Critical => "CRITICAL",
            CoverageState::Warning => "WARNING",
            CoverageState::Ok => "OK",
        }
    }
}

impl fmt::Display for CoverageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_code())
    }
}

// ==========================================
// 维度 (Dimension)
// ==========================================
// 每个维度集合的键字段在编译期固定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Warehouse,    // 仓库 (ALMACEN)
    Service,      // 科室 (SERVICIO)
    Practitioner, // 医生 (MEDICO)
}

impl Dimension {
    /// 源数据中的键字段名
    pub fn key_field(&self) -> &'static str {
        match self {
            Dimension::Warehouse => "ALMACEN",
            Dimension::Service => "SERVICIO",
            Dimension::Practitioner => "MEDICO",
        }
    }

    /// agg_dim.json 中的分组名
    pub fn section_name(&self) -> &'static str {
        match self {
            Dimension::Warehouse => "almacen",
            Dimension::Service => "servicio",
            Dimension::Practitioner => "medico",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Warehouse => write!(f, "WAREHOUSE"),
            Dimension::Service => write!(f, "SERVICE"),
            Dimension::Practitioner => write!(f, "PRACTITIONER"),
        }
    }
}

// ==========================================
// 序列粒度 (Series Frequency)
// ==========================================
// D = 按日（原样），M = 按月（日期归到当月 1 日）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesFrequency {
    #[default]
    #[serde(rename = "D")]
    Daily,
    #[serde(rename = "M")]
    Monthly,
}

impl SeriesFrequency {
    pub fn as_code(&self) -> &'static str {
        match self {
            SeriesFrequency::Daily => "D",
            SeriesFrequency::Monthly => "M",
        }
    }

    /// 解析粒度代码（D / M，大小写不敏感，兼容 daily / monthly）
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "d" | "daily" | "day" => Some(SeriesFrequency::Daily),
            "m" | "monthly" | "month" => Some(SeriesFrequency::Monthly),
            _ => None,
        }
    }

    /// 日期归桶
    pub fn bucket(&self, date: NaiveDate) -> NaiveDate {
        match self {
            SeriesFrequency::Daily => date,
            SeriesFrequency::Monthly => {
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
            }
        }
    }
}

impl fmt::Display for SeriesFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_code())
    }
}
