// ==========================================
// 关键耗材覆盖看板 - 数据清洗
// ==========================================
// 职责: TRIM / 数值强制转换 / 日期解析
// 规则:
// - 数量非数值 → 0，负数 → 0，永不为负
// - 日期无法解析 → None（由调用方在日期区间运算中排除）
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// 文本日期支持的格式（按顺序尝试）
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// 带时间的日期格式（只取日期部分）
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// 清洗品目标识（TRIM）
///
/// 数值型标识转为十进制文本；null / 其他类型视为空
pub fn clean_item(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// 清洗维度键（TRIM）
///
/// 源数据中的 "nan" / "None" 占位视为空键
pub fn clean_key(value: &Value) -> String {
    let key = clean_item(value);
    match key.as_str() {
        "nan" | "NaN" | "None" | "null" => String::new(),
        _ => key,
    }
}

/// 数量强制转换为非负有限数
///
/// - 数值: 原值（负数/非有限 → 0）
/// - 文本: 小数逗号转点，去除非数字字符后解析
/// - 其他: 0
pub fn coerce_quantity(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_quantity_text(s),
        _ => None,
    };
    clamp_quantity(parsed.unwrap_or(0.0))
}

/// 非负有限约束
pub fn clamp_quantity(quantity: f64) -> f64 {
    if quantity.is_finite() && quantity > 0.0 {
        quantity
    } else {
        0.0
    }
}

fn parse_quantity_text(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// 解析 PERIODO 字段
///
/// - 文本: ISO 日期 / 日期时间 / RFC 3339 / YYYYMMDD
/// - 整数: 毫秒时间戳（导出脚本的默认 JSON 编码）
pub fn parse_period(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_text(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

/// 解析文本日期
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}
