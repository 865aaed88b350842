// ==========================================
// 关键耗材覆盖看板 - 关键品目归类
// ==========================================
// 职责: 把原始品名归入关键品目（如 "Algodón hidrófilo 500g" → ALGODON）
// 规则:
// - 先规范化: 小写、去重音、非字母数字转空格、压缩空白
// - 规则表有序，首个命中的品目生效
// - 无命中返回 None（非关键品目）
// ==========================================

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 关键品目规则表（品目, 任一命中即归类的模式）
pub const CRITICAL_ITEM_RULES: &[(&str, &[&str])] = &[
    ("ALCOHOL", &[r"\balcohol\b"]),
    ("GUANTES", &[r"\bguante(s)?\b"]),
    (
        "SOLUCION FISIOLOGICA",
        &[r"\bsolucion\b.*\bfisiologic(a|o)\b", r"\bfisiologic(a|o)\b"],
    ),
    ("IOP SOLUCION", &[r"\biop\b.*\bsolucion\b", r"\b(iop)\b.*\bsol\b"]),
    ("IOP JABON", &[r"\biop\b.*\bjabon\b", r"\biop\b.*\bsoap\b"]),
    (
        "JERINGA 5ML",
        &[r"\bjeringa(s)?\b.*\b5\b\s*ml\b", r"\b5\s*ml\b.*\bjeringa\b"],
    ),
    (
        "JERINGA 10ML",
        &[r"\bjeringa(s)?\b.*\b10\b\s*ml\b", r"\b10\s*ml\b.*\bjeringa\b"],
    ),
    ("ALGODON", &[r"\balgodon\b"]),
    ("MACROGOTERO", &[r"\bmacrogotero\b", r"\bmacro\b.*\bgote(ro)?\b"]),
    ("MICROGOTERO", &[r"\bmicrogotero\b", r"\bmicro\b.*\bgote(ro)?\b"]),
    ("VOLUTROL", &[r"\bvolutrol\b"]),
    ("CLORHEXIDINA", &[r"\bclorhexidina\b", r"\bchlorhexidine\b"]),
    ("PUNZOCATH 18", &[r"\bpunzocath\b.*\b18\b", r"\bpunzo\b.*\b18\b"]),
    ("PUNZOCATH 20", &[r"\bpunzocath\b.*\b20\b", r"\bpunzo\b.*\b20\b"]),
    ("PUNZOCATH 22", &[r"\bpunzocath\b.*\b22\b", r"\bpunzo\b.*\b22\b"]),
];

static COMPILED_RULES: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| {
    CRITICAL_ITEM_RULES
        .iter()
        .map(|(item, patterns)| {
            let compiled = patterns
                .iter()
                .filter_map(|p| match Regex::new(p) {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        tracing::warn!(item = *item, pattern = *p, error = %e, "归类规则无法编译，已跳过");
                        None
                    }
                })
                .collect();
            (*item, compiled)
        })
        .collect()
});

/// 品名规范化
pub fn normalize_product_name(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ==========================================
// CriticalItemClassifier - 关键品目归类器
// ==========================================
pub struct CriticalItemClassifier;

impl CriticalItemClassifier {
    /// 归类单个品名
    pub fn classify(raw: &str) -> Option<&'static str> {
        let name = normalize_product_name(raw);
        if name.is_empty() {
            return None;
        }
        COMPILED_RULES
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| p.is_match(&name)))
            .map(|(item, _)| *item)
    }

    /// 关键品目全集（规则表顺序）
    pub fn items() -> impl Iterator<Item = &'static str> {
        CRITICAL_ITEM_RULES.iter().map(|(item, _)| *item)
    }
}
