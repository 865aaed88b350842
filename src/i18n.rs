// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 语言环境变量
pub const LOCALE_ENV: &str = "CRITICAL_SUPPLY_LOCALE";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 按环境变量设置语言（未设置时保持默认）
pub fn init_from_env() {
    if let Ok(locale) = std::env::var(LOCALE_ENV) {
        let locale = locale.trim();
        if !locale.is_empty() {
            set_locale(locale);
        }
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use critical_supply_coverage::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use critical_supply_coverage::i18n::t_with_args;
/// let msg = t_with_args("dataset.load_failed", &[("resource", "kpi.json"), ("message", "404")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，测试并行执行时需串行化
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");

        set_locale("zh-CN");
        assert_eq!(current_locale(), "zh-CN");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(t("common.success"), "操作成功");

        set_locale("en");
        assert_eq!(t("stock.cleared"), "Stock overlay cleared");

        set_locale("zh-CN");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        let msg = t_with_args(
            "dataset.load_failed",
            &[("resource", "kpi.json"), ("message", "not found")],
        );
        assert!(msg.contains("kpi.json"));
        assert!(msg.contains("加载失败"));

        set_locale("en");
        let msg = t_with_args("export.written", &[("rows", "3"), ("path", "/tmp/a.csv")]);
        assert_eq!(msg, "Exported 3 rows to /tmp/a.csv");

        set_locale("zh-CN");
    }
}
