// ==========================================
// 关键耗材覆盖看板 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (scope_id + key → value)
// 规则: 配置缺失或格式错误时回退默认值并告警，不阻断
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::thresholds::{
    CoverageThresholds, DashboardConfig, CRIT_DAYS, DIMENSION_TOP_N, EXPORT_FILE_NAME,
    SELECT_ALL_ITEMS_DEFAULT, WARN_DAYS,
};
use crate::db::open_sqlite_connection;
use crate::domain::types::SeriesFrequency;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建 ConfigManager（与覆盖层共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let manager = Self { conn };
        manager.ensure_table()?;
        Ok(manager)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
              scope_id TEXT NOT NULL DEFAULT 'global',
              key TEXT NOT NULL,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now')),
              PRIMARY KEY (scope_id, key)
            );
            "#,
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 校验后写入配置值（CLI 入口使用）
    pub fn update_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        validate_config_entry(key, value)?;
        self.set_config_value(key, value.trim())?;
        Ok(())
    }

    /// 全部 global 配置快照
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取并解析配置，缺失或格式错误时返回默认值
    fn get_parsed_or_default<T: FromStr>(&self, key: &str, default: T) -> RepositoryResult<T> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置值格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    // ===== 覆盖天数阈值 =====

    /// 获取分级阈值（非法组合整体回退默认值）
    pub fn get_thresholds(&self) -> RepositoryResult<CoverageThresholds> {
        let thresholds = CoverageThresholds {
            crit_days: self.get_parsed_or_default(config_keys::CRIT_DAYS, CRIT_DAYS)?,
            warn_days: self.get_parsed_or_default(config_keys::WARN_DAYS, WARN_DAYS)?,
        };

        if thresholds.is_valid() {
            Ok(thresholds)
        } else {
            tracing::warn!(
                crit_days = thresholds.crit_days,
                warn_days = thresholds.warn_days,
                "阈值组合非法，使用默认阈值"
            );
            Ok(CoverageThresholds::default())
        }
    }

    // ===== 看板配置 =====

    /// 加载完整看板配置
    pub fn load_dashboard_config(&self) -> RepositoryResult<DashboardConfig> {
        let select_all_raw = self.get_config_value(config_keys::SELECT_ALL_ITEMS_DEFAULT)?;
        let select_all_items_by_default = match select_all_raw {
            Some(v) => parse_flag(&v).unwrap_or_else(|| {
                tracing::warn!(
                    config_key = config_keys::SELECT_ALL_ITEMS_DEFAULT,
                    raw_value = %v,
                    "配置值格式错误，使用默认值"
                );
                SELECT_ALL_ITEMS_DEFAULT
            }),
            None => SELECT_ALL_ITEMS_DEFAULT,
        };

        let dimension_top_n =
            match self.get_parsed_or_default(config_keys::DIMENSION_TOP_N, DIMENSION_TOP_N)? {
                0 => DIMENSION_TOP_N,
                n if n > DIMENSION_TOP_N => {
                    tracing::warn!(
                        config_key = config_keys::DIMENSION_TOP_N,
                        value = n,
                        limit = DIMENSION_TOP_N,
                        "维度条目数超过上限，已收紧"
                    );
                    DIMENSION_TOP_N
                }
                n => n,
            };

        let export_file_name = self
            .get_config_value(config_keys::EXPORT_FILE_NAME)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| EXPORT_FILE_NAME.to_string());

        let series_frequency = match self.get_config_value(config_keys::SERIES_FREQUENCY)? {
            Some(v) => SeriesFrequency::parse(&v).unwrap_or_else(|| {
                tracing::warn!(
                    config_key = config_keys::SERIES_FREQUENCY,
                    raw_value = %v,
                    "配置值格式错误，使用默认值"
                );
                SeriesFrequency::default()
            }),
            None => SeriesFrequency::default(),
        };

        Ok(DashboardConfig {
            thresholds: self.get_thresholds()?,
            select_all_items_by_default,
            dimension_top_n,
            export_file_name,
            series_frequency,
        })
    }
}

/// 校验单个配置项
pub fn validate_config_entry(key: &str, value: &str) -> ConfigResult<()> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let trimmed = value.trim();

    match key {
        config_keys::CRIT_DAYS | config_keys::WARN_DAYS => match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(()),
            _ => Err(invalid("需要非负数值")),
        },
        config_keys::SELECT_ALL_ITEMS_DEFAULT => parse_flag(trimmed)
            .map(|_| ())
            .ok_or_else(|| invalid("需要布尔值")),
        config_keys::DIMENSION_TOP_N => match trimmed.parse::<usize>() {
            Ok(n) if n > 0 && n <= DIMENSION_TOP_N => Ok(()),
            _ => Err(invalid("需要 1 到 20 之间的整数")),
        },
        config_keys::EXPORT_FILE_NAME => {
            if trimmed.is_empty() {
                Err(invalid("文件名不能为空"))
            } else {
                Ok(())
            }
        }
        config_keys::SERIES_FREQUENCY => SeriesFrequency::parse(trimmed)
            .map(|_| ())
            .ok_or_else(|| invalid("需要 D 或 M")),
        other => Err(ConfigError::UnknownKey(other.to_string())),
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 覆盖天数分级
    pub const CRIT_DAYS: &str = "crit_days";
    pub const WARN_DAYS: &str = "warn_days";

    // 筛选默认值
    pub const SELECT_ALL_ITEMS_DEFAULT: &str = "select_all_items_default";

    // 维度汇总
    pub const DIMENSION_TOP_N: &str = "dimension_top_n";

    // 导出
    pub const EXPORT_FILE_NAME: &str = "export_file_name";

    // 序列粒度 (D / M)
    pub const SERIES_FREQUENCY: &str = "series_frequency";

    pub const ALL: [&str; 6] = [
        CRIT_DAYS,
        WARN_DAYS,
        SELECT_ALL_ITEMS_DEFAULT,
        DIMENSION_TOP_N,
        EXPORT_FILE_NAME,
        SERIES_FREQUENCY,
    ];
}
