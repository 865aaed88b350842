// ==========================================
// 关键耗材覆盖看板 - 库存覆盖层仓储
// ==========================================
// 职责: 库存覆盖层的读写与清空 (get / set / clear)
// 存储: local_kv 表中单一键 'stock_overlay'，值为整个映射的 JSON
// 规则:
// - 读写以整个映射为粒度，set 为单事务内的读-改-写
// - 持久化值中的非数值条目强制为 0；整体损坏时视为空映射
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::overlay::{coerce_stock_quantity, StockOverlay};
use crate::importer::data_cleaner::coerce_quantity;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// 覆盖层在 local_kv 中的键
pub const STOCK_OVERLAY_KEY: &str = "stock_overlay";

// ==========================================
// StockOverlayStore - 覆盖层存储接口
// ==========================================
pub trait StockOverlayStore: Send + Sync {
    /// 读取完整映射快照
    fn get(&self) -> RepositoryResult<StockOverlay>;

    /// 写入单个品目（数量强制为非负整数，非法 → 0）
    fn set(&self, item: &str, quantity: f64) -> RepositoryResult<()>;

    /// 清空全部条目
    fn clear(&self) -> RepositoryResult<()>;
}

// ==========================================
// InMemoryStockOverlayStore - 内存实现
// ==========================================
#[derive(Default)]
pub struct InMemoryStockOverlayStore {
    inner: Mutex<StockOverlay>,
}

impl InMemoryStockOverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overlay(overlay: StockOverlay) -> Self {
        Self {
            inner: Mutex::new(overlay),
        }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, StockOverlay>> {
        self.inner
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl StockOverlayStore for InMemoryStockOverlayStore {
    fn get(&self) -> RepositoryResult<StockOverlay> {
        Ok(self.lock()?.clone())
    }

    fn set(&self, item: &str, quantity: f64) -> RepositoryResult<()> {
        self.lock()?.set(item, quantity);
        Ok(())
    }

    fn clear(&self) -> RepositoryResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}

// ==========================================
// SqliteStockOverlayRepository - 持久化实现
// ==========================================
pub struct SqliteStockOverlayRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStockOverlayRepository {
    /// 打开数据库文件并确保表存在
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::new(Arc::new(Mutex::new(conn)))
    }

    /// 使用共享连接创建
    pub fn new(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
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
            CREATE TABLE IF NOT EXISTS local_kv (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    fn read_overlay(conn: &Connection) -> RepositoryResult<StockOverlay> {
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM local_kv WHERE key = ?1",
                params![STOCK_OVERLAY_KEY],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.map(|v| decode_overlay(&v)).unwrap_or_default())
    }

    fn write_overlay(conn: &Connection, overlay: &StockOverlay) -> RepositoryResult<()> {
        let value = serde_json::to_string(overlay)?;
        conn.execute(
            "INSERT INTO local_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![STOCK_OVERLAY_KEY, value],
        )?;
        Ok(())
    }
}

impl StockOverlayStore for SqliteStockOverlayRepository {
    fn get(&self) -> RepositoryResult<StockOverlay> {
        let conn = self.get_conn()?;
        Self::read_overlay(&conn)
    }

    fn set(&self, item: &str, quantity: f64) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut overlay = Self::read_overlay(&tx)?;
        overlay.set(item, quantity);
        Self::write_overlay(&tx, &overlay)?;

        tx.commit()?;
        tracing::debug!(item = item.trim(), stock = overlay.stock_of(item), "库存已更新");
        Ok(())
    }

    fn clear(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "DELETE FROM local_kv WHERE key = ?1",
            params![STOCK_OVERLAY_KEY],
        )?;
        tracing::info!("库存覆盖层已清空");
        Ok(())
    }
}

/// 解码持久化的 JSON 映射
///
/// 条目值按数量规则强制转换；整体无法解析时返回空映射
fn decode_overlay(raw: &str) -> StockOverlay {
    match serde_json::from_str::<BTreeMap<String, Value>>(raw) {
        Ok(map) => map
            .into_iter()
            .map(|(item, v)| (item, coerce_stock_quantity(coerce_quantity(&v))))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "库存覆盖层数据无法解析，按空映射处理");
            StockOverlay::new()
        }
    }
}
