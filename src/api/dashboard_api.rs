// ==========================================
// 关键耗材覆盖看板 - 看板 API
// ==========================================
// 职责: 会话级门面，持有数据集 / 覆盖层存储 / 配置 / 当前筛选状态
// 规则:
// - 数据集加载后只读
// - 任一输入变化（筛选 / 库存）后整体重算视图
// - 覆盖层每次编辑立即持久化
// ==========================================

use std::sync::Arc;

use serde::Serialize;

use crate::api::error::{ApiError, ApiResult};
use crate::config::thresholds::DashboardConfig;
use crate::domain::dataset::DatasetStore;
use crate::domain::filter::{FilterInput, FilterState};
use crate::domain::overlay::{coerce_stock_input, StockOverlay};
use crate::engine::exporter::CsvExporter;
use crate::engine::orchestrator::{DashboardOrchestrator, DashboardView};
use crate::importer::dataset_loader::{DatasetLoader, DatasetSource};
use crate::perf::PerfGuard;
use crate::repository::stock_overlay_repo::StockOverlayStore;

/// CSV 导出结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    store: DatasetStore,
    overlay_store: Arc<dyn StockOverlayStore>,
    config: DashboardConfig,
    orchestrator: DashboardOrchestrator,
    filter: FilterState,
}

impl DashboardApi {
    /// 创建新的 DashboardApi 实例（筛选状态取默认值）
    ///
    /// # 参数
    /// - store: 已加载的数据集
    /// - overlay_store: 库存覆盖层存储
    /// - config: 看板配置
    pub fn new(
        store: DatasetStore,
        overlay_store: Arc<dyn StockOverlayStore>,
        config: DashboardConfig,
    ) -> Self {
        let filter = FilterState::default_for(&store, config.select_all_items_by_default);
        let orchestrator = DashboardOrchestrator::new(&config);
        Self {
            store,
            overlay_store,
            config,
            orchestrator,
            filter,
        }
    }

    /// 加载数据集并创建会话
    ///
    /// 任一数据集加载失败时返回 ApiError::DatasetLoad / DatasetFormat，指明数据集
    pub async fn load<S: DatasetSource>(
        source: S,
        overlay_store: Arc<dyn StockOverlayStore>,
        config: DashboardConfig,
    ) -> ApiResult<Self> {
        let store = DatasetLoader::new(source).load().await?;
        Ok(Self::new(store, overlay_store, config))
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    // ==========================================
    // 筛选
    // ==========================================

    /// 当前筛选状态
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// 应用筛选输入并重算
    pub fn apply_filters(&mut self, input: &FilterInput) -> ApiResult<DashboardView> {
        self.filter = FilterState::apply(input, &self.store);
        tracing::debug!(
            start = ?self.filter.start,
            end = ?self.filter.end,
            items = self.filter.items.len(),
            warehouses = self.filter.warehouses.len(),
            services = self.filter.services.len(),
            "筛选已应用"
        );
        self.view()
    }

    /// 重置筛选并重算
    pub fn reset_filters(&mut self) -> ApiResult<DashboardView> {
        self.filter = FilterState::reset(&self.store, self.config.select_all_items_by_default);
        self.view()
    }

    // ==========================================
    // 库存覆盖层
    // ==========================================

    /// 当前库存快照
    pub fn stock(&self) -> ApiResult<StockOverlay> {
        Ok(self.overlay_store.get()?)
    }

    /// 录入单个品目库存（原始输入）并重算
    ///
    /// 输入按 coerce_stock_input 规则转换，非法值记为 0
    pub fn set_stock(&self, item: &str, raw: &str) -> ApiResult<DashboardView> {
        let item = item.trim();
        if item.is_empty() {
            return Err(ApiError::InvalidInput("品目名称不能为空".to_string()));
        }

        let quantity = coerce_stock_input(raw);
        self.overlay_store.set(item, quantity as f64)?;
        tracing::info!(item, raw, stock = quantity, "库存已录入");
        self.view()
    }

    /// 清空库存覆盖层并重算
    pub fn clear_stock(&self) -> ApiResult<DashboardView> {
        self.overlay_store.clear()?;
        self.view()
    }

    // ==========================================
    // 视图与导出
    // ==========================================

    /// 按当前状态重算看板视图
    pub fn view(&self) -> ApiResult<DashboardView> {
        let overlay = self.overlay_store.get()?;
        Ok(self
            .orchestrator
            .recompute(&self.store, &self.filter, &overlay))
    }

    /// 导出当前覆盖表
    pub fn export_csv(&self) -> ApiResult<CsvExport> {
        let _perf = PerfGuard::new("dashboard.export_csv");
        let view = self.view()?;
        let content = CsvExporter::export(&view.rows)?;
        tracing::info!(
            rows = view.rows.len(),
            file_name = %self.config.export_file_name,
            "覆盖表已导出"
        );
        Ok(CsvExport {
            file_name: self.config.export_file_name.clone(),
            content,
        })
    }
}
