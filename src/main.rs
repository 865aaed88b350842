// ==========================================
// 关键耗材覆盖看板 - 命令行主入口
// ==========================================
// 用途: 加载数据集 → 应用筛选 → 输出概览 / 导出 CSV / 维护库存与配置
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context};
use clap::Parser;

use critical_supply_coverage::api::DashboardApi;
use critical_supply_coverage::cli::{Cli, Commands, ConfigCommand, FilterArgs, StockCommand};
use critical_supply_coverage::config::{config_keys, ConfigManager, DashboardConfig};
use critical_supply_coverage::db::{get_default_db_path, open_sqlite_connection};
use critical_supply_coverage::domain::overlay::coerce_stock_input;
use critical_supply_coverage::engine::classifier::CriticalItemClassifier;
use critical_supply_coverage::engine::exporter::format_coverage;
use critical_supply_coverage::engine::kpi::{compare_kpis, kpis_to_json, KpiDeriver};
use critical_supply_coverage::engine::DashboardView;
use critical_supply_coverage::i18n::{self, t, t_with_args};
use critical_supply_coverage::importer::dataset_loader::{
    parse_kpis, parse_series, DatasetResource, DatasetSource, FsDatasetSource,
};
use critical_supply_coverage::logging;
use critical_supply_coverage::repository::{SqliteStockOverlayRepository, StockOverlayStore};

/// KPI 比对容差
const KPI_CHECK_TOLERANCE: f64 = 1e-6;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    i18n::init_from_env();

    let cli = Cli::parse();

    tracing::debug!(
        app = critical_supply_coverage::APP_NAME,
        version = critical_supply_coverage::VERSION,
        data_dir = %cli.data_dir.display(),
        "启动"
    );

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::debug!("使用数据库: {}", db_path);

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    let conn = Arc::new(Mutex::new(conn));
    let config_manager = ConfigManager::from_connection(conn.clone())?;
    let overlay_store: Arc<dyn StockOverlayStore> =
        Arc::new(SqliteStockOverlayRepository::new(conn)?);

    match cli.command {
        Commands::Summary { filter, freq } => {
            let mut config = config_manager.load_dashboard_config()?;
            if let Some(freq) = freq {
                config.series_frequency = freq;
            }
            let mut api = load_api(&cli.data_dir, overlay_store, config).await?;
            let view = current_view(&mut api, &filter)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_summary(&view);
            }
        }

        Commands::Export { filter, output } => {
            let config = config_manager.load_dashboard_config()?;
            let mut api = load_api(&cli.data_dir, overlay_store, config).await?;
            let rows = current_view(&mut api, &filter)?.rows.len();
            let export = api.export_csv()?;

            let path = output.unwrap_or_else(|| PathBuf::from(&export.file_name));
            tokio::fs::write(&path, export.content.as_bytes())
                .await
                .with_context(|| format!("无法写入 {}", path.display()))?;
            println!(
                "{}",
                t_with_args(
                    "export.written",
                    &[("rows", &rows.to_string()), ("path", &path.display().to_string())],
                )
            );
        }

        Commands::Classify { names } => run_classify(&names, cli.json)?,

        Commands::Stock { action } => run_stock(action, overlay_store.as_ref(), cli.json)?,

        Commands::Kpi { output, check } => run_kpi(&cli.data_dir, output, check).await?,

        Commands::Config { action } => run_config(action, &config_manager, cli.json)?,
    }

    Ok(())
}

// ==========================================
// 子命令
// ==========================================

async fn load_api(
    data_dir: &Path,
    overlay_store: Arc<dyn StockOverlayStore>,
    config: DashboardConfig,
) -> anyhow::Result<DashboardApi> {
    let api = DashboardApi::load(FsDatasetSource::new(data_dir), overlay_store, config)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    tracing::info!(
        "{}",
        t_with_args(
            "dataset.loaded",
            &[
                ("items", &api.store().items().len().to_string()),
                ("records", &api.store().series().len().to_string()),
            ],
        )
    );
    Ok(api)
}

fn current_view(api: &mut DashboardApi, filter: &FilterArgs) -> anyhow::Result<DashboardView> {
    let view = if filter.is_empty() {
        api.view()?
    } else {
        api.apply_filters(&filter.to_input())?
    };
    Ok(view)
}

fn run_stock(action: StockCommand, store: &dyn StockOverlayStore, json: bool) -> anyhow::Result<()> {
    match action {
        StockCommand::Show => {
            let overlay = store.get()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&overlay)?);
            } else if overlay.is_empty() {
                println!("{}", t("stock.empty"));
            } else {
                for (item, stock) in overlay.entries() {
                    println!("{:<40} {:>10}", item, stock);
                }
            }
        }
        StockCommand::Set { item, value } => {
            let item = item.trim();
            if item.is_empty() {
                bail!("品目名称不能为空");
            }
            let stock = coerce_stock_input(&value);
            store.set(item, stock as f64)?;
            println!(
                "{}",
                t_with_args("stock.updated", &[("item", item), ("stock", &stock.to_string())])
            );
        }
        StockCommand::Clear => {
            store.clear()?;
            println!("{}", t("stock.cleared"));
        }
    }
    Ok(())
}

fn run_classify(names: &[String], json: bool) -> anyhow::Result<()> {
    let results: Vec<(&str, Option<&'static str>)> = names
        .iter()
        .map(|name| (name.as_str(), CriticalItemClassifier::classify(name)))
        .collect();

    if json {
        let payload: Vec<_> = results
            .iter()
            .map(|(name, item)| serde_json::json!({ "name": name, "item": item }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for (name, item) in &results {
        println!("{:<40} {}", name, item.unwrap_or("-"));
    }
    Ok(())
}

async fn run_kpi(data_dir: &Path, output: Option<PathBuf>, check: bool) -> anyhow::Result<()> {
    let source = FsDatasetSource::new(data_dir);
    let series = parse_series(&source.fetch(DatasetResource::SeriesDay).await?)?;
    let derived = KpiDeriver::derive(&series);

    if check {
        let published = parse_kpis(&source.fetch(DatasetResource::Kpi).await?)?;
        let mismatches = compare_kpis(&derived, &published, KPI_CHECK_TOLERANCE);
        if mismatches.is_empty() {
            println!("{}", t("common.success"));
            return Ok(());
        }
        for m in &mismatches {
            println!(
                "{:<40} {:<14} expected={:?} actual={:?}",
                m.item, m.field, m.expected, m.actual
            );
        }
        bail!("kpi.json 与序列推导结果不一致: {} 处差异", mismatches.len());
    }

    let json = kpis_to_json(&derived)?;
    match output {
        Some(path) => {
            tokio::fs::write(&path, json.as_bytes())
                .await
                .with_context(|| format!("无法写入 {}", path.display()))?;
            tracing::info!(path = %path.display(), items = derived.len(), "kpi.json 已生成");
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_config(action: ConfigCommand, manager: &ConfigManager, json: bool) -> anyhow::Result<()> {
    match action {
        ConfigCommand::Show => {
            let effective = manager.load_dashboard_config()?;
            let overrides = manager.get_config_snapshot()?;
            if json {
                let payload = serde_json::json!({
                    "effective": effective,
                    "overrides": overrides,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            for key in config_keys::ALL {
                let marker = if overrides.contains_key(key) { "*" } else { " " };
                println!("{}{:<25} = {}", marker, key, effective_value(&effective, key));
            }
            if overrides.is_empty() {
                println!("{}", t("config.empty"));
            }
        }
        ConfigCommand::Set { key, value } => {
            manager.update_config_value(key.trim(), &value)?;
            println!(
                "{}",
                t_with_args("config.updated", &[("key", key.trim()), ("value", value.trim())])
            );
        }
    }
    Ok(())
}

// ==========================================
// 输出
// ==========================================

fn effective_value(config: &DashboardConfig, key: &str) -> String {
    match key {
        config_keys::CRIT_DAYS => config.thresholds.crit_days.to_string(),
        config_keys::WARN_DAYS => config.thresholds.warn_days.to_string(),
        config_keys::SELECT_ALL_ITEMS_DEFAULT => config.select_all_items_by_default.to_string(),
        config_keys::DIMENSION_TOP_N => config.dimension_top_n.to_string(),
        config_keys::EXPORT_FILE_NAME => config.export_file_name.clone(),
        config_keys::SERIES_FREQUENCY => config.series_frequency.to_string(),
        _ => String::new(),
    }
}

fn print_summary(view: &DashboardView) {
    println!(
        "{}",
        t_with_args(
            "summary.header",
            &[
                ("critical", &view.summary.critical.to_string()),
                ("warning", &view.summary.warning.to_string()),
                ("ok", &view.summary.ok.to_string()),
            ],
        )
    );
    println!(
        "{}",
        t_with_args("summary.total_quantity", &[("total", &view.total_quantity.to_string())])
    );

    println!();
    println!("[SERIES {}]", view.frequency);
    for series in &view.series {
        println!(
            "  {:<40} {:>6} {:>12}",
            series.item,
            series.points.len(),
            series.total()
        );
    }

    for breakdown in [&view.warehouses, &view.services, &view.practitioners] {
        println!();
        println!("[{}]", breakdown.dimension);
        for total in &breakdown.totals {
            println!("  {:<40} {:>12}", total.key, total.quantity);
        }
    }

    println!();
    println!(
        "{:<40} {:>10} {:>10} {:>10} {:>12} {:>8}",
        "ITEM", "Q_7D", "Q_30D", "AVG_30D", "DIAS", "ESTADO"
    );
    for row in &view.rows {
        let days = if row.coverage_days.is_finite() {
            format_coverage(row.coverage_days)
        } else {
            t("summary.infinite")
        };
        println!(
            "{:<40} {:>10} {:>10} {:>10.2} {:>12} {:>8}",
            row.item, row.quantity_7d, row.quantity_30d, row.avg_daily_30d, days, row.state
        );
    }
}
