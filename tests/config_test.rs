// ==========================================
// ConfigManager / 覆盖层存储 集成测试
// ==========================================
// 测试目标:
// 1. config_kv 读取、回退默认值、校验写入
// 2. 看板配置驱动引擎（阈值 / Top-N）
// 3. local_kv 中覆盖层的共享连接读写
// ==========================================


use std::sync::{Arc, Mutex};

use critical_supply_coverage::config::{
    config_keys, ConfigError, ConfigManager, CoverageThresholds, DashboardConfig,
};
use critical_supply_coverage::db::open_sqlite_connection;
use critical_supply_coverage::domain::types::{Dimension, SeriesFrequency};
use critical_supply_coverage::domain::{DatasetStore, DimensionCollection, FilterState, StockOverlay};
use critical_supply_coverage::engine::DashboardOrchestrator;
use critical_supply_coverage::repository::{SqliteStockOverlayRepository, StockOverlayStore};
use test_helpers::*;

#[test]
fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[test]
fn test_empty_config_yields_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    assert_eq!(manager.load_dashboard_config().unwrap(), DashboardConfig::default());
    assert!(manager.get_config_snapshot().unwrap().is_empty());
}

#[test]
fn test_stored_values_override_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    manager.update_config_value(config_keys::CRIT_DAYS, "3").unwrap();
    manager.update_config_value(config_keys::WARN_DAYS, "10").unwrap();
    manager.update_config_value(config_keys::DIMENSION_TOP_N, "5").unwrap();
    manager
        .update_config_value(config_keys::SELECT_ALL_ITEMS_DEFAULT, "no")
        .unwrap();
    manager
        .update_config_value(config_keys::EXPORT_FILE_NAME, " cobertura.csv ")
        .unwrap();

    let config = manager.load_dashboard_config().unwrap();
    assert_eq!(
        config.thresholds,
        CoverageThresholds {
            crit_days: 3.0,
            warn_days: 10.0
        }
    );
    assert_eq!(config.dimension_top_n, 5);
    assert!(!config.select_all_items_by_default);
    assert_eq!(config.export_file_name, "cobertura.csv");
}

#[test]
fn test_values_persist_across_managers() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    {
        let manager = ConfigManager::new(&db_path).unwrap();
        manager.update_config_value(config_keys::WARN_DAYS, "21").unwrap();
    }

    let manager = ConfigManager::new(&db_path).unwrap();
    assert_eq!(
        manager.get_config_value(config_keys::WARN_DAYS).unwrap(),
        Some("21".to_string())
    );
    assert_eq!(manager.get_thresholds().unwrap().warn_days, 21.0);
}

#[test]
fn test_inconsistent_thresholds_fall_back() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    // 单项合法但组合非法（crit > warn）
    manager.set_config_value(config_keys::CRIT_DAYS, "20").unwrap();
    manager.set_config_value(config_keys::WARN_DAYS, "10").unwrap();
    assert_eq!(manager.get_thresholds().unwrap(), CoverageThresholds::default());

    // 格式错误的原始值回退默认
    manager.set_config_value(config_keys::DIMENSION_TOP_N, "muchos").unwrap();
    assert_eq!(manager.load_dashboard_config().unwrap().dimension_top_n, 20);
}

#[test]
fn test_update_rejects_invalid_entries() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    assert!(matches!(
        manager.update_config_value("theme", "dark"),
        Err(ConfigError::UnknownKey(_))
    ));
    assert!(matches!(
        manager.update_config_value(config_keys::CRIT_DAYS, "-1"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        manager.update_config_value(config_keys::DIMENSION_TOP_N, "0"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(manager.get_config_snapshot().unwrap().is_empty());
}

#[test]
fn test_configured_thresholds_drive_orchestrator() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();
    manager.update_config_value(config_keys::CRIT_DAYS, "2").unwrap();
    manager.update_config_value(config_keys::WARN_DAYS, "5").unwrap();
    let config = manager.load_dashboard_config().unwrap();

    let store = store_with_kpis(vec![kpi("A", 1.0)]);
    let mut overlay = StockOverlay::new();
    overlay.set("A", 4.0);

    let orchestrator = DashboardOrchestrator::new(&config);
    let filter = FilterState::default_for(&store, config.select_all_items_by_default);
    let view = orchestrator.recompute(&store, &filter, &overlay);

    // 4 天: 默认阈值下为 CRITICAL，配置阈值下为 WARNING
    assert_eq!(view.summary.warning, 1);
    assert_eq!(view.summary.critical, 0);
}

#[test]
fn test_dimension_top_n_never_exceeds_twenty() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    assert!(matches!(
        manager.update_config_value(config_keys::DIMENSION_TOP_N, "50"),
        Err(ConfigError::InvalidValue { .. })
    ));

    // 绕过校验直接写入的超限值在加载时收紧
    manager.set_config_value(config_keys::DIMENSION_TOP_N, "50").unwrap();
    let config = manager.load_dashboard_config().unwrap();
    assert_eq!(config.dimension_top_n, 20);

    let records = (0..30)
        .map(|i| dim_record("ALCOHOL", &format!("ALMACEN {:02}", i), (i + 1) as f64))
        .collect();
    let store = DatasetStore::new(
        vec!["ALCOHOL".to_string()],
        vec![],
        vec![],
        DimensionCollection::new(Dimension::Warehouse, records),
        DimensionCollection::empty(Dimension::Service),
        DimensionCollection::empty(Dimension::Practitioner),
    );
    let filter = FilterState::default_for(&store, config.select_all_items_by_default);
    let view = DashboardOrchestrator::new(&config).recompute(&store, &filter, &StockOverlay::new());

    assert_eq!(view.warehouses.totals.len(), 20);
    assert_eq!(view.warehouses.totals[0].key, "ALMACEN 29");
}

#[test]
fn test_series_frequency_key() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();
    assert_eq!(
        manager.load_dashboard_config().unwrap().series_frequency,
        SeriesFrequency::Daily
    );

    manager
        .update_config_value(config_keys::SERIES_FREQUENCY, "m")
        .unwrap();
    assert_eq!(
        manager.load_dashboard_config().unwrap().series_frequency,
        SeriesFrequency::Monthly
    );
    assert!(matches!(
        manager.update_config_value(config_keys::SERIES_FREQUENCY, "W"),
        Err(ConfigError::InvalidValue { .. })
    ));
}

// ==========================================
// 共享连接: 配置与覆盖层同库
// ==========================================

#[test]
fn test_shared_connection_for_config_and_overlay() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path).unwrap()));

    let manager = ConfigManager::from_connection(conn.clone()).unwrap();
    let overlay_store = SqliteStockOverlayRepository::new(conn).unwrap();

    manager.update_config_value(config_keys::CRIT_DAYS, "5").unwrap();
    overlay_store.set("ALCOHOL GEL", 12.7).unwrap();
    overlay_store.set("GUANTES NITRILO", f64::NAN).unwrap();

    let overlay = overlay_store.get().unwrap();
    assert_eq!(overlay.stock_of("ALCOHOL GEL"), 12);
    assert_eq!(overlay.stock_of("GUANTES NITRILO"), 0);
    assert_eq!(manager.get_thresholds().unwrap().crit_days, 5.0);

    overlay_store.clear().unwrap();
    assert!(overlay_store.get().unwrap().is_empty());
    // 清空覆盖层不影响配置
    assert_eq!(manager.get_config_snapshot().unwrap().len(), 1);
}
