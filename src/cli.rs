// ==========================================
// 关键耗材覆盖看板 - 命令行定义
// ==========================================

use crate::domain::filter::FilterInput;
use crate::domain::types::SeriesFrequency;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "critical-supply-coverage")]
#[command(about = "关键耗材库存覆盖天数看板", long_about = None)]
#[command(version)]
pub struct Cli {
    /// 数据集目录（items.json / kpi.json / series_day.json / agg_dim.json）
    #[arg(long, global = true, env = "CRITICAL_SUPPLY_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// SQLite 数据库路径（库存覆盖层 + 配置），默认取用户数据目录
    #[arg(long, global = true, env = "CRITICAL_SUPPLY_DB_PATH")]
    pub db: Option<String>,

    /// 以 JSON 输出
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 覆盖天数概览（状态计数、消耗总量、维度前 N、覆盖表）
    Summary {
        #[command(flatten)]
        filter: FilterArgs,

        /// 序列粒度（D = 按日, M = 按月），默认取配置
        #[arg(long = "freq", value_parser = parse_frequency)]
        freq: Option<SeriesFrequency>,
    },

    /// 导出覆盖表 CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// 输出文件（默认: 当前目录下的配置文件名）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 原始品名归入关键品目
    Classify {
        /// 原始品名（可多个）
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// 库存覆盖层
    Stock {
        #[command(subcommand)]
        action: StockCommand,
    },

    /// 由 series_day.json 重建 kpi.json
    Kpi {
        /// 输出文件（默认: 标准输出）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 与现有 kpi.json 比对，存在差异时以非零状态退出
        #[arg(long)]
        check: bool,
    },

    /// 看板配置覆写
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum StockCommand {
    /// 显示已录入的库存
    Show,

    /// 录入单个品目库存
    Set {
        /// 品目名称
        item: String,

        /// 库存数量（支持小数逗号，非法值记为 0）
        value: String,
    },

    /// 清空全部库存
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示生效配置与覆写项
    Show,

    /// 写入配置覆写
    Set { key: String, value: String },
}

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// 起始日期（YYYY-MM-DD）
    #[arg(long)]
    pub start: Option<String>,

    /// 结束日期（YYYY-MM-DD）
    #[arg(long)]
    pub end: Option<String>,

    /// 品目（可重复或逗号分隔）
    #[arg(long = "item", value_delimiter = ',')]
    pub items: Vec<String>,

    /// 仓库（可重复或逗号分隔）
    #[arg(long = "warehouse", value_delimiter = ',')]
    pub warehouses: Vec<String>,

    /// 科室（可重复或逗号分隔）
    #[arg(long = "service", value_delimiter = ',')]
    pub services: Vec<String>,
}

fn parse_frequency(raw: &str) -> Result<SeriesFrequency, String> {
    SeriesFrequency::parse(raw).ok_or_else(|| format!("未知的序列粒度: {}（可选 D / M）", raw))
}

impl FilterArgs {
    /// 是否未指定任何筛选条件
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
            && self.end.is_none()
            && self.items.is_empty()
            && self.warehouses.is_empty()
            && self.services.is_empty()
    }

    pub fn to_input(&self) -> FilterInput {
        FilterInput {
            start: self.start.clone(),
            end: self.end.clone(),
            items: self.items.clone(),
            warehouses: self.warehouses.clone(),
            services: self.services.clone(),
        }
    }
}
