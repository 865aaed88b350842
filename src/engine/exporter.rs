// ==========================================
// 关键耗材覆盖看板 - CSV 导出
// ==========================================
// 格式:
// - 表头 ITEM,TOTAL,Q_7D,Q_30D,AVG_DAILY_30D,STOCK,DIAS_COBERTURA,ESTADO
// - 每行以 \n 结尾
// - ITEM 始终双引号包裹，内部双引号加倍
// - DIAS_COBERTURA 两位小数，无穷为空字段
// - 其余数值取最短十进制形式 (5 / 2.5)
// ==========================================

use crate::domain::records::CoverageRow;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

pub const CSV_HEADER: [&str; 8] = [
    "ITEM",
    "TOTAL",
    "Q_7D",
    "Q_30D",
    "AVG_DAILY_30D",
    "STOCK",
    "DIAS_COBERTURA",
    "ESTADO",
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV 缓冲区错误: {0}")]
    Buffer(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

pub struct CsvExporter;

impl CsvExporter {
    /// 按给定顺序导出覆盖行
    pub fn export(rows: &[CoverageRow]) -> ExportResult<String> {
        // 引号由 quote_item 自行处理，writer 不再加引号
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(CSV_HEADER)?;
        for row in rows {
            writer.write_record(Self::to_record(row))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Buffer(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))
    }

    fn to_record(row: &CoverageRow) -> [String; 8] {
        [
            quote_item(&row.item),
            format_number(row.total_quantity),
            format_number(row.quantity_7d),
            format_number(row.quantity_30d),
            format_number(row.avg_daily_30d),
            row.stock.to_string(),
            format_coverage(row.coverage_days),
            row.state.as_code().to_string(),
        ]
    }
}

/// ITEM 字段: 双引号包裹，内部双引号加倍
pub fn quote_item(item: &str) -> String {
    format!("\"{}\"", item.replace('"', "\"\""))
}

/// 最短十进制形式；非有限值输出空字段
pub fn format_number(value: f64) -> String {
    if value.is_finite() {
        format!("{}", value)
    } else {
        String::new()
    }
}

/// 覆盖天数: 两位小数，无穷为空
pub fn format_coverage(days: f64) -> String {
    if days.is_finite() {
        format!("{:.2}", days)
    } else {
        String::new()
    }
}
