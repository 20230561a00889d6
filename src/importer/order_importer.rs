// ==========================================
// 冷弯成型车间排产系统 - 订单导入器
// ==========================================
// 职责: 订单簿 CSV 的读取, 字段校验与查重, 产出待排订单集合
// 红线: 行级缺陷只拒绝该行并记录原因, 不中断整个文件的导入;
//       进入分派器的订单必须全部通过校验
// ==========================================

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{info, instrument, warn};

use crate::domain::order::{Order, OrderQuantity};
use crate::domain::types::{Priority, ProductType, Workflow};
use crate::engine::workflow::WorkflowResolver;
use crate::importer::error::{ImportError, ImportResult};

/// 订单簿 CSV 固定表头 (列序固定)
pub const EXPECTED_HEADER: [&str; 6] = [
    "order_id",
    "product_type",
    "priority",
    "length_m",
    "bends_per_item",
    "item_count",
];

/// 被拒绝的行及其原因
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// 文件内行号 (表头为第 1 行, 首个数据行为第 2 行)
    pub row_number: usize,
    /// 原始订单号字段 (可能本身就是非法内容)
    pub order_id: Option<String>,
    pub field: String,
    pub message: String,
}

/// 导入结果: 合格订单 + 拒绝清单
#[derive(Debug, Default)]
pub struct ImportReport {
    pub orders: Vec<Order>,
    pub rejected: Vec<RejectedRow>,
}

impl ImportReport {
    pub fn accepted_count(&self) -> usize {
        self.orders.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// 是否全部行均通过校验
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// 订单导入器
///
/// 成型类订单要求 `length_m` 为正数, 剪折类 (配件) 订单要求
/// `bends_per_item`/`item_count` 为正整数; 与工艺无关的数量列留空即可。
pub struct OrderImporter;

impl OrderImporter {
    pub fn new() -> Self {
        Self
    }

    /// 从文件导入订单簿
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn import_file(&self, path: impl AsRef<Path>) -> ImportResult<ImportReport> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        let report = self.import_reader(file)?;
        info!(
            accepted = report.accepted_count(),
            rejected = report.rejected_count(),
            "订单簿导入完成"
        );
        Ok(report)
    }

    /// 从任意字节流导入 (测试与管道场景)
    pub fn import_reader<R: Read>(&self, reader: R) -> ImportResult<ImportReport> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        self.check_header(csv_reader.headers()?)?;

        let mut report = ImportReport::default();
        let mut seen_ids: HashSet<u32> = HashSet::new();

        for (idx, result) in csv_reader.records().enumerate() {
            let row_number = idx + 2; // 表头占第 1 行
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    warn!(row_number, error = %e, "行解析失败, 已拒绝");
                    report.rejected.push(RejectedRow {
                        row_number,
                        order_id: None,
                        field: "*".to_string(),
                        message: format!("行解析失败: {}", e),
                    });
                    continue;
                }
            };
            match self.parse_row(&record, &seen_ids) {
                Ok(order) => {
                    seen_ids.insert(order.order_id);
                    report.orders.push(order);
                }
                Err((field, message)) => {
                    warn!(row_number, field = %field, message = %message, "行校验失败, 已拒绝");
                    report.rejected.push(RejectedRow {
                        row_number,
                        order_id: record.get(0).map(|s| s.trim().to_string()),
                        field,
                        message,
                    });
                }
            }
        }
        Ok(report)
    }

    fn check_header(&self, header: &StringRecord) -> ImportResult<()> {
        let actual: Vec<String> = header
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
        let matches = actual.len() == EXPECTED_HEADER.len()
            && actual
                .iter()
                .zip(EXPECTED_HEADER.iter())
                .all(|(a, e)| a == e);
        if matches {
            Ok(())
        } else {
            Err(ImportError::HeaderMismatch {
                expected: EXPECTED_HEADER.join(","),
                actual: actual.join(","),
            })
        }
    }

    /// 单行校验: 任一字段不合格即整行拒绝, 返回 (字段名, 原因)
    fn parse_row(
        &self,
        record: &StringRecord,
        seen_ids: &HashSet<u32>,
    ) -> Result<Order, (String, String)> {
        let raw_id = record.get(0).unwrap_or("").trim();
        if raw_id.is_empty() {
            return Err(("order_id".to_string(), "订单号缺失".to_string()));
        }
        let order_id: u32 = raw_id
            .parse()
            .map_err(|_| ("order_id".to_string(), format!("订单号非法: {}", raw_id)))?;
        if seen_ids.contains(&order_id) {
            return Err(("order_id".to_string(), format!("订单号重复: {}", order_id)));
        }

        let raw_type = record.get(1).unwrap_or("").trim();
        let product_type = ProductType::parse(raw_type).ok_or_else(|| {
            (
                "product_type".to_string(),
                format!("未知产品类型: {}", raw_type),
            )
        })?;

        let raw_priority = record.get(2).unwrap_or("").trim();
        let priority = Priority::parse(raw_priority).ok_or_else(|| {
            (
                "priority".to_string(),
                format!("未知优先级: {}", raw_priority),
            )
        })?;

        let quantity = match WorkflowResolver::route(product_type).0 {
            Workflow::Forming => {
                let raw_len = record.get(3).unwrap_or("").trim();
                if raw_len.is_empty() {
                    return Err(("length_m".to_string(), "成型订单缺少总长度".to_string()));
                }
                let length_m: f64 = raw_len
                    .parse()
                    .map_err(|_| ("length_m".to_string(), format!("总长度非法: {}", raw_len)))?;
                if !length_m.is_finite() || length_m <= 0.0 {
                    return Err((
                        "length_m".to_string(),
                        format!("总长度必须为正数: {}", raw_len),
                    ));
                }
                OrderQuantity::Forming { length_m }
            }
            Workflow::ShearBend => {
                let bends_per_item = self.parse_positive_u32(record, 4, "bends_per_item")?;
                let item_count = self.parse_positive_u32(record, 5, "item_count")?;
                OrderQuantity::Bending {
                    bends_per_item,
                    item_count,
                }
            }
        };

        Ok(Order::new(order_id, product_type, priority, quantity))
    }

    fn parse_positive_u32(
        &self,
        record: &StringRecord,
        index: usize,
        field: &str,
    ) -> Result<u32, (String, String)> {
        let raw = record.get(index).unwrap_or("").trim();
        if raw.is_empty() {
            return Err((field.to_string(), "剪折订单缺少该字段".to_string()));
        }
        let value: u32 = raw
            .parse()
            .map_err(|_| (field.to_string(), format!("字段非法: {}", raw)))?;
        if value == 0 {
            return Err((field.to_string(), "字段必须为正整数".to_string()));
        }
        Ok(value)
    }
}

impl Default for OrderImporter {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
