// ==========================================
// 冷弯成型车间排产系统 - 报表层
// ==========================================
// 职责: 分派运行结果 -> 车间文本报表 / 生产日志 CSV 导出
// 红线: 报表只读取运行结果, 不回写任何状态
// ==========================================

use std::io::Write;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::domain::plan::ProductionLogEntry;
use crate::engine::dispatcher::ScheduleRun;

/// 报表层错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("生产日志导出失败: {0}")]
    CsvExport(#[from] csv::Error),

    #[error("文件写入失败: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// 生产日志 CSV 导出列
pub const LOG_CSV_HEADER: [&str; 10] = [
    "order_id",
    "product_type",
    "unit",
    "day_no",
    "date",
    "start_min",
    "end_min",
    "duration_min",
    "operators",
    "energy_kwh",
];

/// 报表渲染器
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// 渲染车间文本报表: 汇总 + 生产日志 + 日结 + 不可排清单
    pub fn render_text(&self, run: &ScheduleRun) -> String {
        let summary = run.summary();
        let mut lines = vec![
            "==========================================".to_string(),
            "冷弯成型车间排产报表".to_string(),
            "==========================================".to_string(),
            format!("运行编号: {}", run.run_id),
            format!("起排日期: {}", run.start_date),
            format!(
                "订单总数: {} | 已落位: {} | 不可排: {} | 消耗工作日: {}",
                summary.submitted, summary.placed, summary.unschedulable, summary.days_used
            ),
            format!("累计能耗: {:.1} kWh", summary.total_energy_kwh),
        ];

        lines.push(String::new());
        lines.push("----- 生产日志 -----".to_string());
        if run.log.is_empty() {
            lines.push("(无落位记录)".to_string());
        }
        for entry in run.log.entries() {
            lines.push(Self::render_log_line(entry));
        }

        lines.push(String::new());
        lines.push("----- 日结记录 -----".to_string());
        for day in &run.day_records {
            lines.push(format!(
                "第 {} 天 {}: 落位 {}, 顺延 {}, 占用 {} 人 / {} 分钟",
                day.day_no, day.date, day.placed, day.deferred, day.operators_committed, day.minutes_committed
            ));
        }

        let failed = run.unschedulable_orders();
        if !failed.is_empty() {
            lines.push(String::new());
            lines.push("----- 不可排订单 -----".to_string());
            for order in failed {
                lines.push(format!(
                    "订单 {} ({}): {}",
                    order.order_id,
                    order.product_type,
                    order.fail_reason.as_deref().unwrap_or("(原因缺失)")
                ));
            }
        }

        lines.push(String::new());
        lines.join("\n")
    }

    fn render_log_line(entry: &ProductionLogEntry) -> String {
        format!(
            "{} (第 {} 天) {} [{:03}-{:03}) 订单 {} {} {} 分钟 {} 人 {:.1} kWh",
            entry.date,
            entry.day_no,
            entry.unit,
            entry.start_min,
            entry.end_min,
            entry.order_id,
            entry.product_type,
            entry.duration_min,
            entry.operators,
            entry.energy_kwh
        )
    }

    /// 生产日志导出为 CSV 字节流
    pub fn write_log_csv<W: Write>(&self, run: &ScheduleRun, writer: W) -> Result<(), ReportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(LOG_CSV_HEADER)?;
        for entry in run.log.entries() {
            csv_writer.write_record([
                entry.order_id.to_string(),
                entry.product_type.to_string(),
                entry.unit.to_string(),
                entry.day_no.to_string(),
                entry.date.to_string(),
                entry.start_min.to_string(),
                entry.end_min.to_string(),
                entry.duration_min.to_string(),
                entry.operators.to_string(),
                format!("{:.3}", entry.energy_kwh),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// 生产日志导出到文件
    pub fn write_log_csv_file(
        &self,
        run: &ScheduleRun,
        path: impl AsRef<Path>,
    ) -> Result<(), ReportError> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_log_csv(run, file)?;
        info!(path = %path.as_ref().display(), entries = run.log.len(), "生产日志已导出");
        Ok(())
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
