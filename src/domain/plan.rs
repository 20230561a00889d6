// ==========================================
// 冷弯成型车间排产系统 - 生产计划领域模型
// ==========================================
// 红线: 生产日志只追加, 条目落位后不可变
// 用途: 落位快照, 单日分派记录, 汇总统计
// ==========================================

use crate::domain::machine::UnitId;
use crate::domain::order::{Assignment, Order};
use crate::domain::types::ProductType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ProductionLogEntry - 落位快照
// ==========================================
// 每次落位成功追加一条, 日志长度 == 已落位订单数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLogEntry {
    pub order_id: u32,             // 订单号
    pub product_type: ProductType, // 产品类型快照
    pub unit: UnitId,              // 落位机台
    pub day_no: u32,               // 工作日序号 (1 起)
    pub date: NaiveDate,           // 日历日期
    pub start_min: u32,            // 当日起始分钟 (含)
    pub end_min: u32,              // 当日结束分钟 (不含)
    pub duration_min: u32,         // 占用时长 (分钟)
    pub operators: u32,            // 占用操作工人数
    pub energy_kwh: f64,           // 预估能耗 (kWh)
}

impl ProductionLogEntry {
    /// 由订单与落位结果构造快照
    pub fn from_assignment(order: &Order, assignment: &Assignment) -> Self {
        Self {
            order_id: order.order_id,
            product_type: order.product_type,
            unit: assignment.unit.clone(),
            day_no: assignment.day_no,
            date: assignment.date,
            start_min: assignment.start_min,
            end_min: assignment.end_min,
            duration_min: assignment.duration_min,
            operators: assignment.operators,
            energy_kwh: assignment.energy_kwh,
        }
    }
}

// ==========================================
// ProductionLog - 生产日志
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductionLog {
    entries: Vec<ProductionLogEntry>,
}

impl ProductionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条落位快照 (唯一写入口)
    pub fn append(&mut self, entry: ProductionLogEntry) {
        self.entries.push(entry);
    }

    /// 按落位顺序的全部条目
    pub fn entries(&self) -> &[ProductionLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 累计能耗 (kWh)
    pub fn total_energy_kwh(&self) -> f64 {
        self.entries.iter().map(|e| e.energy_kwh).sum()
    }
}

// ==========================================
// DayRecord - 单日分派记录
// ==========================================
// 机台占用与操作工占用的日度汇总, 用于报表与瓶颈观察
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day_no: u32,              // 工作日序号
    pub date: NaiveDate,          // 日历日期
    pub placed: u32,              // 当日落位订单数
    pub deferred: u32,            // 当日顺延订单数
    pub operators_committed: u32, // 当日占用操作工人数
    pub minutes_committed: u32,   // 当日占用机台分钟数 (跨机台求和)
}

// ==========================================
// ScheduleSummary - 汇总统计
// ==========================================
// 口径: 提交数 = 落位数 + 不可排数 + (有界运行变体下的) 仍待排数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub submitted: u32,        // 进入分派的订单总数
    pub placed: u32,           // 已落位订单数
    pub unschedulable: u32,    // 永久不可排订单数
    pub still_pending: u32,    // 运行结束仍待排订单数 (正常完成时为 0)
    pub total_energy_kwh: f64, // 累计能耗 (kWh)
    pub days_used: u32,        // 消耗的工作日数
}
