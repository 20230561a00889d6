// ==========================================
// 冷弯成型车间排产系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 检查-提交配对被破坏属于调用方缺陷, 以错误拒绝而非 panic
// ==========================================

use crate::domain::machine::UnitId;
use chrono::NaiveDate;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum ScheduleError {
    // ===== 机台时间线提交错误 =====
    #[error("机台 {unit} 未在资源目录中展开, 无法提交时段")]
    UnknownUnit { unit: UnitId },

    #[error("时段区间非法: start {start_min} >= end {end_min}")]
    EmptySlot { start_min: u32, end_min: u32 },

    #[error("机台 {unit} 在 {date} 的时段 [{start_min},{end_min}) 超出单日预算 {day_minutes} 分钟")]
    DayBudgetExceeded {
        unit: UnitId,
        date: NaiveDate,
        start_min: u32,
        end_min: u32,
        day_minutes: u32,
    },

    #[error("机台 {unit} 在 {date} 的时段 [{start_min},{end_min}) 与已有占用重叠")]
    SlotOverlap {
        unit: UnitId,
        date: NaiveDate,
        start_min: u32,
        end_min: u32,
    },

    // ===== 操作工台账提交错误 =====
    #[error("{date} 操作工池超限: 已占用 {committed} + 申请 {requested} > 池规模 {pool_size}")]
    OperatorOverflow {
        date: NaiveDate,
        requested: u32,
        committed: u32,
        pool_size: u32,
    },
}
