// ==========================================
// 冷弯成型车间排产系统 - 订单领域模型
// ==========================================
// 红线: 订单由导入层产生, 分派器只推进 status/assignment/attempts
// 用途: 待排订单, 落位结果, 顺延记录
// ==========================================

use crate::domain::machine::UnitId;
use crate::domain::types::{OrderStatus, Priority, ProductType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// OrderQuantity - 工艺数量字段
// ==========================================
// 成型工艺按总长度计, 剪折工艺按 (单件折弯数 x 件数) 计
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderQuantity {
    /// 成型: 总长度 (米)
    Forming { length_m: f64 },
    /// 剪折: 单件折弯数 x 件数
    Bending { bends_per_item: u32, item_count: u32 },
}

impl OrderQuantity {
    /// 剪折工艺的总折弯次数
    pub fn total_bends(&self) -> Option<u64> {
        match self {
            OrderQuantity::Bending {
                bends_per_item,
                item_count,
            } => Some(u64::from(*bends_per_item) * u64::from(*item_count)),
            OrderQuantity::Forming { .. } => None,
        }
    }

    /// 工艺量是否构成有效生产需求: 成型长度为正且有限, 剪折折弯数与件数均为正
    pub fn is_positive(&self) -> bool {
        match self {
            OrderQuantity::Forming { length_m } => length_m.is_finite() && *length_m > 0.0,
            OrderQuantity::Bending {
                bends_per_item,
                item_count,
            } => *bends_per_item > 0 && *item_count > 0,
        }
    }
}

// ==========================================
// Assignment - 落位结果
// ==========================================
// 由分派器在落位成功时一次性写入, 之后不再变更
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub unit: UnitId,      // 落位机台
    pub day_no: u32,       // 工作日序号 (1 起)
    pub date: NaiveDate,   // 日历日期
    pub start_min: u32,    // 当日起始分钟 (含)
    pub end_min: u32,      // 当日结束分钟 (不含)
    pub duration_min: u32, // 占用时长 (分钟)
    pub operators: u32,    // 占用操作工人数
    pub energy_kwh: f64,   // 预估能耗 (kWh)
}

// ==========================================
// DeferralRecord - 顺延记录
// ==========================================
// 每次当日无法落位追加一条, 用于可解释性与重试上限判定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferralRecord {
    pub day_no: u32,     // 尝试的工作日序号
    pub date: NaiveDate, // 尝试的日历日期
    pub reason: String,  // 原因 (NO_MACHINE_SLOT / OPERATORS_SHORT / MACHINE_NOT_CONFIGURED)
}

// ==========================================
// Order - 生产订单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    // ===== 主键 =====
    pub order_id: u32, // 订单号 (运行内唯一)

    // ===== 业务字段 (导入层写入, 引擎只读) =====
    pub product_type: ProductType, // 产品类型 (驱动工艺分类)
    pub priority: Priority,        // 优先级
    pub quantity: OrderQuantity,   // 工艺数量

    // ===== 分派状态 (分派器写入) =====
    pub status: OrderStatus,            // 订单状态
    pub fail_reason: Option<String>,    // 终态原因 (仅 Unschedulable 时有值)
    pub attempts: Vec<DeferralRecord>,  // 顺延历史
    pub first_attempt_day: Option<u32>, // 首次尝试的工作日序号 (重试上限基准)
    pub assignment: Option<Assignment>, // 落位结果 (仅 Scheduled 时有值)
}

impl Order {
    /// 构造成型工艺订单
    pub fn forming(
        order_id: u32,
        product_type: ProductType,
        priority: Priority,
        length_m: f64,
    ) -> Self {
        Self::new(
            order_id,
            product_type,
            priority,
            OrderQuantity::Forming { length_m },
        )
    }

    /// 构造剪折工艺订单 (产品类型固定为配件)
    pub fn bending(order_id: u32, priority: Priority, bends_per_item: u32, item_count: u32) -> Self {
        Self::new(
            order_id,
            ProductType::Accessory,
            priority,
            OrderQuantity::Bending {
                bends_per_item,
                item_count,
            },
        )
    }

    pub fn new(
        order_id: u32,
        product_type: ProductType,
        priority: Priority,
        quantity: OrderQuantity,
    ) -> Self {
        Self {
            order_id,
            product_type,
            priority,
            quantity,
            status: OrderStatus::Pending,
            fail_reason: None,
            attempts: Vec::new(),
            first_attempt_day: None,
            assignment: None,
        }
    }

    /// 是否仍在待排集合内
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// 落位成功: 写入结果并推进状态
    pub fn mark_scheduled(&mut self, assignment: Assignment) {
        self.assignment = Some(assignment);
        self.status = OrderStatus::Scheduled;
    }

    /// 永久不可排: 写入原因并推进到终态
    pub fn mark_unschedulable(&mut self, reason: impl Into<String>) {
        self.fail_reason = Some(reason.into());
        self.status = OrderStatus::Unschedulable;
    }

    /// 当日顺延: 记录一次尝试 (首个工作日同时作为重试上限基准)
    pub fn record_deferral(&mut self, day_no: u32, date: NaiveDate, reason: impl Into<String>) {
        if self.first_attempt_day.is_none() {
            self.first_attempt_day = Some(day_no);
        }
        self.attempts.push(DeferralRecord {
            day_no,
            date,
            reason: reason.into(),
        });
    }

    /// 自首次尝试以来经过的工作日数 (含当日)
    pub fn days_waiting(&self, current_day_no: u32) -> u32 {
        match self.first_attempt_day {
            Some(first) => current_day_no.saturating_sub(first),
            None => 0,
        }
    }
}
