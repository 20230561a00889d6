// ==========================================
// 冷弯成型车间排产系统 - 领域类型定义
// ==========================================
// 红线: 优先级是等级制,不是评分制
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单优先级 (Priority)
// ==========================================
// 排序口径: Urgent 先于 Normal, 同级按订单号升序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Urgent, // 紧急
    Normal, // 正常
}

impl Priority {
    /// 排序秩 (Urgent=1, Normal=2), 用于可解释性输出
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Urgent => 1,
            Priority::Normal => 2,
        }
    }

    /// 从字符串解析优先级 (导入层使用, 严格匹配)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "URGENT" => Some(Priority::Urgent),
            "NORMAL" => Some(Priority::Normal),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Urgent => write!(f, "URGENT"),
            Priority::Normal => write!(f, "NORMAL"),
        }
    }
}

// ==========================================
// 产品类型 (Product Type)
// ==========================================
// 固定枚举集: 超出集合的类型属于分类错误 (对该订单终态)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    TrapezoidPanel,  // 压型板
    CorrugatedPanel, // 波纹板
    RidgeCap,        // 脊瓦 (派生类型, 占用压型板机组产能)
    Flashing,        // 泛水 (派生类型, 占用压型板机组产能)
    Accessory,       // 配件 (剪折工艺)
}

impl ProductType {
    /// 从字符串解析产品类型 (导入层使用, 严格匹配)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "TRAPEZOID_PANEL" => Some(ProductType::TrapezoidPanel),
            "CORRUGATED_PANEL" => Some(ProductType::CorrugatedPanel),
            "RIDGE_CAP" => Some(ProductType::RidgeCap),
            "FLASHING" => Some(ProductType::Flashing),
            "ACCESSORY" => Some(ProductType::Accessory),
            _ => None,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductType::TrapezoidPanel => write!(f, "TRAPEZOID_PANEL"),
            ProductType::CorrugatedPanel => write!(f, "CORRUGATED_PANEL"),
            ProductType::RidgeCap => write!(f, "RIDGE_CAP"),
            ProductType::Flashing => write!(f, "FLASHING"),
            ProductType::Accessory => write!(f, "ACCESSORY"),
        }
    }
}

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// 红线: 状态只由分派器推进; Unschedulable 为终态, 不再重试
// 原因文本记录在 Order.fail_reason (可解释性)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,       // 待排 (含被顺延的订单)
    Scheduled,     // 已落位
    Unschedulable, // 永久不可排 (终态)
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Scheduled => write!(f, "SCHEDULED"),
            OrderStatus::Unschedulable => write!(f, "UNSCHEDULABLE"),
        }
    }
}

// ==========================================
// 工艺路径 (Workflow)
// ==========================================
// Forming: 长度速率机组一次成型
// ShearBend: 剪板 + 上料两个工序角色配合一台折弯机组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Workflow {
    Forming,   // 成型工艺
    ShearBend, // 剪折工艺
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workflow::Forming => write!(f, "FORMING"),
            Workflow::ShearBend => write!(f, "SHEAR_BEND"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::Urgent < Priority::Normal);
        assert_eq!(Priority::Urgent.rank(), 1);
        assert_eq!(Priority::Normal.rank(), 2);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(Priority::parse("URGENT"), Some(Priority::Urgent));
        assert_eq!(Priority::parse(" normal "), Some(Priority::Normal));
        assert_eq!(Priority::parse("HIGH"), None);
    }

    #[test]
    fn test_product_type_parse_roundtrip() {
        for pt in [
            ProductType::TrapezoidPanel,
            ProductType::CorrugatedPanel,
            ProductType::RidgeCap,
            ProductType::Flashing,
            ProductType::Accessory,
        ] {
            assert_eq!(ProductType::parse(&pt.to_string()), Some(pt));
        }
        assert_eq!(ProductType::parse("SANDWICH_PANEL"), None);
    }
}
