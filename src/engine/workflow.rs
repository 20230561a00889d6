// ==========================================
// 冷弯成型车间排产系统 - 工艺路径解析引擎
// ==========================================
// 职责: 产品类型 -> 工艺路径/目标机组 的解析, 工单参数推导, 结构性不可排判定
// 红线: 路由表是显式策略, 不做模糊匹配; 永不可满足的订单在入场时即判终态,
//       不进入逐日重试
// ==========================================

use tracing::debug;

use crate::domain::machine::{MachineCatalog, MachineRate, MachineType};
use crate::domain::order::{Order, OrderQuantity};
use crate::domain::types::{ProductType, Workflow};
use crate::engine::estimate::EstimateEngine;

// ==========================================
// 机组代码路由表
// ==========================================
// 依据: 车间工艺路线固定, 派生类型 (脊瓦/泛水) 共用压型板机组产能
pub mod machine_codes {
    /// 压型板 -> 压型机组
    pub const TRAPEZOID: &str = "YX28";
    /// 波纹板 -> 波纹压型机组
    pub const CORRUGATED: &str = "YX35";
    /// 脊瓦/泛水 (派生类型) -> 压型机组
    pub const DERIVED: &str = "YX28";
    /// 配件 -> 折弯机组
    pub const BENDING: &str = "ZWJ";
    /// 剪板工序角色 (剪折工艺前道)
    pub const SHEARING: &str = "JB";
    /// 上料工序角色 (剪折工艺辅助)
    pub const HANDLING: &str = "SL";
}

/// 工单参数: 解析成功后交给分派器执行落位
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrderPlan {
    pub workflow: Workflow,
    /// 占用机台时间线的目标机组代码
    pub machine_code: String,
    /// 原始估时 (分钟, 小数)
    pub etc_min: f64,
    /// 上取整后的占用分钟数 (最小 1 分钟, 时间线按整分钟记账)
    pub required_min: u32,
    /// 整条工艺路径的操作工需求 (剪折 = 剪板 + 上料 + 折弯之和)
    pub required_operators: u32,
    /// 目标机组额定功率 (电耗口径)
    pub power_kw: f64,
}

/// 解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// 可执行工单
    Planned(WorkOrderPlan),
    /// 配置缺口: 目标机组/工序角色未配置, 当日跳过次日重试
    ConfigGap { missing_code: String },
    /// 结构性不可排: 任何一天都无法满足, 直接判终态
    Infeasible { reason: String },
}

/// 工艺路径解析引擎
pub struct WorkflowResolver {
    estimator: EstimateEngine,
}

impl WorkflowResolver {
    pub fn new() -> Self {
        Self {
            estimator: EstimateEngine::new(),
        }
    }

    /// 产品类型 -> (工艺路径, 目标机组代码)
    ///
    /// 枚举闭合, 任何产品类型都有且仅有一条路由
    pub fn route(product_type: ProductType) -> (Workflow, &'static str) {
        match product_type {
            ProductType::TrapezoidPanel => (Workflow::Forming, machine_codes::TRAPEZOID),
            ProductType::CorrugatedPanel => (Workflow::Forming, machine_codes::CORRUGATED),
            ProductType::RidgeCap | ProductType::Flashing => {
                (Workflow::Forming, machine_codes::DERIVED)
            }
            ProductType::Accessory => (Workflow::ShearBend, machine_codes::BENDING),
        }
    }

    /// 解析订单为工单参数
    ///
    /// # 参数
    /// * `order` - 待排订单
    /// * `catalog` - 资源目录
    /// * `work_minutes_per_day` - 单日可用分钟预算 (结构性判定基准)
    /// * `operator_pool` - 操作工班组池规模 (结构性判定基准)
    ///
    /// # 返回
    /// * `Planned` / `ConfigGap` / `Infeasible` 三分支, 见 [`Resolution`]
    pub fn resolve(
        &self,
        order: &Order,
        catalog: &MachineCatalog,
        work_minutes_per_day: u32,
        operator_pool: u32,
    ) -> Resolution {
        let (workflow, machine_code) = Self::route(order.product_type);

        let target = match catalog.get(machine_code) {
            Some(t) => t,
            None => {
                return Resolution::ConfigGap {
                    missing_code: machine_code.to_string(),
                }
            }
        };
        if !target.is_schedulable() {
            return Resolution::Infeasible {
                reason: format!("NO_UNITS_CONFIGURED: 机组 {} 机台数为 0, 无法承接订单", target.code),
            };
        }

        // 剪折工艺需要剪板/上料两个工序角色到位
        let required_operators = match workflow {
            Workflow::Forming => target.operators_per_unit,
            Workflow::ShearBend => {
                let shear = match catalog.get(machine_codes::SHEARING) {
                    Some(t) => t,
                    None => {
                        return Resolution::ConfigGap {
                            missing_code: machine_codes::SHEARING.to_string(),
                        }
                    }
                };
                let handling = match catalog.get(machine_codes::HANDLING) {
                    Some(t) => t,
                    None => {
                        return Resolution::ConfigGap {
                            missing_code: machine_codes::HANDLING.to_string(),
                        }
                    }
                };
                shear.operators_per_unit + handling.operators_per_unit + target.operators_per_unit
            }
        };

        let etc_min = match self.etc_for(&order.quantity, target) {
            Some(etc) => etc,
            None => {
                return Resolution::Infeasible {
                    reason: format!(
                        "QUANTITY_MISMATCH: 订单工艺量与机组 {} 速率口径不匹配",
                        target.code
                    ),
                }
            }
        };
        if !order.quantity.is_positive() {
            return Resolution::Infeasible {
                reason: "QUANTITY_NOT_POSITIVE: 订单工艺量非正, 不构成有效工单".to_string(),
            };
        }
        if !etc_min.is_finite() {
            return Resolution::Infeasible {
                reason: format!("RATE_NOT_POSITIVE: 机组 {} 速率非正, 无法估算工时", target.code),
            };
        }
        if etc_min.ceil() > f64::from(work_minutes_per_day) {
            return Resolution::Infeasible {
                reason: format!(
                    "ETC_EXCEEDS_DAY_BUDGET: 预计 {:.1} 分钟 > 单日预算 {} 分钟",
                    etc_min, work_minutes_per_day
                ),
            };
        }
        if required_operators > operator_pool {
            return Resolution::Infeasible {
                reason: format!(
                    "OPERATORS_EXCEED_POOL: 需 {} 人 > 班组池 {} 人",
                    required_operators, operator_pool
                ),
            };
        }

        let required_min = (etc_min.ceil() as u32).max(1);
        debug!(
            order_id = order.order_id,
            workflow = %workflow,
            machine = %target.code,
            etc_min,
            required_min,
            required_operators,
            "工艺路径解析完成"
        );
        Resolution::Planned(WorkOrderPlan {
            workflow,
            machine_code: target.code.clone(),
            etc_min,
            required_min,
            required_operators,
            power_kw: target.power_kw,
        })
    }

    /// 按工艺量与速率口径估时; 口径不匹配返回 None
    fn etc_for(&self, quantity: &OrderQuantity, target: &MachineType) -> Option<f64> {
        match (quantity, target.rate) {
            (OrderQuantity::Forming { length_m }, Some(MachineRate::LengthRate { m_per_min })) => {
                Some(self.estimator.forming_minutes(*length_m, m_per_min))
            }
            (quantity @ OrderQuantity::Bending { .. }, Some(MachineRate::CycleRate { seconds_per_op })) => {
                let bends = quantity.total_bends().unwrap_or(0);
                Some(self.estimator.bending_minutes(bends, seconds_per_op))
            }
            _ => None,
        }
    }
}

impl Default for WorkflowResolver {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Priority;

    fn create_test_catalog() -> MachineCatalog {
        MachineCatalog::new(vec![
            MachineType {
                code: "YX28".to_string(),
                name: "压型机".to_string(),
                rate: Some(MachineRate::LengthRate { m_per_min: 16.0 }),
                power_kw: 45.0,
                unit_count: 2,
                operators_per_unit: 2,
            },
            MachineType {
                code: "YX35".to_string(),
                name: "波纹压型机".to_string(),
                rate: Some(MachineRate::LengthRate { m_per_min: 12.0 }),
                power_kw: 38.0,
                unit_count: 1,
                operators_per_unit: 2,
            },
            MachineType {
                code: "ZWJ".to_string(),
                name: "折弯机".to_string(),
                rate: Some(MachineRate::CycleRate { seconds_per_op: 25.0 }),
                power_kw: 11.0,
                unit_count: 2,
                operators_per_unit: 1,
            },
            MachineType {
                code: "JB".to_string(),
                name: "剪板工位".to_string(),
                rate: None,
                power_kw: 0.0,
                unit_count: 0,
                operators_per_unit: 1,
            },
            MachineType {
                code: "SL".to_string(),
                name: "上料工位".to_string(),
                rate: None,
                power_kw: 0.0,
                unit_count: 0,
                operators_per_unit: 1,
            },
        ])
    }

    fn plan_of(r: Resolution) -> WorkOrderPlan {
        match r {
            Resolution::Planned(p) => p,
            other => panic!("期望 Planned, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_route_table() {
        assert_eq!(
            WorkflowResolver::route(ProductType::TrapezoidPanel),
            (Workflow::Forming, "YX28")
        );
        assert_eq!(
            WorkflowResolver::route(ProductType::CorrugatedPanel),
            (Workflow::Forming, "YX35")
        );
        assert_eq!(
            WorkflowResolver::route(ProductType::RidgeCap),
            (Workflow::Forming, "YX28")
        );
        assert_eq!(
            WorkflowResolver::route(ProductType::Flashing),
            (Workflow::Forming, "YX28")
        );
        assert_eq!(
            WorkflowResolver::route(ProductType::Accessory),
            (Workflow::ShearBend, "ZWJ")
        );
    }

    #[test]
    fn test_resolve_forming_order() {
        let resolver = WorkflowResolver::new();
        let catalog = create_test_catalog();
        let order = Order::forming(1, ProductType::TrapezoidPanel, Priority::Normal, 4800.0);

        let plan = plan_of(resolver.resolve(&order, &catalog, 480, 10));
        assert_eq!(plan.workflow, Workflow::Forming);
        assert_eq!(plan.machine_code, "YX28");
        assert_eq!(plan.etc_min, 300.0);
        assert_eq!(plan.required_min, 300);
        assert_eq!(plan.required_operators, 2);
        assert_eq!(plan.power_kw, 45.0);
    }

    #[test]
    fn test_resolve_fractional_etc_rounds_up() {
        let resolver = WorkflowResolver::new();
        let catalog = create_test_catalog();
        // 100 米 / 16 米每分钟 = 6.25 分钟 -> 占用 7 分钟
        let order = Order::forming(2, ProductType::TrapezoidPanel, Priority::Normal, 100.0);
        let plan = plan_of(resolver.resolve(&order, &catalog, 480, 10));
        assert_eq!(plan.required_min, 7);
        assert!((plan.etc_min - 6.25).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_shear_bend_sums_role_operators() {
        let resolver = WorkflowResolver::new();
        let catalog = create_test_catalog();
        // 6 折 x 120 件 = 720 次 x 25 秒 / 60 = 300 分钟
        let order = Order::bending(3, Priority::Normal, 6, 120);

        let plan = plan_of(resolver.resolve(&order, &catalog, 480, 10));
        assert_eq!(plan.workflow, Workflow::ShearBend);
        assert_eq!(plan.machine_code, "ZWJ");
        assert_eq!(plan.required_min, 300);
        // 剪板 1 + 上料 1 + 折弯 1
        assert_eq!(plan.required_operators, 3);
        assert_eq!(plan.power_kw, 11.0);
    }

    #[test]
    fn test_derived_types_share_trapezoid_machine() {
        let resolver = WorkflowResolver::new();
        let catalog = create_test_catalog();
        let order = Order::forming(4, ProductType::Flashing, Priority::Urgent, 160.0);
        let plan = plan_of(resolver.resolve(&order, &catalog, 480, 10));
        assert_eq!(plan.machine_code, "YX28");
        assert_eq!(plan.required_min, 10);
    }

    #[test]
    fn test_missing_machine_is_config_gap() {
        let resolver = WorkflowResolver::new();
        let catalog = MachineCatalog::new(vec![]);
        let order = Order::forming(5, ProductType::CorrugatedPanel, Priority::Normal, 100.0);
        assert_eq!(
            resolver.resolve(&order, &catalog, 480, 10),
            Resolution::ConfigGap {
                missing_code: "YX35".to_string()
            }
        );
    }

    #[test]
    fn test_missing_process_role_is_config_gap() {
        let resolver = WorkflowResolver::new();
        // 只配折弯机组, 缺剪板/上料角色
        let catalog = MachineCatalog::new(vec![MachineType {
            code: "ZWJ".to_string(),
            name: "折弯机".to_string(),
            rate: Some(MachineRate::CycleRate { seconds_per_op: 25.0 }),
            power_kw: 11.0,
            unit_count: 1,
            operators_per_unit: 1,
        }]);
        let order = Order::bending(6, Priority::Normal, 2, 10);
        assert_eq!(
            resolver.resolve(&order, &catalog, 480, 10),
            Resolution::ConfigGap {
                missing_code: "JB".to_string()
            }
        );
    }

    #[test]
    fn test_etc_exceeding_day_budget_is_infeasible() {
        let resolver = WorkflowResolver::new();
        let catalog = create_test_catalog();
        // 16000 米 / 16 = 1000 分钟 > 480 分钟
        let order = Order::forming(7, ProductType::TrapezoidPanel, Priority::Urgent, 16000.0);
        match resolver.resolve(&order, &catalog, 480, 10) {
            Resolution::Infeasible { reason } => {
                assert!(reason.starts_with("ETC_EXCEEDS_DAY_BUDGET"), "{}", reason)
            }
            other => panic!("期望 Infeasible, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_etc_exactly_at_budget_is_feasible() {
        let resolver = WorkflowResolver::new();
        let catalog = create_test_catalog();
        // 7680 米 / 16 = 480 分钟, 恰好占满单日
        let order = Order::forming(8, ProductType::TrapezoidPanel, Priority::Normal, 7680.0);
        let plan = plan_of(resolver.resolve(&order, &catalog, 480, 10));
        assert_eq!(plan.required_min, 480);
    }

    #[test]
    fn test_operators_exceeding_pool_is_infeasible() {
        let resolver = WorkflowResolver::new();
        let catalog = create_test_catalog();
        let order = Order::forming(9, ProductType::TrapezoidPanel, Priority::Normal, 100.0);
        // 班组池只有 1 人, 成型需要 2 人
        match resolver.resolve(&order, &catalog, 480, 1) {
            Resolution::Infeasible { reason } => {
                assert!(reason.starts_with("OPERATORS_EXCEED_POOL"), "{}", reason)
            }
            other => panic!("期望 Infeasible, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_rate_is_infeasible() {
        let resolver = WorkflowResolver::new();
        let catalog = MachineCatalog::new(vec![MachineType {
            code: "YX28".to_string(),
            name: "压型机".to_string(),
            rate: Some(MachineRate::LengthRate { m_per_min: 0.0 }),
            power_kw: 45.0,
            unit_count: 1,
            operators_per_unit: 2,
        }]);
        let order = Order::forming(10, ProductType::TrapezoidPanel, Priority::Normal, 100.0);
        match resolver.resolve(&order, &catalog, 480, 10) {
            Resolution::Infeasible { reason } => {
                assert!(reason.starts_with("RATE_NOT_POSITIVE"), "{}", reason)
            }
            other => panic!("期望 Infeasible, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_quantity_rate_mismatch_is_infeasible() {
        let resolver = WorkflowResolver::new();
        let catalog = create_test_catalog();
        // 配件订单却带成型长度字段
        let order = Order::new(
            11,
            ProductType::Accessory,
            Priority::Normal,
            OrderQuantity::Forming { length_m: 50.0 },
        );
        match resolver.resolve(&order, &catalog, 480, 10) {
            Resolution::Infeasible { reason } => {
                assert!(reason.starts_with("QUANTITY_MISMATCH"), "{}", reason)
            }
            other => panic!("期望 Infeasible, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_quantity_is_infeasible() {
        let resolver = WorkflowResolver::new();
        let catalog = create_test_catalog();
        // 绕过导入校验直接构造的零量/负量订单不得折算成 1 分钟工单落位
        let cases = vec![
            Order::forming(13, ProductType::TrapezoidPanel, Priority::Normal, 0.0),
            Order::forming(14, ProductType::RidgeCap, Priority::Urgent, -50.0),
            Order::bending(15, Priority::Normal, 6, 0),
        ];
        for order in cases {
            match resolver.resolve(&order, &catalog, 480, 10) {
                Resolution::Infeasible { reason } => {
                    assert!(reason.starts_with("QUANTITY_NOT_POSITIVE"), "{}", reason)
                }
                other => panic!("期望 Infeasible, 实际 {:?}", other),
            }
        }
    }

    #[test]
    fn test_zero_unit_machine_is_infeasible() {
        let resolver = WorkflowResolver::new();
        let catalog = MachineCatalog::new(vec![MachineType {
            code: "YX28".to_string(),
            name: "压型机".to_string(),
            rate: None,
            power_kw: 45.0,
            unit_count: 0,
            operators_per_unit: 2,
        }]);
        let order = Order::forming(12, ProductType::TrapezoidPanel, Priority::Normal, 100.0);
        match resolver.resolve(&order, &catalog, 480, 10) {
            Resolution::Infeasible { reason } => {
                assert!(reason.starts_with("NO_UNITS_CONFIGURED"), "{}", reason)
            }
            other => panic!("期望 Infeasible, 实际 {:?}", other),
        }
    }
}
