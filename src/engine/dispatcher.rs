// ==========================================
// 冷弯成型车间排产系统 - 订单分派器
// ==========================================
// 职责: 逐工作日推进, 按 优先级 -> 订单号 顺序为待排订单执行
//       解析 -> 选机台 -> 人力准入 -> 落地提交 的完整链路
// 红线: 只有分派器推进订单状态; 机台与人力先查后占, 两账必须同日一致;
//       待排集合非空则循环继续, 重试上限保证有界终止
// ==========================================

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::PlantConfig;
use crate::domain::machine::MachineCatalog;
use crate::domain::order::{Assignment, Order};
use crate::domain::plan::{DayRecord, ProductionLog, ProductionLogEntry, ScheduleSummary};
use crate::domain::types::OrderStatus;
use crate::engine::calendar::WorkCalendar;
use crate::engine::error::ScheduleError;
use crate::engine::estimate::EstimateEngine;
use crate::engine::operators::OperatorLedger;
use crate::engine::timeline::TimelineStore;
use crate::engine::workflow::{Resolution, WorkflowResolver};

/// 一次分派运行的完整产出
///
/// 订单带终态 (落位/不可排) 与顺延历史, 生产日志与日结记录按发生顺序排列
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRun {
    pub run_id: Uuid,
    pub start_date: NaiveDate,
    pub orders: Vec<Order>,
    pub log: ProductionLog,
    pub day_records: Vec<DayRecord>,
}

impl ScheduleRun {
    /// 运行汇总 (报表头部用)
    pub fn summary(&self) -> ScheduleSummary {
        let mut placed = 0u32;
        let mut unschedulable = 0u32;
        let mut still_pending = 0u32;
        for order in &self.orders {
            match order.status {
                OrderStatus::Scheduled => placed += 1,
                OrderStatus::Unschedulable => unschedulable += 1,
                OrderStatus::Pending => still_pending += 1,
            }
        }
        ScheduleSummary {
            submitted: self.orders.len() as u32,
            placed,
            unschedulable,
            still_pending,
            total_energy_kwh: self.log.total_energy_kwh(),
            days_used: self.day_records.len() as u32,
        }
    }

    /// 不可排订单及其终态原因 (报表尾部用)
    pub fn unschedulable_orders(&self) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| o.status == OrderStatus::Unschedulable)
            .collect()
    }
}

/// 订单分派器
///
/// 由车间配置构造, 每次 [`run`] 使用全新的机台时间线与操作工台账,
/// 同一配置 + 同一订单簿重复运行产出逐字段一致的结果 (run_id 除外)。
///
/// [`run`]: Dispatcher::run
pub struct Dispatcher {
    catalog: MachineCatalog,
    calendar: WorkCalendar,
    resolver: WorkflowResolver,
    estimator: EstimateEngine,
    work_minutes_per_day: u32,
    operator_pool: u32,
    max_deferral_days: u32,
}

impl Dispatcher {
    pub fn new(config: &PlantConfig) -> Self {
        Self {
            catalog: config.build_catalog(),
            calendar: WorkCalendar::new(config.start_date, config.workdays_per_week),
            resolver: WorkflowResolver::new(),
            estimator: EstimateEngine::new(),
            work_minutes_per_day: config.work_minutes_per_day,
            operator_pool: config.operator_pool,
            max_deferral_days: config.max_deferral_days,
        }
    }

    /// 执行分派: 待排集合清空 (全部落位或判终态) 即收盘
    ///
    /// # 参数
    /// * `orders` - 订单簿 (导入层已完成字段校验与查重)
    ///
    /// # 返回
    /// * `ScheduleRun` - 终态订单 + 生产日志 + 日结记录
    /// * 错误仅在台账先查后占配对被破坏时出现, 属于内部缺陷而非业务失败
    #[instrument(skip(self, orders), fields(order_count = orders.len()))]
    pub fn run(&self, mut orders: Vec<Order>) -> Result<ScheduleRun, ScheduleError> {
        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            start_date = %self.calendar.start_date(),
            day_budget_min = self.work_minutes_per_day,
            operator_pool = self.operator_pool,
            "分派运行开始"
        );

        let mut timeline = TimelineStore::new(&self.catalog, self.work_minutes_per_day);
        let mut operators = OperatorLedger::new(self.operator_pool);
        let mut log = ProductionLog::new();
        let mut day_records: Vec<DayRecord> = Vec::new();

        let mut day_no: u32 = 1;
        while orders.iter().any(Order::is_pending) {
            let date = self.calendar.date_of(day_no);
            timeline.ensure_day(date);
            operators.ensure_day(date);

            // 当日待排序列: 紧急在前, 同级按订单号升序 (稳定且可复现)
            let mut queue: Vec<usize> = (0..orders.len())
                .filter(|&i| orders[i].is_pending())
                .collect();
            queue.sort_by_key(|&i| (orders[i].priority.rank(), orders[i].order_id));
            debug!(day_no, %date, pending = queue.len(), "当日开盘");

            let mut placed_today = 0u32;
            let mut deferred_today = 0u32;

            for idx in queue {
                if !orders[idx].is_pending() {
                    continue;
                }
                let placed = self.dispatch_one(
                    &mut orders[idx],
                    day_no,
                    date,
                    &mut timeline,
                    &mut operators,
                    &mut log,
                )?;
                if placed {
                    placed_today += 1;
                } else if orders[idx].is_pending() {
                    deferred_today += 1;
                    self.enforce_deferral_ceiling(&mut orders[idx], day_no);
                }
            }

            day_records.push(DayRecord {
                day_no,
                date,
                placed: placed_today,
                deferred: deferred_today,
                operators_committed: operators.committed_on(date),
                minutes_committed: timeline.minutes_committed_on(date),
            });
            info!(
                day_no,
                %date,
                placed_today,
                deferred_today,
                operators_committed = operators.committed_on(date),
                "当日收盘"
            );
            day_no += 1;
        }

        let run = ScheduleRun {
            run_id,
            start_date: self.calendar.start_date(),
            orders,
            log,
            day_records,
        };
        let summary = run.summary();
        info!(
            %run_id,
            days_used = summary.days_used,
            placed = summary.placed,
            unschedulable = summary.unschedulable,
            total_energy_kwh = summary.total_energy_kwh,
            "分派运行结束"
        );
        Ok(run)
    }

    /// 单笔订单的当日处置
    ///
    /// # 返回
    /// * `Ok(true)` - 当日落位
    /// * `Ok(false)` - 当日顺延 (仍待排) 或判终态
    fn dispatch_one(
        &self,
        order: &mut Order,
        day_no: u32,
        date: NaiveDate,
        timeline: &mut TimelineStore,
        operators: &mut OperatorLedger,
        log: &mut ProductionLog,
    ) -> Result<bool, ScheduleError> {
        let resolution = self.resolver.resolve(
            order,
            &self.catalog,
            self.work_minutes_per_day,
            self.operator_pool,
        );
        let plan = match resolution {
            Resolution::Infeasible { reason } => {
                warn!(order_id = order.order_id, %reason, "订单结构性不可排, 判终态");
                order.mark_unschedulable(reason);
                return Ok(false);
            }
            Resolution::ConfigGap { missing_code } => {
                let reason = format!("MACHINE_NOT_CONFIGURED: 机组/工序角色 {} 未配置", missing_code);
                warn!(order_id = order.order_id, %reason, "配置缺口, 当日顺延");
                order.record_deferral(day_no, date, reason);
                return Ok(false);
            }
            Resolution::Planned(plan) => plan,
        };

        // 第一道准入: 机台空隙
        let (unit, start_min) =
            match timeline.select_best_unit(&plan.machine_code, date, plan.required_min) {
                Some(found) => found,
                None => {
                    let reason = format!(
                        "NO_MACHINE_SLOT: 机组 {} 当日无 {} 分钟空隙",
                        plan.machine_code, plan.required_min
                    );
                    debug!(order_id = order.order_id, %reason, "当日顺延");
                    order.record_deferral(day_no, date, reason);
                    return Ok(false);
                }
            };

        // 第二道准入: 操作工人力
        if !operators.can_admit(date, plan.required_operators) {
            let reason = format!(
                "OPERATORS_SHORT: 需 {} 人, 当日剩余 {} 人",
                plan.required_operators,
                operators.remaining_on(date)
            );
            debug!(order_id = order.order_id, %reason, "当日顺延");
            order.record_deferral(day_no, date, reason);
            return Ok(false);
        }

        // 两道准入均通过, 同日提交两账
        let end_min = start_min + plan.required_min;
        timeline.commit(&unit, date, start_min, end_min, order.order_id)?;
        operators.commit(date, plan.required_operators)?;

        let assignment = Assignment {
            unit,
            day_no,
            date,
            start_min,
            end_min,
            duration_min: plan.required_min,
            operators: plan.required_operators,
            energy_kwh: self
                .estimator
                .energy_kwh(plan.power_kw, f64::from(plan.required_min)),
        };
        log.append(ProductionLogEntry::from_assignment(order, &assignment));
        info!(
            order_id = order.order_id,
            unit = %assignment.unit,
            day_no,
            %date,
            start_min,
            end_min,
            operators = assignment.operators,
            "订单落位"
        );
        order.mark_scheduled(assignment);
        Ok(true)
    }

    /// 重试上限: 自首次尝试起等待工作日数达到上限的订单转终态
    fn enforce_deferral_ceiling(&self, order: &mut Order, day_no: u32) {
        let waited = order.days_waiting(day_no);
        if waited < self.max_deferral_days {
            return;
        }
        let last_reason = order
            .attempts
            .last()
            .map(|a| a.reason.clone())
            .unwrap_or_default();
        let reason = format!(
            "DEFERRAL_CEILING_REACHED: 连续 {} 个工作日未能落位 (上限 {}), 最后一次原因: {}",
            waited, self.max_deferral_days, last_reason
        );
        warn!(order_id = order.order_id, %reason, "达到重试上限, 判终态");
        order.mark_unschedulable(reason);
    }
}

// ==========================================
// 单元测试
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::{MachineRate, MachineType, UnitId};
    use crate::domain::types::{Priority, ProductType};

    /// 单机台压型机组 + 剪折全套角色, 池 10 人, 单日 480 分钟
    fn create_test_config() -> PlantConfig {
        PlantConfig {
            machines: vec![
                MachineType {
                    code: "YX28".to_string(),
                    name: "压型机".to_string(),
                    rate: Some(MachineRate::LengthRate { m_per_min: 16.0 }),
                    power_kw: 45.0,
                    unit_count: 1,
                    operators_per_unit: 2,
                },
                MachineType {
                    code: "ZWJ".to_string(),
                    name: "折弯机".to_string(),
                    rate: Some(MachineRate::CycleRate { seconds_per_op: 25.0 }),
                    power_kw: 11.0,
                    unit_count: 1,
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
            ],
            operator_pool: 10,
            work_minutes_per_day: 480,
            workdays_per_week: 5,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            max_deferral_days: 30,
        }
    }

    #[test]
    fn test_single_order_lands_day_one() {
        let dispatcher = Dispatcher::new(&create_test_config());
        let orders = vec![Order::forming(
            1,
            ProductType::TrapezoidPanel,
            Priority::Normal,
            4800.0,
        )];
        let run = dispatcher.run(orders).unwrap();

        let a = run.orders[0].assignment.as_ref().unwrap();
        assert_eq!(a.unit, UnitId::new("YX28", 1));
        assert_eq!(a.day_no, 1);
        assert_eq!((a.start_min, a.end_min), (0, 300));
        // 45 kW x 300 分钟 / 60 = 225 kWh
        assert_eq!(a.energy_kwh, 225.0);

        let summary = run.summary();
        assert_eq!(summary.placed, 1);
        assert_eq!(summary.days_used, 1);
        assert_eq!(run.log.len(), 1);
    }

    #[test]
    fn test_overflow_rolls_to_next_day() {
        let dispatcher = Dispatcher::new(&create_test_config());
        // 单机台 480 分钟: 300 + 300 放不下, 2 号顺延至次日
        let orders = vec![
            Order::forming(1, ProductType::TrapezoidPanel, Priority::Normal, 4800.0),
            Order::forming(2, ProductType::TrapezoidPanel, Priority::Normal, 4800.0),
        ];
        let run = dispatcher.run(orders).unwrap();

        let a1 = run.orders[0].assignment.as_ref().unwrap();
        let a2 = run.orders[1].assignment.as_ref().unwrap();
        assert_eq!(a1.day_no, 1);
        assert_eq!(a2.day_no, 2);
        assert_eq!((a2.start_min, a2.end_min), (0, 300));
        // 顺延订单带一条 NO_MACHINE_SLOT 记录
        assert_eq!(run.orders[1].attempts.len(), 1);
        assert!(run.orders[1].attempts[0].reason.starts_with("NO_MACHINE_SLOT"));
        assert_eq!(run.day_records.len(), 2);
        assert_eq!(run.day_records[0].deferred, 1);
    }

    #[test]
    fn test_urgent_dispatched_before_normal() {
        let dispatcher = Dispatcher::new(&create_test_config());
        // 订单号更大的紧急单排在普通单之前
        let orders = vec![
            Order::forming(1, ProductType::TrapezoidPanel, Priority::Normal, 4800.0),
            Order::forming(2, ProductType::TrapezoidPanel, Priority::Urgent, 4800.0),
        ];
        let run = dispatcher.run(orders).unwrap();

        assert_eq!(run.orders[1].assignment.as_ref().unwrap().day_no, 1);
        assert_eq!(run.orders[0].assignment.as_ref().unwrap().day_no, 2);
        // 日志按落位顺序记录
        assert_eq!(run.log.entries()[0].order_id, 2);
    }

    #[test]
    fn test_operator_contention_defers_not_kills() {
        let mut config = create_test_config();
        config.operator_pool = 3;
        let dispatcher = Dispatcher::new(&config);
        // 成型 2 人 + 剪折 3 人 = 5 > 池 3, 剪折单顺延至次日
        let orders = vec![
            Order::forming(1, ProductType::TrapezoidPanel, Priority::Urgent, 480.0),
            Order::bending(2, Priority::Normal, 6, 24),
        ];
        let run = dispatcher.run(orders).unwrap();

        assert_eq!(run.orders[0].assignment.as_ref().unwrap().day_no, 1);
        let a2 = run.orders[1].assignment.as_ref().unwrap();
        assert_eq!(a2.day_no, 2);
        assert!(run.orders[1].attempts[0].reason.starts_with("OPERATORS_SHORT"));
    }

    #[test]
    fn test_infeasible_order_terminal_same_day() {
        let dispatcher = Dispatcher::new(&create_test_config());
        // 16000 米 -> 1000 分钟 > 480, 结构性不可排
        let orders = vec![
            Order::forming(1, ProductType::TrapezoidPanel, Priority::Urgent, 16000.0),
            Order::forming(2, ProductType::TrapezoidPanel, Priority::Normal, 160.0),
        ];
        let run = dispatcher.run(orders).unwrap();

        assert_eq!(run.orders[0].status, OrderStatus::Unschedulable);
        assert!(run.orders[0]
            .fail_reason
            .as_deref()
            .unwrap()
            .starts_with("ETC_EXCEEDS_DAY_BUDGET"));
        // 不可排订单不拖延健康订单, 当日照常落位
        assert_eq!(run.orders[1].assignment.as_ref().unwrap().day_no, 1);
        assert_eq!(run.summary().unschedulable, 1);
        assert_eq!(run.summary().placed, 1);
    }

    #[test]
    fn test_missing_machine_hits_deferral_ceiling() {
        let mut config = create_test_config();
        // 移除波纹机组, 该订单只能日复一日顺延
        config.max_deferral_days = 3;
        let dispatcher = Dispatcher::new(&config);
        let orders = vec![Order::forming(
            1,
            ProductType::CorrugatedPanel,
            Priority::Normal,
            100.0,
        )];
        let run = dispatcher.run(orders).unwrap();

        assert_eq!(run.orders[0].status, OrderStatus::Unschedulable);
        let reason = run.orders[0].fail_reason.as_deref().unwrap();
        assert!(reason.starts_with("DEFERRAL_CEILING_REACHED"), "{}", reason);
        assert!(reason.contains("MACHINE_NOT_CONFIGURED"), "{}", reason);
        // 第 1 天首试, 等待 3 天后在第 4 天判终态
        assert_eq!(run.day_records.len(), 4);
        assert_eq!(run.orders[0].attempts.len(), 4);
    }

    #[test]
    fn test_empty_order_book_completes_immediately() {
        let dispatcher = Dispatcher::new(&create_test_config());
        let run = dispatcher.run(Vec::new()).unwrap();
        assert!(run.log.is_empty());
        assert!(run.day_records.is_empty());
        assert_eq!(run.summary().submitted, 0);
        assert_eq!(run.summary().days_used, 0);
    }

    #[test]
    fn test_day_records_track_commitments() {
        let dispatcher = Dispatcher::new(&create_test_config());
        let orders = vec![
            Order::forming(1, ProductType::TrapezoidPanel, Priority::Normal, 1600.0),
            Order::bending(2, Priority::Normal, 6, 24),
        ];
        let run = dispatcher.run(orders).unwrap();

        // 100 分钟成型 (2 人) + 60 分钟剪折 (3 人), 同日两机组并行
        let day1 = &run.day_records[0];
        assert_eq!(day1.placed, 2);
        assert_eq!(day1.deferred, 0);
        assert_eq!(day1.operators_committed, 5);
        assert_eq!(day1.minutes_committed, 160);
    }
}
