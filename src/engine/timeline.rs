// ==========================================
// 冷弯成型车间排产系统 - 机台时间线台账
// ==========================================
// 职责: 维护 机台 x 工作日 的已占用时段, 提供首空隙搜索与最优机台挑选
// 红线: 提交前必须先查后占; 同一机台同一日任意两个时段不得重叠
// ==========================================

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::domain::machine::{MachineCatalog, UnitId};
use crate::engine::error::ScheduleError;

/// 单个已占用时段, 左闭右开 [start_min, end_min), 自当日 0 分钟起计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub start_min: u32,
    pub end_min: u32,
    /// 占用该时段的订单号
    pub order_id: u32,
}

impl TimeSlot {
    pub fn duration_min(&self) -> u32 {
        self.end_min - self.start_min
    }
}

/// 机台时间线台账
///
/// 构造时按资源目录把每种机组展开为独立机台 (YX28-1, YX28-2, ...);
/// 每台机台每个工作日各有一条独立时间线, 时段按起点升序存放。
/// 未显式初始化的日期视为全空, 调度器在每日开盘时调用 [`ensure_day`]
/// 显式建账, 使"空"与"未建"在台账里可区分。
///
/// [`ensure_day`]: TimelineStore::ensure_day
#[derive(Debug)]
pub struct TimelineStore {
    /// 单日可用分钟预算 (所有机台一致)
    day_minutes: u32,
    /// 机组代码 -> 该机组全部机台 (按机台序号升序, 决定平手时的挑选顺序)
    units_by_code: HashMap<String, Vec<UnitId>>,
    /// 机台 -> 日期 -> 已占用时段 (起点升序)
    timelines: HashMap<UnitId, HashMap<NaiveDate, Vec<TimeSlot>>>,
}

impl TimelineStore {
    /// 按资源目录展开全部机台并建立空台账
    pub fn new(catalog: &MachineCatalog, day_minutes: u32) -> Self {
        let mut units_by_code: HashMap<String, Vec<UnitId>> = HashMap::new();
        let mut timelines: HashMap<UnitId, HashMap<NaiveDate, Vec<TimeSlot>>> = HashMap::new();
        for machine in catalog.types() {
            let units = catalog.units_of(&machine.code);
            for unit in &units {
                timelines.insert(unit.clone(), HashMap::new());
            }
            units_by_code.insert(machine.code.clone(), units);
        }
        Self {
            day_minutes,
            units_by_code,
            timelines,
        }
    }

    pub fn day_minutes(&self) -> u32 {
        self.day_minutes
    }

    /// 为全部机台显式建立当日空时间线 (幂等)
    pub fn ensure_day(&mut self, date: NaiveDate) {
        for days in self.timelines.values_mut() {
            days.entry(date).or_default();
        }
    }

    /// 首空隙搜索: 在该机台当日时间线上找最早能放下 `required_min` 分钟的区间
    ///
    /// 游标自 0 起, 依次越过已占用时段; 每个空隙按"时段起点 - 游标 >= 所需时长"
    /// 判定是否可容纳, 最后再以单日预算收尾判定尾部空隙。
    ///
    /// # 返回
    /// * `Some((start, end))` - 最早可行时段, 左闭右开
    /// * `None` - 当日无任何足够长的空隙
    pub fn find_slot(&self, unit: &UnitId, date: NaiveDate, required_min: u32) -> Option<(u32, u32)> {
        let mut cursor = 0u32;
        if let Some(slots) = self.timelines.get(unit).and_then(|days| days.get(&date)) {
            for slot in slots {
                if slot.start_min.saturating_sub(cursor) >= required_min {
                    return Some((cursor, cursor + required_min));
                }
                cursor = cursor.max(slot.end_min);
            }
        }
        if self.day_minutes.saturating_sub(cursor) >= required_min {
            Some((cursor, cursor + required_min))
        } else {
            None
        }
    }

    /// 在某机组的全部机台中挑选最优落位
    ///
    /// 每台机台各跑一次首空隙搜索, 取起点最早者; 起点相同按机台序号小者优先
    /// (即先遇者保留), 保证同一输入始终得到同一结果。
    ///
    /// # 返回
    /// * `Some((unit, start))` - 最优机台与其可行起点
    /// * `None` - 机组未配置任何机台, 或当日全部机台均无空隙
    #[instrument(skip(self), fields(machine_code = %machine_code, date = %date, required_min = %required_min))]
    pub fn select_best_unit(
        &self,
        machine_code: &str,
        date: NaiveDate,
        required_min: u32,
    ) -> Option<(UnitId, u32)> {
        let units = self.units_by_code.get(machine_code)?;
        let mut best: Option<(UnitId, u32)> = None;
        for unit in units {
            if let Some((start, _end)) = self.find_slot(unit, date, required_min) {
                let better = match &best {
                    Some((_, best_start)) => start < *best_start,
                    None => true,
                };
                if better {
                    best = Some((unit.clone(), start));
                }
            }
        }
        if let Some((unit, start)) = &best {
            debug!(unit = %unit, start_min = start, "首空隙搜索命中");
        }
        best
    }

    /// 提交占用: 把 [start, end) 写入该机台当日时间线
    ///
    /// 先查后占的"占"步; 区间非法 / 超出单日预算 / 与已有时段重叠均被拒绝,
    /// 拒绝时台账保持原状。
    pub fn commit(
        &mut self,
        unit: &UnitId,
        date: NaiveDate,
        start_min: u32,
        end_min: u32,
        order_id: u32,
    ) -> Result<(), ScheduleError> {
        if start_min >= end_min {
            return Err(ScheduleError::EmptySlot { start_min, end_min });
        }
        if end_min > self.day_minutes {
            return Err(ScheduleError::DayBudgetExceeded {
                unit: unit.clone(),
                date,
                start_min,
                end_min,
                day_minutes: self.day_minutes,
            });
        }
        let days = self
            .timelines
            .get_mut(unit)
            .ok_or_else(|| ScheduleError::UnknownUnit { unit: unit.clone() })?;
        let slots = days.entry(date).or_default();
        let overlaps = slots
            .iter()
            .any(|s| start_min < s.end_min && s.start_min < end_min);
        if overlaps {
            return Err(ScheduleError::SlotOverlap {
                unit: unit.clone(),
                date,
                start_min,
                end_min,
            });
        }
        slots.push(TimeSlot {
            start_min,
            end_min,
            order_id,
        });
        slots.sort_by_key(|s| s.start_min);
        Ok(())
    }

    /// 该机台当日已占用分钟数
    pub fn committed_minutes(&self, unit: &UnitId, date: NaiveDate) -> u32 {
        self.timelines
            .get(unit)
            .and_then(|days| days.get(&date))
            .map(|slots| slots.iter().map(TimeSlot::duration_min).sum())
            .unwrap_or(0)
    }

    /// 全部机台当日已占用分钟数之和 (供日结记录用)
    pub fn minutes_committed_on(&self, date: NaiveDate) -> u32 {
        self.timelines
            .values()
            .filter_map(|days| days.get(&date))
            .flat_map(|slots| slots.iter().map(TimeSlot::duration_min))
            .sum()
    }

    /// 该机台当日全部时段 (起点升序), 未建账或全空时为空切片
    pub fn slots_of(&self, unit: &UnitId, date: NaiveDate) -> &[TimeSlot] {
        self.timelines
            .get(unit)
            .and_then(|days| days.get(&date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 机组代码 -> 机台列表 (按机台序号升序)
    pub fn units_of(&self, machine_code: &str) -> &[UnitId] {
        self.units_by_code
            .get(machine_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ==========================================
// 单元测试
// ==========================================
