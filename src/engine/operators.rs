// ==========================================
// 冷弯成型车间排产系统 - 操作工台账
// ==========================================
// 职责: 按日累计已占用操作工人数, 提供先查后占的准入判定
// 红线: 同一日已占用 + 新申请不得超过班组池规模
// ==========================================

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::engine::error::ScheduleError;

/// 操作工台账
///
/// 池规模为全厂单日共享上限, 不区分工种; 一张工单占用的人数
/// 在其占用当日整日计入 (不随时段起止折算)。
#[derive(Debug)]
pub struct OperatorLedger {
    pool_size: u32,
    committed: HashMap<NaiveDate, u32>,
}

impl OperatorLedger {
    pub fn new(pool_size: u32) -> Self {
        Self {
            pool_size,
            committed: HashMap::new(),
        }
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }

    /// 显式建立当日台账条目, 初值 0 (幂等)
    pub fn ensure_day(&mut self, date: NaiveDate) {
        self.committed.entry(date).or_insert(0);
    }

    /// 当日已占用人数 (未建账视为 0)
    pub fn committed_on(&self, date: NaiveDate) -> u32 {
        self.committed.get(&date).copied().unwrap_or(0)
    }

    /// 当日剩余可用人数
    pub fn remaining_on(&self, date: NaiveDate) -> u32 {
        self.pool_size.saturating_sub(self.committed_on(date))
    }

    /// 准入判定: 当日剩余人数是否足以容纳 `required` 人
    pub fn can_admit(&self, date: NaiveDate, required: u32) -> bool {
        self.remaining_on(date) >= required
    }

    /// 提交占用: 把 `required` 人计入当日台账
    ///
    /// 先查后占的"占"步, 超限时拒绝且台账保持原状
    pub fn commit(&mut self, date: NaiveDate, required: u32) -> Result<(), ScheduleError> {
        let committed = self.committed_on(date);
        if committed + required > self.pool_size {
            return Err(ScheduleError::OperatorOverflow {
                date,
                requested: required,
                committed,
                pool_size: self.pool_size,
            });
        }
        *self.committed.entry(date).or_insert(0) += required;
        Ok(())
    }
}

// ==========================================
// 单元测试
// ==========================================
