// ==========================================
// 冷弯成型车间排产系统 - 工作日历
// ==========================================
// 职责: 工作日序号 (1 起) 与自然日期的相互换算, 自动跳过休息日
// 依据: 每周前 workdays_per_week 天为工作日, 起排日视为第 1 个工作日
// ==========================================

use chrono::{Duration, NaiveDate};

/// 工作日历
///
/// 排产主循环只按工作日序号推进, 周末/休息日不会出现在序号序列里;
/// 跳周末体现在相邻序号映射出的自然日期差大于 1 天。
/// 例: 每周 5 个工作日且起排日为周一时, 第 5 天为周五, 第 6 天为下周一。
#[derive(Debug, Clone)]
pub struct WorkCalendar {
    start_date: NaiveDate,
    workdays_per_week: u32,
}

impl WorkCalendar {
    /// # 参数
    /// * `start_date` - 起排日期 (视为第 1 个工作日)
    /// * `workdays_per_week` - 每周工作日数 (1..=7, 配置层已校验)
    pub fn new(start_date: NaiveDate, workdays_per_week: u32) -> Self {
        Self {
            start_date,
            workdays_per_week: workdays_per_week.clamp(1, 7),
        }
    }

    /// 工作日序号 -> 自然日期
    ///
    /// 序号从 1 起; 第 n 个工作日落在第 (n-1)/周工作日数 周内的
    /// 第 (n-1)%周工作日数 天上。
    pub fn date_of(&self, day_no: u32) -> NaiveDate {
        let idx = day_no.max(1) - 1;
        let week = idx / self.workdays_per_week;
        let day_in_week = idx % self.workdays_per_week;
        self.start_date + Duration::days((week * 7 + day_in_week) as i64)
    }

    /// 该工作日序号是否为一周内最后一个工作日 (其后跨周末)
    pub fn is_week_end(&self, day_no: u32) -> bool {
        (day_no.max(1) - 1) % self.workdays_per_week == self.workdays_per_week - 1
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn workdays_per_week(&self) -> u32 {
        self.workdays_per_week
    }
}

// ==========================================
// 单元测试
// ==========================================
