// ==========================================
// 冷弯成型车间排产系统 - 车间配置
// ==========================================
// 职责: 资源目录与全厂常量的加载、默认值、校验
// 红线: 配置一次装载, 运行中不可变更
// ==========================================

use crate::domain::machine::{MachineCatalog, MachineRate, MachineType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ==========================================
// 配置错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("机组代码重复: {0}")]
    DuplicateMachineCode(String),

    #[error("机组 {0} 缺少速率口径 (unit_count > 0 时必须配置)")]
    RateMissing(String),

    #[error("工序角色 {0} 不应配置速率 (unit_count = 0)")]
    RateOnProcessRole(String),

    #[error("单日工作分钟数无效: {0} (必须 >= 1)")]
    InvalidWorkMinutes(u32),

    #[error("每周工作日数无效: {0} (必须在 1..=7)")]
    InvalidWorkdaysPerWeek(u32),

    #[error("顺延天数上限无效: {0} (必须 >= 1)")]
    InvalidDeferralCeiling(u32),
}

// ==========================================
// PlantConfig - 车间配置
// ==========================================
// 缺省字段取默认值, 便于部分覆盖的配置文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantConfig {
    /// 机组类型目录
    #[serde(default = "defaults::machines")]
    pub machines: Vec<MachineType>,

    /// 全厂操作工池规模 (人/日)
    #[serde(default = "defaults::operator_pool")]
    pub operator_pool: u32,

    /// 单日工作分钟数
    #[serde(default = "defaults::work_minutes_per_day")]
    pub work_minutes_per_day: u32,

    /// 每周工作日数 (超出部分按非工作日跳过)
    #[serde(default = "defaults::workdays_per_week")]
    pub workdays_per_week: u32,

    /// 排程起始日期 (第 1 个工作日)
    #[serde(default = "defaults::start_date")]
    pub start_date: NaiveDate,

    /// 顺延天数上限: 订单自首次尝试起等待超过该工作日数转为永久不可排
    #[serde(default = "defaults::max_deferral_days")]
    pub max_deferral_days: u32,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            machines: defaults::machines(),
            operator_pool: defaults::operator_pool(),
            work_minutes_per_day: defaults::work_minutes_per_day(),
            workdays_per_week: defaults::workdays_per_week(),
            start_date: defaults::start_date(),
            max_deferral_days: defaults::max_deferral_days(),
        }
    }
}

impl PlantConfig {
    /// 从 JSON 文件加载并校验
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: PlantConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置不变量
    ///
    /// 规则:
    /// 1) 机组代码不重复
    /// 2) 可排程机组 (unit_count > 0) 必须且只能有一种速率口径
    /// 3) 工序角色 (unit_count = 0) 不配置速率
    /// 4) 单日分钟数 >= 1, 每周工作日数在 1..=7, 顺延上限 >= 1
    ///
    /// 注: 速率数值本身允许为非正值, 由估时函数返回"无穷时长"哨兵,
    ///     对应订单在分类阶段被判定为永久不可排而非配置错误。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for machine in &self.machines {
            if !seen.insert(machine.code.clone()) {
                return Err(ConfigError::DuplicateMachineCode(machine.code.clone()));
            }
            match (machine.unit_count, machine.rate) {
                (0, Some(_)) => return Err(ConfigError::RateOnProcessRole(machine.code.clone())),
                (n, None) if n > 0 => return Err(ConfigError::RateMissing(machine.code.clone())),
                _ => {}
            }
        }

        if self.work_minutes_per_day == 0 {
            return Err(ConfigError::InvalidWorkMinutes(self.work_minutes_per_day));
        }
        if !(1..=7).contains(&self.workdays_per_week) {
            return Err(ConfigError::InvalidWorkdaysPerWeek(self.workdays_per_week));
        }
        if self.max_deferral_days == 0 {
            return Err(ConfigError::InvalidDeferralCeiling(self.max_deferral_days));
        }

        Ok(())
    }

    /// 构建不可变资源目录
    pub fn build_catalog(&self) -> MachineCatalog {
        MachineCatalog::new(self.machines.clone())
    }
}

// ==========================================
// 默认值 (缺省车间: 两条成型线 + 折弯线 + 两个工序角色)
// ==========================================
mod defaults {
    use super::*;

    pub fn machines() -> Vec<MachineType> {
        vec![
            MachineType {
                code: "YX28".to_string(),
                name: "压型板机组".to_string(),
                rate: Some(MachineRate::LengthRate { m_per_min: 16.0 }),
                power_kw: 45.0,
                unit_count: 2,
                operators_per_unit: 2,
            },
            MachineType {
                code: "YX35".to_string(),
                name: "波纹板机组".to_string(),
                rate: Some(MachineRate::LengthRate { m_per_min: 12.0 }),
                power_kw: 38.0,
                unit_count: 1,
                operators_per_unit: 2,
            },
            MachineType {
                code: "ZWJ".to_string(),
                name: "折弯机组".to_string(),
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
        ]
    }

    pub fn operator_pool() -> u32 {
        10
    }

    pub fn work_minutes_per_day() -> u32 {
        480
    }

    pub fn workdays_per_week() -> u32 {
        5
    }

    pub fn start_date() -> NaiveDate {
        // 2026-03-02 为周一, 与默认的周工作制对齐
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap_or_default()
    }

    pub fn max_deferral_days() -> u32 {
        30
    }
}
