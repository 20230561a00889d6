// ==========================================
// 冷弯成型车间排产系统 - 机组资源领域模型
// ==========================================
// 红线: 资源目录构造后不可变, 引擎层只读
// 用途: 机组类型目录, 机台标识, 速率口径
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// MachineRate - 机组速率
// ==========================================
// 两种口径互斥: 长度速率 (成型机组) / 节拍速率 (折弯机组)
// 工序角色 (unit_count=0) 无速率
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineRate {
    /// 长度速率: 米/分钟
    LengthRate { m_per_min: f64 },
    /// 节拍速率: 秒/次
    CycleRate { seconds_per_op: f64 },
}

// ==========================================
// MachineType - 机组类型 (目录条目)
// ==========================================
// 不变量: unit_count > 0 时 rate 必须唯一存在;
//         unit_count = 0 (工序角色) 时 rate 必须为 None。
// 校验入口: PlantConfig::validate (config/plant_config.rs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineType {
    pub code: String,            // 机组代码 (如 YX28)
    pub name: String,            // 机组名称
    pub rate: Option<MachineRate>, // 速率 (工序角色为 None)
    pub power_kw: f64,           // 额定功率 (kW)
    pub unit_count: u32,         // 机台数 (0 = 工序角色, 不独立排程)
    pub operators_per_unit: u32, // 单台/单工序操作工需求
}

impl MachineType {
    /// 是否为工序角色 (只占用操作工, 不占用机台时间)
    pub fn is_process_role(&self) -> bool {
        self.unit_count == 0
    }

    /// 是否可独立排程
    pub fn is_schedulable(&self) -> bool {
        self.unit_count > 0
    }
}

// ==========================================
// UnitId - 机台标识
// ==========================================
// 结构化主键 (机组代码, 机台序号), 不使用字符串拼接再反解
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId {
    pub machine_code: String, // 机组代码
    pub unit_index: u32,      // 机台序号 (1 起)
}

impl UnitId {
    pub fn new(machine_code: impl Into<String>, unit_index: u32) -> Self {
        Self {
            machine_code: machine_code.into(),
            unit_index,
        }
    }
}

impl fmt::Display for UnitId {
    // 仅用于日志与报表展示, 业务键始终是结构化字段
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.machine_code, self.unit_index)
    }
}

// ==========================================
// MachineCatalog - 资源目录
// ==========================================
// 构造后不可变; 机台列表在构造时展开 (unit_count > 0 的每台一条)
#[derive(Debug, Clone)]
pub struct MachineCatalog {
    types: Vec<MachineType>,
    index_by_code: HashMap<String, usize>,
}

impl MachineCatalog {
    /// 由机组类型列表构建目录
    ///
    /// 重复的机组代码以后出现者为准 (配置校验阶段已拒绝重复代码)
    pub fn new(types: Vec<MachineType>) -> Self {
        let index_by_code = types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.code.clone(), i))
            .collect();
        Self {
            types,
            index_by_code,
        }
    }

    /// 按机组代码查询目录条目
    pub fn get(&self, code: &str) -> Option<&MachineType> {
        self.index_by_code.get(code).map(|&i| &self.types[i])
    }

    /// 全部机组类型
    pub fn types(&self) -> &[MachineType] {
        &self.types
    }

    /// 展开指定机组的机台列表 (序号 1..=unit_count)
    ///
    /// 未知代码或工序角色返回空列表
    pub fn units_of(&self, code: &str) -> Vec<UnitId> {
        match self.get(code) {
            Some(t) if t.is_schedulable() => (1..=t.unit_count)
                .map(|i| UnitId::new(t.code.clone(), i))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// 展开全部可排程机台
    pub fn all_units(&self) -> Vec<UnitId> {
        self.types
            .iter()
            .filter(|t| t.is_schedulable())
            .flat_map(|t| (1..=t.unit_count).map(|i| UnitId::new(t.code.clone(), i)))
            .collect()
    }
}
