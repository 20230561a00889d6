// ==========================================
// 冷弯成型车间排产系统 - 工时估算引擎
// ==========================================
// 职责: 由订单工艺量与机组速率参数推导预计完成时长 (ETC) 与电耗
// 红线: 纯函数, 不读写任何共享状态; 非法速率以哨兵值上浮, 由调用方判定
// ==========================================

/// 工时估算引擎
///
/// 成型类订单按"长度 / 线速率"估算, 剪折类订单按"折弯次数 x 单次节拍"估算。
/// 速率非正或非有限时返回 `f64::INFINITY` 哨兵, 工作流解析引擎据此
/// 将订单判为不可排, 估算本身不产生错误。
pub struct EstimateEngine;

impl EstimateEngine {
    pub fn new() -> Self {
        Self
    }

    /// 成型工时: 总长度(米) / 线速率(米/分钟), 单位分钟
    ///
    /// # 参数
    /// * `length_m` - 订单总成型长度 (米)
    /// * `m_per_min` - 机组线速率 (米/分钟)
    ///
    /// # 返回
    /// * 预计时长 (分钟, 小数); 速率非正或非有限时为 `f64::INFINITY`
    pub fn forming_minutes(&self, length_m: f64, m_per_min: f64) -> f64 {
        if !m_per_min.is_finite() || m_per_min <= 0.0 {
            return f64::INFINITY;
        }
        length_m / m_per_min
    }

    /// 剪折工时: 折弯总次数 x 单次节拍(秒) / 60, 单位分钟
    ///
    /// # 参数
    /// * `total_bends` - 折弯总次数 (单件折弯数 x 件数)
    /// * `seconds_per_op` - 单次折弯节拍 (秒)
    ///
    /// # 返回
    /// * 预计时长 (分钟, 小数); 节拍非正或非有限时为 `f64::INFINITY`
    pub fn bending_minutes(&self, total_bends: u64, seconds_per_op: f64) -> f64 {
        if !seconds_per_op.is_finite() || seconds_per_op <= 0.0 {
            return f64::INFINITY;
        }
        (total_bends as f64) * seconds_per_op / 60.0
    }

    /// 电耗估算: 额定功率(kW) x 占用时长(分钟) / 60, 单位 kWh
    ///
    /// 时长为负或非有限时按 0 计, 电耗是报表口径而非排产约束。
    pub fn energy_kwh(&self, power_kw: f64, minutes: f64) -> f64 {
        if !minutes.is_finite() || minutes < 0.0 {
            return 0.0;
        }
        power_kw * minutes / 60.0
    }
}

impl Default for EstimateEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
