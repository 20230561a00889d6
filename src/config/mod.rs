// ==========================================
// 冷弯成型车间排产系统 - 配置层
// ==========================================
// 职责: 车间静态配置 (资源目录 + 全厂常量)
// ==========================================

pub mod plant_config;

pub use plant_config::{ConfigError, PlantConfig};
