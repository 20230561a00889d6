// ==========================================
// 冷弯成型车间排产系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务不变量
// 红线: 不含资源占用逻辑,不含引擎逻辑
// ==========================================

pub mod machine;
pub mod order;
pub mod plan;
pub mod types;

// 重导出核心类型
pub use machine::{MachineCatalog, MachineRate, MachineType, UnitId};
pub use order::{Assignment, DeferralRecord, Order, OrderQuantity};
pub use plan::{DayRecord, ProductionLog, ProductionLogEntry, ScheduleSummary};
pub use types::{OrderStatus, Priority, ProductType, Workflow};
