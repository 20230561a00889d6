// ==========================================
// 冷弯成型车间排产系统 - 引擎层
// ==========================================
// 职责: 实现排产业务规则, 不做持久化与 IO
// 红线: 引擎不读文件不写文件, 所有拒绝/顺延必须输出 reason
// ==========================================

pub mod calendar;
pub mod dispatcher;
pub mod error;
pub mod estimate;
pub mod operators;
pub mod timeline;
pub mod workflow;

// 重导出核心引擎
pub use calendar::WorkCalendar;
pub use dispatcher::{Dispatcher, ScheduleRun};
pub use error::ScheduleError;
pub use estimate::EstimateEngine;
pub use operators::OperatorLedger;
pub use timeline::{TimeSlot, TimelineStore};
pub use workflow::{machine_codes, Resolution, WorkOrderPlan, WorkflowResolver};
