// ==========================================
// 冷弯成型车间排产系统 - 核心库
// ==========================================
// 技术栈: Rust + CSV/JSON 文件接口
// 系统定位: 订单分派与资源分配引擎 (单线程同步, 结果可复现)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 排产规则
pub mod engine;

// 导入层 - 订单簿接入
pub mod importer;

// 配置层 - 车间配置
pub mod config;

// 报表层 - 结果输出
pub mod report;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{OrderStatus, Priority, ProductType, Workflow};

// 领域实体
pub use domain::{
    Assignment, DayRecord, DeferralRecord, MachineCatalog, MachineRate, MachineType, Order,
    OrderQuantity, ProductionLog, ProductionLogEntry, ScheduleSummary, UnitId,
};

// 引擎
pub use engine::{
    Dispatcher, EstimateEngine, OperatorLedger, ScheduleError, ScheduleRun, TimelineStore,
    WorkCalendar, WorkflowResolver,
};

// 配置
pub use config::{ConfigError, PlantConfig};

// 导入与报表
pub use importer::{ImportError, ImportReport, OrderImporter};
pub use report::{ReportError, ReportRenderer};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "冷弯成型车间排产系统";

// ==========================================
// 预编译检查
// ==========================================
