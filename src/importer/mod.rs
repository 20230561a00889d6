// ==========================================
// 冷弯成型车间排产系统 - 导入层
// ==========================================
// 职责: 订单簿文件 -> 校验合格的领域订单
// 红线: 校验在入口完成, 引擎层信任导入产物
// ==========================================

pub mod error;
pub mod order_importer;

pub use error::{ImportError, ImportResult};
pub use order_importer::{ImportReport, OrderImporter, RejectedRow, EXPECTED_HEADER};
