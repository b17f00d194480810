// ==========================================
// 设备综合效率实时监测系统 - 应用层
// ==========================================
// 职责: 服务装配与共享状态
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
