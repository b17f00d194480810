// ==========================================
// 设备综合效率实时监测系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 装配顺序: 连接 -> 仓储层 -> 引擎层 -> API层
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::MetricsApi;
use crate::config::ConfigManager;
use crate::db;
use crate::engine::{
    DowntimeAggregator, DowntimeStore, MachineMetricsBuffer, OeeCalculator,
    OptionalEventPublisher, ShiftCalendarResolver, ShiftModelStore,
};
use crate::repository::{
    DowntimeRecordRepository, EventLogRepository, MachineMasterRepository,
    ProcessOrderRepository, ShiftModelRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 指标API(门面)
    pub metrics_api: Arc<MetricsApi>,

    /// 指标缓冲区(定时重算循环使用)
    pub buffer: Arc<MachineMetricsBuffer>,

    /// 机组主数据仓储
    pub machine_repo: Arc<MachineMasterRepository>,

    /// 班次模型仓储
    pub shift_model_repo: Arc<ShiftModelRepository>,

    /// 停机记录仓储
    pub downtime_repo: Arc<DowntimeRecordRepository>,

    /// 生产工单仓储
    pub process_order_repo: Arc<ProcessOrderRepository>,

    /// 操作审计仓储
    pub event_log_repo: Arc<EventLogRepository>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会:
    /// 1. 打开数据库连接并引导 schema
    /// 2. 初始化所有 Repository
    /// 3. 初始化所有 Engine
    /// 4. 创建 API 实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState,数据库路径: {}", db_path);

        // 创建数据库连接(共享连接)
        let conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        db::init_schema(&conn).map_err(|e| format!("schema 引导失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let machine_repo = Arc::new(MachineMasterRepository::from_connection(conn.clone()));
        let process_order_repo = Arc::new(ProcessOrderRepository::from_connection(conn.clone()));
        let downtime_repo = Arc::new(DowntimeRecordRepository::from_connection(conn.clone()));
        let shift_model_repo = Arc::new(ShiftModelRepository::from_connection(conn.clone()));
        let event_log_repo = Arc::new(EventLogRepository::from_connection(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));

        // ==========================================
        // 初始化Engine层
        // ==========================================

        // OEE 计算引擎(无状态)
        let calculator = Arc::new(OeeCalculator::new());

        // 停机聚合引擎
        let aggregator = Arc::new(DowntimeAggregator::new(
            downtime_repo.clone() as Arc<dyn DowntimeStore>,
            config_manager.microstop_threshold_minutes(),
        ));

        // 班次日历解析引擎
        let shift_resolver = Arc::new(ShiftCalendarResolver::new(
            shift_model_repo.clone() as Arc<dyn ShiftModelStore>,
        ));

        // 机组指标缓冲区(有状态核心)
        let buffer = Arc::new(MachineMetricsBuffer::new(
            calculator,
            aggregator,
            shift_resolver,
            config_manager.recalc_slow_warn_ms(),
        ));

        // ==========================================
        // 初始化API层
        // ==========================================
        let metrics_api = Arc::new(MetricsApi::new(
            buffer.clone(),
            process_order_repo.clone(),
            event_log_repo.clone(),
            OptionalEventPublisher::none(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            metrics_api,
            buffer,
            machine_repo,
            shift_model_repo,
            downtime_repo,
            process_order_repo,
            event_log_repo,
            config_manager,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 OEE_ENGINE_DB_PATH 优先
/// - 其次用户数据目录/oee-engine/oee_engine.db
/// - 拿不到数据目录时回退当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径(便于调试/测试/CI)
    if let Ok(path) = std::env::var("OEE_ENGINE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./oee_engine.db");

    if let Some(data_dir) = dirs::data_dir() {
        path = data_dir.join("oee-engine");
        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("oee_engine.db");
    }

    path.to_string_lossy().to_string()
}
