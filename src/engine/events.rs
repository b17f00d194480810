// ==========================================
// 设备综合效率实时监测系统 - 引擎层事件发布
// ==========================================
// 职责: 定义指标事件发布 trait,实现依赖倒置
// 说明: Engine 层定义 trait,下游(时序库写入方/消息桥)实现适配器
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

// ==========================================
// 指标事件类型
// ==========================================

/// 指标事件触发类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OeeEventType {
    /// 事实字段更新
    FactUpdated,
    /// 快照整体替换
    SnapshotUpdated,
    /// 新工单归零
    OrderReset,
    /// 手动触发
    ManualTrigger,
}

impl OeeEventType {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            OeeEventType::FactUpdated => "FactUpdated",
            OeeEventType::SnapshotUpdated => "SnapshotUpdated",
            OeeEventType::OrderReset => "OrderReset",
            OeeEventType::ManualTrigger => "ManualTrigger",
        }
    }
}

/// 指标事件
///
/// Engine 层发布的事件,含机组代码、触发类型和来源描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OeeEvent {
    /// 事件 ID
    pub event_id: String,
    /// 机组代码
    pub machine_code: String,
    /// 事件类型
    pub event_type: OeeEventType,
    /// 事件来源描述
    pub source: Option<String>,
    /// 发生时刻
    pub occurred_at: DateTime<Utc>,
}

impl OeeEvent {
    /// 创建事件
    pub fn new(machine_code: &str, event_type: OeeEventType, source: Option<String>) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            machine_code: machine_code.to_string(),
            event_type,
            source,
            occurred_at: Utc::now(),
        }
    }
}

// ==========================================
// 事件发布接口
// ==========================================

/// 指标事件发布 trait
///
/// 发布失败不回滚业务操作,由实现方自行记录
pub trait OeeEventPublisher: Send + Sync {
    fn publish(&self, event: &OeeEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空实现(测试与无下游场景)
pub struct NoOpEventPublisher;

impl OeeEventPublisher for NoOpEventPublisher {
    fn publish(&self, _event: &OeeEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// 可选事件发布器包装
///
/// 发布器缺失时静默跳过;发布失败只告警不向上传播
#[derive(Clone)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn OeeEventPublisher>>,
}

impl OptionalEventPublisher {
    /// 带发布器
    pub fn with_publisher(publisher: Arc<dyn OeeEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// 不带发布器
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件(失败只告警)
    pub fn publish(&self, event: &OeeEvent) {
        if let Some(publisher) = &self.inner {
            if let Err(e) = publisher.publish(event) {
                tracing::warn!(
                    "事件发布失败: machine={}, type={}, {}",
                    event.machine_code,
                    event.event_type.as_str(),
                    e
                );
            }
        }
    }
}
