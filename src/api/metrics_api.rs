// ==========================================
// 设备综合效率实时监测系统 - 指标 API
// ==========================================
// 职责: 对消息消费方/HTTP 层暴露的窄接口
// - ingest: 更新单个事实 + 按当前班次窗口重算
// - query: 读取当前快照副本
// - reset_for_new_order: 工单切换归零(并从主数据回填工单目标)
// 口径: ingest 对重复投递幂等(同值重放得到同样的指标,不报错)
// ==========================================

use crate::domain::metrics::MetricSnapshot;
use crate::domain::types::FactField;
use crate::engine::buffer::{MachineMetricsBuffer, RecalcOutcome};
use crate::engine::error::EngineError;
use crate::engine::events::{OeeEvent, OeeEventType, OptionalEventPublisher};
use crate::api::error::{ApiError, ApiResult};
use crate::repository::event_log_repo::EventLogRepository;
use crate::repository::process_order_repo::ProcessOrderRepository;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

// ==========================================
// MetricsApi - 指标查询/更新门面
// ==========================================
pub struct MetricsApi {
    buffer: Arc<MachineMetricsBuffer>,
    process_order_repo: Arc<ProcessOrderRepository>,
    event_log_repo: Arc<EventLogRepository>,
    event_publisher: OptionalEventPublisher,
}

impl MetricsApi {
    /// 构造函数
    pub fn new(
        buffer: Arc<MachineMetricsBuffer>,
        process_order_repo: Arc<ProcessOrderRepository>,
        event_log_repo: Arc<EventLogRepository>,
        event_publisher: OptionalEventPublisher,
    ) -> Self {
        Self {
            buffer,
            process_order_repo,
            event_log_repo,
            event_publisher,
        }
    }

    // ==========================================
    // ingest - 事实更新 + 当前班次重算
    // ==========================================

    /// 接收一条事实更新并立即重算
    ///
    /// # 参数
    /// - `machine_code`: 机组代码
    /// - `field_name`: 事实字段线名(SCREAMING_SNAKE_CASE)
    /// - `value`: 字段取值
    ///
    /// # 返回
    /// - Ok(MetricSnapshot): 重算后的快照副本
    /// - Err(InvalidInput): 字段未识别或取值非法,状态不变
    /// - Err(CalculationUnavailable): 协作方失败,事实已写入,
    ///   上一份快照仍然可读
    ///
    /// # 幂等性
    /// 同一 (machine, field, value) 重复投递会重放同样的覆盖写与重算,
    /// 得到等价的指标结果,不视为错误
    pub fn ingest(
        &self,
        machine_code: &str,
        field_name: &str,
        value: f64,
    ) -> ApiResult<MetricSnapshot> {
        let field = FactField::parse(field_name).ok_or_else(|| {
            ApiError::InvalidInput(format!("未识别的事实字段: {}", field_name))
        })?;

        self.buffer.update_fact(machine_code, field, value)?;

        let outcome = self
            .buffer
            .recalculate_current_shift(machine_code, Utc::now())?;

        self.append_audit(
            machine_code,
            "INGEST",
            json!({
                "field": field.as_str(),
                "value": value,
                "oee": outcome.snapshot.oee,
            })
            .to_string(),
        );
        self.event_publisher.publish(&OeeEvent::new(
            machine_code,
            OeeEventType::SnapshotUpdated,
            Some("ingest".to_string()),
        ));

        Ok(outcome.snapshot)
    }

    // ==========================================
    // query - 快照读取
    // ==========================================

    /// 读取机组当前快照(副本)
    ///
    /// # 返回
    /// - Err(NotFound): 机组从未收到事实更新
    /// - Err(NoDataYet): 有事实但从未重算
    pub fn query(&self, machine_code: &str) -> ApiResult<MetricSnapshot> {
        Ok(self.buffer.get_snapshot(machine_code)?)
    }

    /// 导出全部机组的当前快照(周期落库方使用)
    pub fn list_snapshots(&self) -> ApiResult<Vec<MetricSnapshot>> {
        Ok(self.buffer.list_snapshots()?)
    }

    /// 列出全部已知机组
    pub fn list_machines(&self) -> ApiResult<Vec<String>> {
        Ok(self.buffer.list_machines()?)
    }

    // ==========================================
    // reset_for_new_order - 工单切换
    // ==========================================

    /// 工单生命周期信号: 新工单开始
    ///
    /// 1. 归零事实集(保留机组代码,上一份快照保持可读)
    /// 2. 若主数据存在执行中工单,回填计划产量与目标速率
    pub fn reset_for_new_order(&self, machine_code: &str) -> ApiResult<()> {
        self.buffer.reset_for_new_order(machine_code)?;

        // 主数据回填: 查询失败按无工单处理,不阻断归零
        let seeded_order = match self.process_order_repo.find_active_for_machine(machine_code) {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(
                    "新工单主数据查询失败,跳过回填: machine={}, {}",
                    machine_code,
                    e
                );
                None
            }
        };

        if let Some(order) = &seeded_order {
            if order.planned_quantity > 0.0 {
                self.buffer.update_fact(
                    machine_code,
                    FactField::PlannedProductionQuantity,
                    order.planned_quantity,
                )?;
            }
            if order.target_performance > 0.0 {
                self.buffer.update_fact(
                    machine_code,
                    FactField::TargetPerformance,
                    order.target_performance,
                )?;
            }
        }

        self.append_audit(
            machine_code,
            "RESET_ORDER",
            json!({
                "seeded_order": seeded_order.as_ref().map(|o| o.order_id.clone()),
            })
            .to_string(),
        );
        self.event_publisher.publish(&OeeEvent::new(
            machine_code,
            OeeEventType::OrderReset,
            Some("process-order-lifecycle".to_string()),
        ));

        Ok(())
    }

    // ==========================================
    // recalculate - 手动/定时触发重算
    // ==========================================

    /// 按当前班次窗口重算一台机组(定时器与运维手动触发共用)
    pub fn recalculate_now(&self, machine_code: &str) -> ApiResult<MetricSnapshot> {
        let outcome: RecalcOutcome = self
            .buffer
            .recalculate_current_shift(machine_code, Utc::now())?;

        self.event_publisher.publish(&OeeEvent::new(
            machine_code,
            OeeEventType::SnapshotUpdated,
            Some("timer".to_string()),
        ));
        Ok(outcome.snapshot)
    }

    /// 定时重算全部已知机组
    ///
    /// 单机组失败只告警,不影响其他机组(故障隔离)
    pub fn recalculate_all(&self) -> ApiResult<usize> {
        let machines = self.buffer.list_machines()?;
        let mut refreshed = 0;
        for machine_code in &machines {
            match self.buffer.recalculate_current_shift(machine_code, Utc::now()) {
                Ok(_) => refreshed += 1,
                Err(EngineError::SnapshotNotFound(_)) | Err(EngineError::UnknownMachine(_)) => {
                    // 理论上 list_machines 返回的机组都存在,保守跳过
                }
                Err(e) => {
                    tracing::warn!("定时重算失败: machine={}, {}", machine_code, e);
                }
            }
        }
        Ok(refreshed)
    }

    // ==========================================
    // 内部工具
    // ==========================================

    /// 追加审计流水(失败只告警,不阻断业务操作)
    fn append_audit(&self, machine_code: &str, action_type: &str, payload: String) {
        if let Err(e) = self
            .event_log_repo
            .append(machine_code, action_type, Some(payload))
        {
            tracing::warn!(
                "审计流水写入失败: machine={}, action={}, {}",
                machine_code,
                action_type,
                e
            );
        }
    }
}
