// ==========================================
// 设备综合效率实时监测系统 - 工单领域模型
// ==========================================
// 职责: 生产工单(过程订单)主数据
// 用途: 新工单开始时为事实集提供计划产量与目标速率
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工单状态 (Process Order Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Planned,   // 已计划
    Active,    // 执行中
    Completed, // 已完成
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Planned => write!(f, "PLANNED"),
            OrderStatus::Active => write!(f, "ACTIVE"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl OrderStatus {
    /// 从字符串解析工单状态(未识别时按已计划处理)
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ACTIVE" => OrderStatus::Active,
            "COMPLETED" => OrderStatus::Completed,
            _ => OrderStatus::Planned,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Planned => "PLANNED",
            OrderStatus::Active => "ACTIVE",
            OrderStatus::Completed => "COMPLETED",
        }
    }
}

// ==========================================
// ProcessOrder - 生产工单
// ==========================================
// 对齐: process_order 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOrder {
    pub order_id: String,               // 工单号
    pub machine_code: String,           // 执行机组
    pub planned_quantity: f64,          // 计划产量(件)
    pub target_performance: f64,        // 目标产出速率(件/小时)
    pub starts_at: DateTime<Utc>,       // 计划开始
    pub ends_at: Option<DateTime<Utc>>, // 计划结束(开放工单为 None)
    pub status: OrderStatus,            // 工单状态
}
