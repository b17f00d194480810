// ==========================================
// 设备综合效率实时监测系统 - 指标快照模型
// ==========================================
// 职责: 每机组最新一次计算的不可变指标快照
// 红线: 快照整体替换,读方永远看不到半新半旧的字段组合
// ==========================================

use crate::domain::types::OeeGrade;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// MetricSnapshot - OEE 指标快照
// ==========================================
// 派生关系: MachineFactSet + 窗口停机聚合 + 班次窗口 -> 快照
// 三个分量均为 [0,1] 区间分数, oee 为 [0,100] 百分比
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSnapshot {
    // ===== 标识 =====
    pub snapshot_id: String,  // 快照ID(UUID)
    pub machine_code: String, // 机组代码

    // ===== 指标分量 =====
    pub availability: f64, // 可用率 [0,1]
    pub performance: f64,  // 表现率 [0,1]
    pub quality: f64,      // 质量率 [0,1]
    pub oee: f64,          // OEE 百分比 [0,100]
    pub grade: OeeGrade,   // 驾驶舱等级

    // ===== 计算上下文(驾驶舱展示用) =====
    pub planned_time_minutes: f64,      // 计划生产时间(分钟)
    pub planned_downtime_minutes: f64,  // 计划停机分钟(含班内休息)
    pub unplanned_downtime_minutes: f64, // 非计划停机分钟
    pub microstop_minutes: f64,         // 微停机分钟
    pub shift_id: Option<String>,       // 命中的班次

    // ===== 时间 =====
    pub window_start: DateTime<Utc>, // 计算窗口开始
    pub window_end: DateTime<Utc>,   // 计算窗口结束
    pub computed_at: DateTime<Utc>,  // 计算时刻
}

impl MetricSnapshot {
    /// 三个分量与 OEE 是否都在文档约定区间内
    pub fn is_in_range(&self) -> bool {
        let unit = |v: f64| (0.0..=1.0).contains(&v);
        unit(self.availability)
            && unit(self.performance)
            && unit(self.quality)
            && (0.0..=100.0).contains(&self.oee)
    }
}
