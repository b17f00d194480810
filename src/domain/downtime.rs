// ==========================================
// 设备综合效率实时监测系统 - 停机领域模型
// ==========================================
// 职责: 停机记录 + 停机聚合结果
// 红线: DowntimeBreakdown 为瞬态产物,引擎即算即用,不落库
// ==========================================

use crate::domain::types::DowntimeClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// DowntimeRecord - 停机记录
// ==========================================
// 来源: 外部采集系统(消息主题/文件导入)
// 对齐: downtime_record 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DowntimeRecord {
    pub record_id: String,          // 记录ID
    pub machine_code: String,       // 机组代码
    pub started_at: DateTime<Utc>,  // 停机开始
    pub ended_at: DateTime<Utc>,    // 停机结束
    pub reason_code: String,        // 原因码(如 JAM / CHANGEOVER)
    pub class: DowntimeClass,       // 停机分类
}

impl DowntimeRecord {
    /// 记录全长(分钟),时间倒挂按 0 处理
    pub fn duration_minutes(&self) -> f64 {
        let secs = (self.ended_at - self.started_at).num_seconds();
        if secs <= 0 {
            0.0
        } else {
            secs as f64 / 60.0
        }
    }

    /// 与给定窗口的重叠时长(分钟),无重叠返回 0
    pub fn overlap_minutes(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> f64 {
        let start = self.started_at.max(window_start);
        let end = self.ended_at.min(window_end);
        let secs = (end - start).num_seconds();
        if secs <= 0 {
            0.0
        } else {
            secs as f64 / 60.0
        }
    }
}

// ==========================================
// ReasonTotal - 单原因码的微停机汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonTotal {
    pub reason_code: String, // 原因码
    pub minutes: f64,        // 累计分钟
    pub occurrences: u32,    // 发生次数
}

// ==========================================
// DowntimeBreakdown - 窗口内停机聚合结果
// ==========================================
// 微停机按原因码归组,顺序为首次出现顺序(并列时长不重排)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DowntimeBreakdown {
    pub planned_minutes: f64,        // 计划停机分钟合计
    pub unplanned_minutes: f64,      // 非计划停机分钟合计(含微停机)
    pub microstops: Vec<ReasonTotal>, // 微停机分原因码明细
}

impl DowntimeBreakdown {
    /// 空聚合结果(窗口内无停机记录时返回,不视为错误)
    pub fn empty() -> Self {
        Self {
            planned_minutes: 0.0,
            unplanned_minutes: 0.0,
            microstops: Vec::new(),
        }
    }

    /// 微停机分钟合计
    pub fn microstop_minutes(&self) -> f64 {
        self.microstops.iter().map(|r| r.minutes).sum()
    }

    /// 累加一次微停机(按原因码归组,保持首次出现顺序)
    pub fn add_microstop(&mut self, reason_code: &str, minutes: f64) {
        match self
            .microstops
            .iter_mut()
            .find(|r| r.reason_code == reason_code)
        {
            Some(entry) => {
                entry.minutes += minutes;
                entry.occurrences += 1;
            }
            None => self.microstops.push(ReasonTotal {
                reason_code: reason_code.to_string(),
                minutes,
                occurrences: 1,
            }),
        }
    }
}

impl Default for DowntimeBreakdown {
    fn default() -> Self {
        Self::empty()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    #[test]
    fn test_duration_and_overlap() {
        let rec = DowntimeRecord {
            record_id: "D001".to_string(),
            machine_code: "1".to_string(),
            started_at: ts(7, 50),
            ended_at: ts(8, 10),
            reason_code: "JAM".to_string(),
            class: DowntimeClass::Unplanned,
        };

        assert_eq!(rec.duration_minutes(), 20.0);
        // 窗口 8:00-16:00, 只计入窗口内的 10 分钟
        assert_eq!(rec.overlap_minutes(ts(8, 0), ts(16, 0)), 10.0);
        // 完全在窗口外
        assert_eq!(rec.overlap_minutes(ts(9, 0), ts(16, 0)), 0.0);
    }

    #[test]
    fn test_breakdown_groups_by_first_occurrence() {
        let mut breakdown = DowntimeBreakdown::empty();
        breakdown.add_microstop("JAM", 5.0);
        breakdown.add_microstop("CHANGEOVER", 10.0);
        breakdown.add_microstop("JAM", 3.0);

        assert_eq!(breakdown.microstops.len(), 2);
        assert_eq!(breakdown.microstops[0].reason_code, "JAM");
        assert_eq!(breakdown.microstops[0].minutes, 8.0);
        assert_eq!(breakdown.microstops[0].occurrences, 2);
        assert_eq!(breakdown.microstops[1].reason_code, "CHANGEOVER");
        assert_eq!(breakdown.microstops[1].minutes, 10.0);
        assert_eq!(breakdown.microstop_minutes(), 18.0);
    }
}
