// ==========================================
// 设备综合效率实时监测系统 - 班次领域模型
// ==========================================
// 职责: 班次模型(周循环) + 解析后的计划生产窗口
// 说明: 循环规则固定为按星期重复,更复杂的日历属外部数据问题
// ==========================================

use crate::domain::types::ShiftScope;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ShiftModel - 班次模型
// ==========================================
// 对齐: shift_model 表
// 约定: end_time <= start_time 表示跨午夜班次(次日结束)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftModel {
    pub shift_id: String,      // 班次ID
    pub scope: ShiftScope,     // 作用域(机组/区域/全厂)
    pub scope_code: String,    // 作用域代码(机组代码/区域代码/"*")
    pub weekday: u8,           // 0=周一 .. 6=周日(班次开始日)
    pub start_time: NaiveTime, // 班次开始时刻
    pub end_time: NaiveTime,   // 班次结束时刻
    pub break_minutes: f64,    // 班内计划休息分钟(计入计划停机)
}

impl ShiftModel {
    /// 是否跨午夜班次
    pub fn crosses_midnight(&self) -> bool {
        self.end_time <= self.start_time
    }
}

// ==========================================
// ShiftWindow - 解析后的计划生产窗口
// ==========================================
// 零长度窗口(start == end)表示该时刻无匹配班次,
// 下游计算层按除零保护口径将可用率记为 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub window_start: DateTime<Utc>, // 窗口开始
    pub window_end: DateTime<Utc>,   // 窗口结束
    pub break_minutes: f64,          // 班内计划休息分钟
    pub shift_id: Option<String>,    // 命中的班次ID(零长度窗口为 None)
}

impl ShiftWindow {
    /// 构造零长度窗口(无匹配班次)
    pub fn degenerate(at: DateTime<Utc>) -> Self {
        Self {
            window_start: at,
            window_end: at,
            break_minutes: 0.0,
            shift_id: None,
        }
    }

    /// 窗口时长(分钟),零长度窗口返回 0
    pub fn duration_minutes(&self) -> f64 {
        let secs = (self.window_end - self.window_start).num_seconds();
        if secs <= 0 {
            0.0
        } else {
            secs as f64 / 60.0
        }
    }

    /// 是否零长度窗口
    pub fn is_degenerate(&self) -> bool {
        self.window_end <= self.window_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_crosses_midnight() {
        let day = ShiftModel {
            shift_id: "S-EARLY".to_string(),
            scope: ShiftScope::Plant,
            scope_code: "*".to_string(),
            weekday: 0,
            start_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            break_minutes: 30.0,
        };
        assert!(!day.crosses_midnight());

        let night = ShiftModel {
            shift_id: "S-NIGHT".to_string(),
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            ..day
        };
        assert!(night.crosses_midnight());
    }

    #[test]
    fn test_window_duration_and_degenerate() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();
        let window = ShiftWindow {
            window_start: start,
            window_end: end,
            break_minutes: 30.0,
            shift_id: Some("S-EARLY".to_string()),
        };
        assert_eq!(window.duration_minutes(), 480.0);
        assert!(!window.is_degenerate());

        let degenerate = ShiftWindow::degenerate(start);
        assert_eq!(degenerate.duration_minutes(), 0.0);
        assert!(degenerate.is_degenerate());
        assert!(degenerate.shift_id.is_none());
    }
}
