// ==========================================
// 设备综合效率实时监测系统 - 停机聚合引擎
// ==========================================
// 职责: 机组 + 时间窗 -> 计划/非计划停机合计 + 微停机分原因码明细
// 红线: Engine 不拼 SQL,停机记录经 DowntimeStore trait 注入
// 口径:
// - 记录贡献按与窗口的重叠时长计入(越界部分裁剪)
// - 显式 MICROSTOP 记录,以及短于阈值的 UNPLANNED 记录,按微停机归组
// - 微停机分钟同时计入非计划停机合计(属于非计划损失)
// ==========================================

use crate::domain::downtime::{DowntimeBreakdown, DowntimeRecord};
use crate::domain::types::DowntimeClass;
use crate::engine::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// DowntimeStore - 停机记录来源接口
// ==========================================
// 引擎层定义 trait,仓储层实现(依赖倒置)
pub trait DowntimeStore: Send + Sync {
    /// 查询与窗口有重叠的停机记录(按开始时间升序)
    fn find_overlapping(
        &self,
        machine_code: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<DowntimeRecord>, Box<dyn Error + Send + Sync>>;
}

// ==========================================
// DowntimeAggregator - 停机聚合引擎
// ==========================================
pub struct DowntimeAggregator {
    store: Arc<dyn DowntimeStore>,
    /// 微停机阈值(分钟): 非计划停机短于该值按微停机归组
    microstop_threshold_minutes: f64,
}

impl DowntimeAggregator {
    /// 构造函数
    ///
    /// # 参数
    /// - `store`: 停机记录来源
    /// - `microstop_threshold_minutes`: 微停机阈值(分钟)
    pub fn new(store: Arc<dyn DowntimeStore>, microstop_threshold_minutes: f64) -> Self {
        Self {
            store,
            microstop_threshold_minutes,
        }
    }

    /// 聚合窗口内的停机
    ///
    /// # 参数
    /// - `machine_code`: 机组代码
    /// - `window_start` / `window_end`: 聚合窗口,要求 start < end
    ///
    /// # 返回
    /// - Ok(DowntimeBreakdown): 聚合结果(窗口内无记录时为全零,不是错误)
    /// - Err(InvalidWindow): 窗口非法
    /// - Err(CalculationUnavailable): 停机记录来源失败
    pub fn aggregate(
        &self,
        machine_code: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> EngineResult<DowntimeBreakdown> {
        if window_start >= window_end {
            return Err(EngineError::InvalidWindow {
                start: window_start.to_rfc3339(),
                end: window_end.to_rfc3339(),
            });
        }

        let records = self
            .store
            .find_overlapping(machine_code, window_start, window_end)
            .map_err(|e| {
                EngineError::CalculationUnavailable(format!(
                    "停机记录查询失败: machine={}, {}",
                    machine_code, e
                ))
            })?;

        let mut breakdown = DowntimeBreakdown::empty();
        for record in &records {
            let minutes = record.overlap_minutes(window_start, window_end);
            if minutes <= 0.0 {
                continue;
            }

            match record.class {
                DowntimeClass::Planned => {
                    breakdown.planned_minutes += minutes;
                }
                DowntimeClass::Microstop => {
                    breakdown.add_microstop(&record.reason_code, minutes);
                    breakdown.unplanned_minutes += minutes;
                }
                DowntimeClass::Unplanned => {
                    // 短于阈值的非计划停机按微停机归组
                    if minutes < self.microstop_threshold_minutes {
                        breakdown.add_microstop(&record.reason_code, minutes);
                    }
                    breakdown.unplanned_minutes += minutes;
                }
            }
        }

        Ok(breakdown)
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// 内存停机记录桩(trait 接缝测试用)
    struct StubStore {
        records: Vec<DowntimeRecord>,
        fail: bool,
    }

    impl DowntimeStore for StubStore {
        fn find_overlapping(
            &self,
            machine_code: &str,
            window_start: DateTime<Utc>,
            window_end: DateTime<Utc>,
        ) -> Result<Vec<DowntimeRecord>, Box<dyn Error + Send + Sync>> {
            if self.fail {
                return Err("数据源不可用".into());
            }
            Ok(self
                .records
                .iter()
                .filter(|r| {
                    r.machine_code == machine_code
                        && r.started_at < window_end
                        && r.ended_at > window_start
                })
                .cloned()
                .collect())
        }
    }

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    fn record(
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        reason: &str,
        class: DowntimeClass,
    ) -> DowntimeRecord {
        DowntimeRecord {
            record_id: id.to_string(),
            machine_code: "1".to_string(),
            started_at: start,
            ended_at: end,
            reason_code: reason.to_string(),
            class,
        }
    }

    fn aggregator(records: Vec<DowntimeRecord>) -> DowntimeAggregator {
        DowntimeAggregator::new(
            Arc::new(StubStore {
                records,
                fail: false,
            }),
            5.0,
        )
    }

    #[test]
    fn test_invalid_window_rejected() {
        let agg = aggregator(vec![]);
        let result = agg.aggregate("1", ts(14, 0), ts(6, 0));
        assert!(matches!(result, Err(EngineError::InvalidWindow { .. })));

        // 零长度窗口同样拒绝
        let result = agg.aggregate("1", ts(6, 0), ts(6, 0));
        assert!(matches!(result, Err(EngineError::InvalidWindow { .. })));
    }

    #[test]
    fn test_empty_window_returns_zero_totals() {
        let agg = aggregator(vec![]);
        let breakdown = agg.aggregate("1", ts(6, 0), ts(14, 0)).unwrap();
        assert_eq!(breakdown.planned_minutes, 0.0);
        assert_eq!(breakdown.unplanned_minutes, 0.0);
        assert!(breakdown.microstops.is_empty());
    }

    #[test]
    fn test_reference_microstop_scenario() {
        // 两次 JAM (5 + 3 分钟), 一次 CHANGEOVER (10 分钟, 计划停机)
        let agg = aggregator(vec![
            record("D1", ts(8, 0), ts(8, 5), "JAM", DowntimeClass::Microstop),
            record(
                "D2",
                ts(9, 0),
                ts(9, 10),
                "CHANGEOVER",
                DowntimeClass::Microstop,
            ),
            record("D3", ts(10, 0), ts(10, 3), "JAM", DowntimeClass::Microstop),
        ]);

        let breakdown = agg.aggregate("1", ts(6, 0), ts(14, 0)).unwrap();
        assert_eq!(breakdown.microstops.len(), 2);
        // 首次出现顺序: JAM 先于 CHANGEOVER
        assert_eq!(breakdown.microstops[0].reason_code, "JAM");
        assert_eq!(breakdown.microstops[0].minutes, 8.0);
        assert_eq!(breakdown.microstops[1].reason_code, "CHANGEOVER");
        assert_eq!(breakdown.microstops[1].minutes, 10.0);
    }

    #[test]
    fn test_planned_and_unplanned_totals() {
        let agg = aggregator(vec![
            record("D1", ts(6, 30), ts(7, 0), "MAINT", DowntimeClass::Planned),
            record("D2", ts(9, 0), ts(9, 20), "FAULT", DowntimeClass::Unplanned),
        ]);

        let breakdown = agg.aggregate("1", ts(6, 0), ts(14, 0)).unwrap();
        assert_eq!(breakdown.planned_minutes, 30.0);
        assert_eq!(breakdown.unplanned_minutes, 20.0);
        // 20 分钟故障高于 5 分钟阈值,不算微停机
        assert!(breakdown.microstops.is_empty());
    }

    #[test]
    fn test_short_unplanned_reclassified_as_microstop() {
        let agg = aggregator(vec![record(
            "D1",
            ts(9, 0),
            ts(9, 3),
            "JAM",
            DowntimeClass::Unplanned,
        )]);

        let breakdown = agg.aggregate("1", ts(6, 0), ts(14, 0)).unwrap();
        // 微停机也计入非计划合计
        assert_eq!(breakdown.unplanned_minutes, 3.0);
        assert_eq!(breakdown.microstops.len(), 1);
        assert_eq!(breakdown.microstops[0].reason_code, "JAM");
    }

    #[test]
    fn test_records_clipped_to_window() {
        // 5:40-6:10 跨窗口边界,只计入 6:00 之后的 10 分钟
        let agg = aggregator(vec![record(
            "D1",
            ts(5, 40),
            ts(6, 10),
            "MAINT",
            DowntimeClass::Planned,
        )]);

        let breakdown = agg.aggregate("1", ts(6, 0), ts(14, 0)).unwrap();
        assert_eq!(breakdown.planned_minutes, 10.0);
    }

    #[test]
    fn test_store_failure_maps_to_calculation_unavailable() {
        let agg = DowntimeAggregator::new(
            Arc::new(StubStore {
                records: vec![],
                fail: true,
            }),
            5.0,
        );
        let result = agg.aggregate("1", ts(6, 0), ts(14, 0));
        assert!(matches!(
            result,
            Err(EngineError::CalculationUnavailable(_))
        ));
    }

    #[test]
    fn test_other_machine_records_ignored() {
        let mut other = record("D1", ts(8, 0), ts(8, 30), "FAULT", DowntimeClass::Unplanned);
        other.machine_code = "2".to_string();
        let agg = aggregator(vec![other]);

        let breakdown = agg.aggregate("1", ts(6, 0), ts(14, 0)).unwrap();
        assert_eq!(breakdown.unplanned_minutes, 0.0);
    }
}
