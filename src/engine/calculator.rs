// ==========================================
// 设备综合效率实时监测系统 - OEE 计算引擎
// ==========================================
// 职责: 事实集 + 停机聚合 + 班次窗口 -> 指标快照
// 红线: 计算永不报错,全部退化输入按文档化默认值兜底
// 口径:
// - 可用率 = (计划时间 - 计划停机 - 非计划停机) / 计划时间
// - 表现率 = 实际速率 / 目标速率, 钳位 [0,1]
// - 质量率 = 合格品 / 总产出, 钳位 [0,1]
// - OEE = 可用率 x 表现率 x 质量率 x 100
// ==========================================

use crate::domain::downtime::DowntimeBreakdown;
use crate::domain::machine::MachineFactSet;
use crate::domain::metrics::MetricSnapshot;
use crate::domain::shift::ShiftWindow;
use crate::domain::types::OeeGrade;
use chrono::Utc;
use std::fmt;
use uuid::Uuid;

// ==========================================
// CalculationWarning - 数据质量告警
// ==========================================
// 告警只记录不中断: 三个分量与 OEE 始终落在约定区间
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationWarning {
    /// 班次窗口为零长度(无匹配班次或窗口倒挂)
    DegenerateShiftWindow { machine_code: String },
    /// 停机合计超过计划时间(可用率钳位为 0)
    DowntimeExceedsWindow {
        machine_code: String,
        downtime_minutes: f64,
        planned_minutes: f64,
    },
    /// 合格数超过总产出(质量率钳位为 1)
    YieldExceedsQuantity {
        machine_code: String,
        yield_count: f64,
        quantity: f64,
    },
}

impl fmt::Display for CalculationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationWarning::DegenerateShiftWindow { machine_code } => {
                write!(f, "机组 {} 班次窗口为零长度, 可用率记 0", machine_code)
            }
            CalculationWarning::DowntimeExceedsWindow {
                machine_code,
                downtime_minutes,
                planned_minutes,
            } => write!(
                f,
                "机组 {} 停机合计 {:.1} 分钟超过计划时间 {:.1} 分钟, 可用率钳位为 0",
                machine_code, downtime_minutes, planned_minutes
            ),
            CalculationWarning::YieldExceedsQuantity {
                machine_code,
                yield_count,
                quantity,
            } => write!(
                f,
                "机组 {} 合格数 {:.1} 超过总产出 {:.1}, 质量率钳位为 1",
                machine_code, yield_count, quantity
            ),
        }
    }
}

// ==========================================
// OeeComputation - 单次计算输出
// ==========================================
#[derive(Debug, Clone)]
pub struct OeeComputation {
    pub snapshot: MetricSnapshot,
    pub warnings: Vec<CalculationWarning>,
}

// ==========================================
// OeeCalculator - OEE 计算引擎
// ==========================================
pub struct OeeCalculator {
    // 无状态引擎,不需要注入依赖
    // 停机聚合与班次解析由调用方完成
}

impl OeeCalculator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算一份指标快照
    ///
    /// # 参数
    /// - `facts`: 机组事实集(缓冲区持有的当前值)
    /// - `breakdown`: 窗口内停机聚合结果
    /// - `window`: 解析后的班次窗口
    ///
    /// # 返回
    /// OeeComputation: 快照 + 数据质量告警(可能为空)
    pub fn compute(
        &self,
        facts: &MachineFactSet,
        breakdown: &DowntimeBreakdown,
        window: &ShiftWindow,
    ) -> OeeComputation {
        let mut warnings = Vec::new();

        // 1. 可用率
        let planned_time_minutes = window.duration_minutes();
        let planned_downtime_minutes = breakdown.planned_minutes + window.break_minutes;
        let availability = self.calculate_availability(
            &facts.machine_code,
            planned_time_minutes,
            planned_downtime_minutes,
            breakdown.unplanned_minutes,
            &mut warnings,
        );

        // 2. 表现率
        let performance =
            self.calculate_performance(facts.actual_performance, facts.target_performance);

        // 3. 质量率
        let quality = self.calculate_quality(
            &facts.machine_code,
            facts.actual_production_yield,
            facts.actual_production_quantity,
            &mut warnings,
        );

        // 4. 合成 OEE
        let oee = availability * performance * quality * 100.0;

        let snapshot = MetricSnapshot {
            snapshot_id: Uuid::new_v4().to_string(),
            machine_code: facts.machine_code.clone(),
            availability,
            performance,
            quality,
            oee,
            grade: OeeGrade::from_score(oee),
            planned_time_minutes,
            planned_downtime_minutes,
            unplanned_downtime_minutes: breakdown.unplanned_minutes,
            microstop_minutes: breakdown.microstop_minutes(),
            shift_id: window.shift_id.clone(),
            window_start: window.window_start,
            window_end: window.window_end,
            computed_at: Utc::now(),
        };

        OeeComputation { snapshot, warnings }
    }

    // ==========================================
    // 分量计算
    // ==========================================

    /// 可用率 = (计划时间 - 计划停机 - 非计划停机) / 计划时间
    ///
    /// 退化口径:
    /// - 计划时间 <= 0: 记 0 并告警(除零保护)
    /// - 停机合计超过计划时间: 钳位为 0 并告警
    fn calculate_availability(
        &self,
        machine_code: &str,
        planned_time_minutes: f64,
        planned_downtime_minutes: f64,
        unplanned_downtime_minutes: f64,
        warnings: &mut Vec<CalculationWarning>,
    ) -> f64 {
        if planned_time_minutes <= 0.0 {
            warnings.push(CalculationWarning::DegenerateShiftWindow {
                machine_code: machine_code.to_string(),
            });
            return 0.0;
        }

        let downtime = planned_downtime_minutes + unplanned_downtime_minutes;
        if downtime > planned_time_minutes {
            warnings.push(CalculationWarning::DowntimeExceedsWindow {
                machine_code: machine_code.to_string(),
                downtime_minutes: downtime,
                planned_minutes: planned_time_minutes,
            });
            return 0.0;
        }

        let availability = (planned_time_minutes - downtime) / planned_time_minutes;
        availability.clamp(0.0, 1.0)
    }

    /// 表现率 = 实际速率 / 目标速率, 钳位 [0,1]
    ///
    /// 退化口径: 目标速率 <= 0 记 0(未设置目标不虚报表现)
    fn calculate_performance(&self, actual_performance: f64, target_performance: f64) -> f64 {
        if target_performance <= 0.0 {
            return 0.0;
        }
        // 超出目标按 1.0 封顶,OEE 不允许越过物理上限
        (actual_performance / target_performance).clamp(0.0, 1.0)
    }

    /// 质量率 = 合格品 / 总产出, 钳位 [0,1]
    ///
    /// 退化口径:
    /// - 总产出 = 0: 记 0(尚无产出按零质量处理,不是未定义)
    /// - 合格数 > 总产出: 钳位为 1 并告警(数据质量问题)
    fn calculate_quality(
        &self,
        machine_code: &str,
        yield_count: f64,
        quantity: f64,
        warnings: &mut Vec<CalculationWarning>,
    ) -> f64 {
        if quantity <= 0.0 {
            return 0.0;
        }
        if yield_count > quantity {
            warnings.push(CalculationWarning::YieldExceedsQuantity {
                machine_code: machine_code.to_string(),
                yield_count,
                quantity,
            });
            return 1.0;
        }
        (yield_count / quantity).clamp(0.0, 1.0)
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for OeeCalculator {
    fn default() -> Self {
        Self::new()
    }
}
