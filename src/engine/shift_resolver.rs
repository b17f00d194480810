// ==========================================
// 设备综合效率实时监测系统 - 班次日历解析引擎
// ==========================================
// 职责: 机组 + 时刻 -> 当前计划生产窗口
// 红线: Engine 不拼 SQL,班次模型经 ShiftModelStore trait 注入
// 裁决口径(确定性,有测试背书):
// 1. 机组级 > 区域级 > 全厂级
// 2. 同作用域取窗口开始更早者
// 3. 仍并列时取 shift_id 字典序最小者
// 无匹配班次返回零长度窗口,下游可用率按除零保护记 0
// ==========================================

use crate::domain::shift::{ShiftModel, ShiftWindow};
use crate::engine::error::{EngineError, EngineResult};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// ShiftModelStore - 班次模型来源接口
// ==========================================
// 引擎层定义 trait,仓储层实现(依赖倒置)
pub trait ShiftModelStore: Send + Sync {
    /// 查询机组在某星期日(0=周一..6=周日)可能适用的班次模型
    fn find_applicable(
        &self,
        machine_code: &str,
        weekday: u8,
    ) -> Result<Vec<ShiftModel>, Box<dyn Error + Send + Sync>>;
}

// ==========================================
// ShiftCalendarResolver - 班次日历解析引擎
// ==========================================
pub struct ShiftCalendarResolver {
    store: Arc<dyn ShiftModelStore>,
}

impl ShiftCalendarResolver {
    /// 构造函数
    pub fn new(store: Arc<dyn ShiftModelStore>) -> Self {
        Self { store }
    }

    /// 解析机组在给定时刻的计划生产窗口
    ///
    /// 候选集合:
    /// - 当日班次: 窗口 [当日+start, 当日(或次日)+end) 覆盖 at
    /// - 前一日的跨午夜班次: 窗口 [前日+start, 当日+end) 覆盖 at
    ///
    /// # 返回
    /// - Ok(ShiftWindow): 命中窗口,或零长度窗口(无匹配班次)
    /// - Err(CalculationUnavailable): 班次模型来源失败
    pub fn resolve(&self, machine_code: &str, at: DateTime<Utc>) -> EngineResult<ShiftWindow> {
        let today = at.date_naive();
        let mut candidates: Vec<(ShiftModel, DateTime<Utc>, DateTime<Utc>)> = Vec::new();

        // 当日班次
        for model in self.fetch(machine_code, today)? {
            let (start, end) = anchor_window(&model, today);
            if start <= at && at < end {
                candidates.push((model, start, end));
            }
        }

        // 前一日的跨午夜班次
        if let Some(yesterday) = today.pred_opt() {
            for model in self.fetch(machine_code, yesterday)? {
                if !model.crosses_midnight() {
                    continue;
                }
                let (start, end) = anchor_window(&model, yesterday);
                if start <= at && at < end {
                    candidates.push((model, start, end));
                }
            }
        }

        // 确定性裁决: 作用域优先级 -> 窗口开始 -> shift_id
        let best = candidates.into_iter().min_by(|(a, a_start, _), (b, b_start, _)| {
            a.scope
                .precedence()
                .cmp(&b.scope.precedence())
                .then(a_start.cmp(b_start))
                .then(a.shift_id.cmp(&b.shift_id))
        });

        match best {
            Some((model, start, end)) => Ok(ShiftWindow {
                window_start: start,
                window_end: end,
                break_minutes: model.break_minutes,
                shift_id: Some(model.shift_id),
            }),
            None => Ok(ShiftWindow::degenerate(at)),
        }
    }

    /// 拉取某日期对应星期日的候选班次模型
    fn fetch(&self, machine_code: &str, date: NaiveDate) -> EngineResult<Vec<ShiftModel>> {
        let weekday = date.weekday().num_days_from_monday() as u8;
        self.store
            .find_applicable(machine_code, weekday)
            .map_err(|e| {
                EngineError::CalculationUnavailable(format!(
                    "班次模型查询失败: machine={}, weekday={}, {}",
                    machine_code, weekday, e
                ))
            })
    }
}

/// 以 anchor 日期为班次开始日展开窗口
fn anchor_window(model: &ShiftModel, anchor: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = anchor.and_time(model.start_time).and_utc();
    let end_date = if model.crosses_midnight() {
        anchor.succ_opt().unwrap_or(anchor)
    } else {
        anchor
    };
    let end = end_date.and_time(model.end_time).and_utc();
    (start, end)
}
