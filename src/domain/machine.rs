// ==========================================
// 设备综合效率实时监测系统 - 机组领域模型
// ==========================================
// 职责: 机组主数据 + 机组事实集
// 红线: MachineFactSet 由指标缓冲区独占持有,读方只拿副本
// ==========================================

use crate::domain::types::FactField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// MachineMaster - 机组主数据
// ==========================================
// 用途: 主数据层写入,引擎层只读
// 对齐: machine_master 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineMaster {
    pub machine_code: String,         // 机组代码(稳定标识)
    pub machine_name: Option<String>, // 机组名称
    pub area_code: Option<String>,    // 所属区域(班次作用域解析用)
}

// ==========================================
// MachineFactSet - 机组事实集
// ==========================================
// 每机组一份,随事件到达逐字段覆盖(不合并)
// 生命周期: 首次更新时懒创建; 新工单开始时归零(保留机组代码)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineFactSet {
    pub machine_code: String, // 机组代码

    // ===== 六个事实字段 =====
    pub planned_production_quantity: f64, // 工单计划产量
    pub runtime_minutes: f64,             // 累计运行时间(分钟)
    pub target_performance: f64,          // 目标产出速率(件/小时, 0=未设置)
    pub actual_performance: f64,          // 实际产出速率(件/小时)
    pub actual_production_yield: f64,     // 合格品数量
    pub actual_production_quantity: f64,  // 总产出数量

    // ===== 审计字段 =====
    pub updated_at: DateTime<Utc>, // 最后事实更新时间
}

impl MachineFactSet {
    /// 创建全零事实集(首次更新时懒创建)
    pub fn new(machine_code: &str) -> Self {
        Self {
            machine_code: machine_code.to_string(),
            planned_production_quantity: 0.0,
            runtime_minutes: 0.0,
            target_performance: 0.0,
            actual_performance: 0.0,
            actual_production_yield: 0.0,
            actual_production_quantity: 0.0,
            updated_at: Utc::now(),
        }
    }

    /// 覆盖写入单个事实字段
    ///
    /// 取值校验由调用方(缓冲区)完成,这里只做赋值
    pub fn apply(&mut self, field: FactField, value: f64) {
        match field {
            FactField::PlannedProductionQuantity => self.planned_production_quantity = value,
            FactField::RuntimeMinutes => self.runtime_minutes = value,
            FactField::TargetPerformance => self.target_performance = value,
            FactField::ActualPerformance => self.actual_performance = value,
            FactField::ActualProductionYield => self.actual_production_yield = value,
            FactField::ActualProductionQuantity => self.actual_production_quantity = value,
        }
        self.updated_at = Utc::now();
    }

    /// 读取单个事实字段当前值
    pub fn value_of(&self, field: FactField) -> f64 {
        match field {
            FactField::PlannedProductionQuantity => self.planned_production_quantity,
            FactField::RuntimeMinutes => self.runtime_minutes,
            FactField::TargetPerformance => self.target_performance,
            FactField::ActualPerformance => self.actual_performance,
            FactField::ActualProductionYield => self.actual_production_yield,
            FactField::ActualProductionQuantity => self.actual_production_quantity,
        }
    }

    /// 新工单开始时归零所有事实字段(保留机组代码)
    pub fn reset_for_new_order(&mut self) {
        self.planned_production_quantity = 0.0;
        self.runtime_minutes = 0.0;
        self.target_performance = 0.0;
        self.actual_performance = 0.0;
        self.actual_production_yield = 0.0;
        self.actual_production_quantity = 0.0;
        self.updated_at = Utc::now();
    }

    /// 合格数是否超过总产出(数据质量口径,计算层记录告警并钳位)
    pub fn yield_exceeds_quantity(&self) -> bool {
        self.actual_production_yield > self.actual_production_quantity
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fact_set_is_zeroed() {
        let facts = MachineFactSet::new("H032");
        assert_eq!(facts.machine_code, "H032");
        for field in FactField::ALL {
            assert_eq!(facts.value_of(field), 0.0);
        }
    }

    #[test]
    fn test_apply_overwrites_single_field() {
        let mut facts = MachineFactSet::new("H032");
        facts.apply(FactField::RuntimeMinutes, 210.0);
        facts.apply(FactField::RuntimeMinutes, 215.0);

        assert_eq!(facts.runtime_minutes, 215.0);
        // 其余字段不受影响
        assert_eq!(facts.planned_production_quantity, 0.0);
        assert_eq!(facts.actual_production_yield, 0.0);
    }

    #[test]
    fn test_reset_for_new_order_keeps_identity() {
        let mut facts = MachineFactSet::new("H032");
        facts.apply(FactField::TargetPerformance, 1000.0);
        facts.apply(FactField::ActualProductionYield, 950.0);

        facts.reset_for_new_order();

        assert_eq!(facts.machine_code, "H032");
        assert_eq!(facts.target_performance, 0.0);
        assert_eq!(facts.actual_production_yield, 0.0);
    }

    #[test]
    fn test_yield_exceeds_quantity() {
        let mut facts = MachineFactSet::new("H032");
        facts.apply(FactField::ActualProductionYield, 960.0);
        facts.apply(FactField::ActualProductionQuantity, 950.0);
        assert!(facts.yield_exceeds_quantity());

        facts.apply(FactField::ActualProductionQuantity, 960.0);
        assert!(!facts.yield_exceeds_quantity());
    }
}
