// ==========================================
// 设备综合效率实时监测系统 - 领域类型定义
// ==========================================
// 职责: 指标引擎共用的枚举类型
// 序列化格式: SCREAMING_SNAKE_CASE (与消息主题字段一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 事实字段 (Fact Field)
// ==========================================
// 消息主题/HTTP 更新端点允许写入的六个事实字段
// 红线: 字段集合封闭,未识别字段一律拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactField {
    PlannedProductionQuantity, // 工单计划产量
    RuntimeMinutes,            // 累计运行时间(分钟)
    TargetPerformance,         // 目标产出速率(件/小时)
    ActualPerformance,         // 实际产出速率(件/小时)
    ActualProductionYield,     // 合格品数量
    ActualProductionQuantity,  // 总产出数量(含缺陷品)
}

impl fmt::Display for FactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FactField {
    /// 全部事实字段(固定顺序,用于导出与校验)
    pub const ALL: [FactField; 6] = [
        FactField::PlannedProductionQuantity,
        FactField::RuntimeMinutes,
        FactField::TargetPerformance,
        FactField::ActualPerformance,
        FactField::ActualProductionYield,
        FactField::ActualProductionQuantity,
    ];

    /// 转换为线上传输的字符串标识
    pub fn as_str(&self) -> &'static str {
        match self {
            FactField::PlannedProductionQuantity => "PLANNED_PRODUCTION_QUANTITY",
            FactField::RuntimeMinutes => "RUNTIME_MINUTES",
            FactField::TargetPerformance => "TARGET_PERFORMANCE",
            FactField::ActualPerformance => "ACTUAL_PERFORMANCE",
            FactField::ActualProductionYield => "ACTUAL_PRODUCTION_YIELD",
            FactField::ActualProductionQuantity => "ACTUAL_PRODUCTION_QUANTITY",
        }
    }

    /// 从字符串解析事实字段
    ///
    /// # 返回
    /// - Some(FactField): 识别的字段
    /// - None: 未识别字段(调用方应报 InvalidFact)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLANNED_PRODUCTION_QUANTITY" => Some(FactField::PlannedProductionQuantity),
            "RUNTIME_MINUTES" => Some(FactField::RuntimeMinutes),
            "TARGET_PERFORMANCE" => Some(FactField::TargetPerformance),
            "ACTUAL_PERFORMANCE" => Some(FactField::ActualPerformance),
            "ACTUAL_PRODUCTION_YIELD" => Some(FactField::ActualProductionYield),
            "ACTUAL_PRODUCTION_QUANTITY" => Some(FactField::ActualProductionQuantity),
            _ => None,
        }
    }

    /// 校验字段取值范围
    ///
    /// 规则:
    /// - 所有字段必须是有限数值且非负
    /// - TARGET_PERFORMANCE 额外要求大于 0 (0 视为"未设置",由计算层兜底)
    ///
    /// # 返回
    /// - Ok(()): 取值合法
    /// - Err(String): 拒绝原因(可解释性)
    pub fn validate_value(&self, value: f64) -> Result<(), String> {
        if !value.is_finite() {
            return Err(format!("字段 {} 取值非有限数值: {}", self.as_str(), value));
        }
        if value < 0.0 {
            return Err(format!("字段 {} 取值不能为负: {}", self.as_str(), value));
        }
        if *self == FactField::TargetPerformance && value == 0.0 {
            return Err(format!("字段 {} 取值必须大于 0", self.as_str()));
        }
        Ok(())
    }
}

// ==========================================
// 停机分类 (Downtime Class)
// ==========================================
// 依据: 停机记录来源系统的三分类口径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DowntimeClass {
    Planned,   // 计划停机(保养/换型)
    Unplanned, // 非计划停机(故障)
    Microstop, // 微停机(短时停顿,按原因码归组)
}

impl fmt::Display for DowntimeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DowntimeClass::Planned => write!(f, "PLANNED"),
            DowntimeClass::Unplanned => write!(f, "UNPLANNED"),
            DowntimeClass::Microstop => write!(f, "MICROSTOP"),
        }
    }
}

impl DowntimeClass {
    /// 从字符串解析停机分类
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLANNED" => Some(DowntimeClass::Planned),
            "UNPLANNED" => Some(DowntimeClass::Unplanned),
            "MICROSTOP" => Some(DowntimeClass::Microstop),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DowntimeClass::Planned => "PLANNED",
            DowntimeClass::Unplanned => "UNPLANNED",
            DowntimeClass::Microstop => "MICROSTOP",
        }
    }
}

// ==========================================
// 班次作用域 (Shift Scope)
// ==========================================
// 优先级: Machine > Area > Plant (机组级覆盖区域级覆盖全厂级)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftScope {
    Machine, // 机组级
    Area,    // 区域级
    Plant,   // 全厂级
}

impl fmt::Display for ShiftScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftScope::Machine => write!(f, "MACHINE"),
            ShiftScope::Area => write!(f, "AREA"),
            ShiftScope::Plant => write!(f, "PLANT"),
        }
    }
}

impl ShiftScope {
    /// 从字符串解析班次作用域(未识别时回退到全厂级)
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "MACHINE" => ShiftScope::Machine,
            "AREA" => ShiftScope::Area,
            _ => ShiftScope::Plant,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ShiftScope::Machine => "MACHINE",
            ShiftScope::Area => "AREA",
            ShiftScope::Plant => "PLANT",
        }
    }

    /// 作用域优先级(数值越小越优先)
    pub fn precedence(&self) -> u8 {
        match self {
            ShiftScope::Machine => 0,
            ShiftScope::Area => 1,
            ShiftScope::Plant => 2,
        }
    }
}

// ==========================================
// OEE 等级 (OEE Grade)
// ==========================================
// 驾驶舱着色口径: 世界级 >= 85, 一般 >= 60, 偏低 >= 40, 其余为危险
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OeeGrade {
    WorldClass, // 世界级
    Typical,    // 一般
    Low,        // 偏低
    Critical,   // 危险
}

impl fmt::Display for OeeGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OeeGrade::WorldClass => write!(f, "WORLD_CLASS"),
            OeeGrade::Typical => write!(f, "TYPICAL"),
            OeeGrade::Low => write!(f, "LOW"),
            OeeGrade::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl OeeGrade {
    /// 从 OEE 百分比 [0,100] 评定等级
    pub fn from_score(oee: f64) -> Self {
        if oee >= 85.0 {
            OeeGrade::WorldClass
        } else if oee >= 60.0 {
            OeeGrade::Typical
        } else if oee >= 40.0 {
            OeeGrade::Low
        } else {
            OeeGrade::Critical
        }
    }
}
