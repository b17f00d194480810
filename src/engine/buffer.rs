// ==========================================
// 设备综合效率实时监测系统 - 机组指标缓冲区
// ==========================================
// 职责: 每机组一份事实集 + 最新快照,序列化全部变更,提供线性化读
// 并发设计:
// - 注册表 RwLock 只用于查找/创建条目,绝不跨计算持有
// - 条目级 Mutex 串行化单机组的更新与重算,机组间互不阻塞
// - 读方永远拿副本,快照整体替换,不存在半新半旧
// 红线: 事实集与快照由缓冲区独占持有,任何失败只影响单机组
// ==========================================

use crate::domain::downtime::DowntimeBreakdown;
use crate::domain::machine::MachineFactSet;
use crate::domain::metrics::MetricSnapshot;
use crate::domain::shift::ShiftWindow;
use crate::domain::types::FactField;
use crate::engine::calculator::{CalculationWarning, OeeCalculator};
use crate::engine::downtime_aggregator::DowntimeAggregator;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::shift_resolver::ShiftCalendarResolver;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

// ==========================================
// MachineEntry - 单机组状态条目
// ==========================================
struct MachineEntry {
    facts: MachineFactSet,
    snapshot: Option<MetricSnapshot>,
}

impl MachineEntry {
    fn new(machine_code: &str) -> Self {
        Self {
            facts: MachineFactSet::new(machine_code),
            snapshot: None,
        }
    }
}

// ==========================================
// RecalcOutcome - 单次重算结果
// ==========================================
#[derive(Debug, Clone)]
pub struct RecalcOutcome {
    pub snapshot: MetricSnapshot,              // 新快照(副本)
    pub warnings: Vec<CalculationWarning>,     // 数据质量告警
    pub elapsed_ms: u128,                      // 重算耗时(毫秒)
}

// ==========================================
// MachineMetricsBuffer - 机组指标缓冲区
// ==========================================
pub struct MachineMetricsBuffer {
    entries: RwLock<HashMap<String, Arc<Mutex<MachineEntry>>>>,
    calculator: Arc<OeeCalculator>,
    aggregator: Arc<DowntimeAggregator>,
    shift_resolver: Arc<ShiftCalendarResolver>,
    /// 协作方耗时告警阈值(毫秒)
    slow_warn_ms: u64,
}

impl MachineMetricsBuffer {
    /// 构造函数
    ///
    /// # 参数
    /// - `calculator`: OEE 计算引擎
    /// - `aggregator`: 停机聚合引擎
    /// - `shift_resolver`: 班次日历解析引擎
    /// - `slow_warn_ms`: 单次重算耗时告警阈值(毫秒)
    pub fn new(
        calculator: Arc<OeeCalculator>,
        aggregator: Arc<DowntimeAggregator>,
        shift_resolver: Arc<ShiftCalendarResolver>,
        slow_warn_ms: u64,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            calculator,
            aggregator,
            shift_resolver,
            slow_warn_ms,
        }
    }

    // ==========================================
    // 条目查找/创建(注册表锁只在此短暂持有)
    // ==========================================

    /// 查找已有条目
    fn entry(&self, machine_code: &str) -> EngineResult<Option<Arc<Mutex<MachineEntry>>>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| EngineError::LockPoisoned(e.to_string()))?;
        Ok(entries.get(machine_code).cloned())
    }

    /// 查找条目,不存在则懒创建
    fn entry_or_create(&self, machine_code: &str) -> EngineResult<Arc<Mutex<MachineEntry>>> {
        if let Some(entry) = self.entry(machine_code)? {
            return Ok(entry);
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|e| EngineError::LockPoisoned(e.to_string()))?;
        let entry = entries
            .entry(machine_code.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(MachineEntry::new(machine_code))));
        Ok(entry.clone())
    }

    /// 锁定单机组条目
    fn lock_entry<'a>(
        entry: &'a Arc<Mutex<MachineEntry>>,
        machine_code: &str,
    ) -> EngineResult<MutexGuard<'a, MachineEntry>> {
        entry.lock().map_err(|e| {
            EngineError::LockPoisoned(format!("machine={}: {}", machine_code, e))
        })
    }

    // ==========================================
    // 核心操作
    // ==========================================

    /// 更新单个事实字段
    ///
    /// # 约束
    /// - 取值必须满足字段范围规则,否则报 InvalidFact 且状态不变
    ///
    /// # 副作用
    /// - 机组未知时懒创建条目
    /// - 不触发重算(由调用方决定重算时机)
    pub fn update_fact(
        &self,
        machine_code: &str,
        field: FactField,
        value: f64,
    ) -> EngineResult<()> {
        // 先校验再创建条目: 非法输入不留痕
        field
            .validate_value(value)
            .map_err(|reason| EngineError::InvalidFact {
                field: field.as_str().to_string(),
                value,
                reason,
            })?;

        let entry = self.entry_or_create(machine_code)?;
        let mut guard = Self::lock_entry(&entry, machine_code)?;
        guard.facts.apply(field, value);

        tracing::debug!(
            "事实更新: machine={}, field={}, value={}",
            machine_code,
            field,
            value
        );
        Ok(())
    }

    /// 按显式时间窗重算
    ///
    /// # 约束
    /// - window_start > window_end 报 InvalidWindow
    /// - window_start == window_end 为合法退化窗口(可用率记 0)
    /// - 机组从未收到事实更新时报 UnknownMachine
    pub fn recalculate(
        &self,
        machine_code: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> EngineResult<RecalcOutcome> {
        if window_start > window_end {
            return Err(EngineError::InvalidWindow {
                start: window_start.to_rfc3339(),
                end: window_end.to_rfc3339(),
            });
        }

        let window = ShiftWindow {
            window_start,
            window_end,
            break_minutes: 0.0,
            shift_id: None,
        };
        self.recalculate_window(machine_code, window)
    }

    /// 按"当前班次"窗口重算(事件触发与定时触发共用路径)
    ///
    /// 先经班次日历解析出 at 时刻的计划生产窗口;
    /// 无匹配班次时得到零长度窗口,快照可用率记 0
    pub fn recalculate_current_shift(
        &self,
        machine_code: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<RecalcOutcome> {
        let window = self.shift_resolver.resolve(machine_code, at)?;
        self.recalculate_window(machine_code, window)
    }

    /// 重算公共路径: 聚合停机 -> 计算快照 -> 原子替换
    ///
    /// 整个过程持有该机组的条目锁:
    /// - 保证重算观察到所有先行完成的事实更新
    /// - 保证快照替换对读方整体可见
    /// - 机组间互不阻塞(协作方为本地快查,锁内调用可接受)
    fn recalculate_window(
        &self,
        machine_code: &str,
        window: ShiftWindow,
    ) -> EngineResult<RecalcOutcome> {
        let entry = self
            .entry(machine_code)?
            .ok_or_else(|| EngineError::UnknownMachine(machine_code.to_string()))?;

        let started = Instant::now();
        let mut guard = Self::lock_entry(&entry, machine_code)?;

        // 零长度窗口跳过停机聚合(聚合器要求 start < end)
        let breakdown = if window.is_degenerate() {
            DowntimeBreakdown::empty()
        } else {
            self.aggregator
                .aggregate(machine_code, window.window_start, window.window_end)?
        };

        let computation = self.calculator.compute(&guard.facts, &breakdown, &window);
        for warning in &computation.warnings {
            tracing::warn!("数据质量告警: {}", warning);
        }

        // 原子替换: 同一把条目锁内整体写入
        guard.snapshot = Some(computation.snapshot.clone());
        drop(guard);

        let elapsed_ms = started.elapsed().as_millis();
        if elapsed_ms > self.slow_warn_ms as u128 {
            tracing::warn!(
                "重算耗时超过阈值: machine={}, elapsed_ms={}, 阈值={}ms",
                machine_code,
                elapsed_ms,
                self.slow_warn_ms
            );
        }

        tracing::debug!(
            "重算完成: machine={}, oee={:.2}, elapsed_ms={}",
            machine_code,
            computation.snapshot.oee,
            elapsed_ms
        );

        Ok(RecalcOutcome {
            snapshot: computation.snapshot,
            warnings: computation.warnings,
            elapsed_ms,
        })
    }

    /// 读取当前快照(副本)
    ///
    /// # 返回
    /// - Err(UnknownMachine): 机组从未收到事实更新
    /// - Err(SnapshotNotFound): 有事实但从未重算
    pub fn get_snapshot(&self, machine_code: &str) -> EngineResult<MetricSnapshot> {
        let entry = self
            .entry(machine_code)?
            .ok_or_else(|| EngineError::UnknownMachine(machine_code.to_string()))?;
        let guard = Self::lock_entry(&entry, machine_code)?;
        guard
            .snapshot
            .clone()
            .ok_or_else(|| EngineError::SnapshotNotFound(machine_code.to_string()))
    }

    /// 读取当前事实集(副本,诊断与测试用)
    pub fn get_facts(&self, machine_code: &str) -> EngineResult<MachineFactSet> {
        let entry = self
            .entry(machine_code)?
            .ok_or_else(|| EngineError::UnknownMachine(machine_code.to_string()))?;
        let guard = Self::lock_entry(&entry, machine_code)?;
        Ok(guard.facts.clone())
    }

    /// 新工单开始: 归零事实字段,保留机组代码
    ///
    /// 上一份快照保持可读,直到下一次重算整体替换
    /// 机组未知时按首次接触处理(懒创建条目)
    pub fn reset_for_new_order(&self, machine_code: &str) -> EngineResult<()> {
        let entry = self.entry_or_create(machine_code)?;
        let mut guard = Self::lock_entry(&entry, machine_code)?;
        guard.facts.reset_for_new_order();
        tracing::info!("新工单开始,事实集已归零: machine={}", machine_code);
        Ok(())
    }

    /// 列出全部已知机组代码
    pub fn list_machines(&self) -> EngineResult<Vec<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| EngineError::LockPoisoned(e.to_string()))?;
        let mut machines: Vec<String> = entries.keys().cloned().collect();
        machines.sort();
        Ok(machines)
    }

    /// 导出全部机组的当前快照副本
    ///
    /// 注册表读锁只用于收集条目引用,随后逐机组短暂加锁取副本,
    /// 导出期间不持有任何条目锁跨越其他机组
    pub fn list_snapshots(&self) -> EngineResult<Vec<MetricSnapshot>> {
        let refs: Vec<(String, Arc<Mutex<MachineEntry>>)> = {
            let entries = self
                .entries
                .read()
                .map_err(|e| EngineError::LockPoisoned(e.to_string()))?;
            entries
                .iter()
                .map(|(code, entry)| (code.clone(), entry.clone()))
                .collect()
        };

        let mut snapshots = Vec::new();
        for (machine_code, entry) in refs {
            let guard = Self::lock_entry(&entry, &machine_code)?;
            if let Some(snapshot) = &guard.snapshot {
                snapshots.push(snapshot.clone());
            }
        }
        snapshots.sort_by(|a, b| a.machine_code.cmp(&b.machine_code));
        Ok(snapshots)
    }
}
