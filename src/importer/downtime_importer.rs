// ==========================================
// 设备综合效率实时监测系统 - 停机记录导入
// ==========================================
// 职责: 从外部采集系统导出的 CSV 文件批量导入停机记录
// 文件格式(带表头):
//   machine_code,started_at,ended_at,reason_code,class
//   时间格式: %Y-%m-%d %H:%M:%S (UTC)
// 口径: 坏行跳过并记入报告,不中断整批导入
// ==========================================

use crate::domain::downtime::DowntimeRecord;
use crate::domain::types::DowntimeClass;
use crate::repository::downtime_repo::DowntimeRecordRepository;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// 导入文件时间格式
const IMPORT_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ImportSummary - 导入结果汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: String,        // 导入批次ID
    pub total_rows: usize,       // 文件总行数(不含表头)
    pub imported: usize,         // 成功入库行数
    pub skipped: usize,          // 跳过行数
    pub errors: Vec<String>,     // 每条坏行的原因(可解释性)
}

// ==========================================
// RawDowntimeRow - 导入中间结构体
// ==========================================
// 生命周期: 仅在导入流程内(文件解析 -> 校验 -> 落库)
#[derive(Debug, Deserialize)]
struct RawDowntimeRow {
    machine_code: String,
    started_at: String,
    ended_at: String,
    reason_code: String,
    class: String,
}

// ==========================================
// DowntimeImporter Trait
// ==========================================
// 用途: 停机记录导入主接口
// 实现者: CsvDowntimeImporter
#[async_trait]
pub trait DowntimeImporter: Send + Sync {
    /// 从 CSV 文件导入停机记录
    ///
    /// # 参数
    /// - file_path: CSV 文件路径
    ///
    /// # 返回
    /// - Ok(ImportSummary): 导入汇总(含坏行报告)
    /// - Err: 文件读取错误、数据库错误等
    async fn import_from_csv<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> Result<ImportSummary, Box<dyn Error + Send + Sync>>;
}

// ==========================================
// CsvDowntimeImporter - CSV 导入实现
// ==========================================
pub struct CsvDowntimeImporter {
    repo: Arc<DowntimeRecordRepository>,
}

impl CsvDowntimeImporter {
    /// 构造函数
    pub fn new(repo: Arc<DowntimeRecordRepository>) -> Self {
        Self { repo }
    }

    /// 单行校验与转换
    fn parse_row(row: RawDowntimeRow) -> Result<DowntimeRecord, String> {
        let machine_code = row.machine_code.trim();
        if machine_code.is_empty() {
            return Err("machine_code 为空".to_string());
        }

        let started_at = NaiveDateTime::parse_from_str(row.started_at.trim(), IMPORT_TS_FORMAT)
            .map_err(|e| format!("started_at 解析失败 '{}': {}", row.started_at, e))?
            .and_utc();
        let ended_at = NaiveDateTime::parse_from_str(row.ended_at.trim(), IMPORT_TS_FORMAT)
            .map_err(|e| format!("ended_at 解析失败 '{}': {}", row.ended_at, e))?
            .and_utc();
        if ended_at <= started_at {
            return Err(format!(
                "时间倒挂: started_at={}, ended_at={}",
                row.started_at, row.ended_at
            ));
        }

        let class = DowntimeClass::parse(row.class.trim())
            .ok_or_else(|| format!("未识别的停机分类: {}", row.class))?;

        let reason_code = row.reason_code.trim().to_uppercase();
        if reason_code.is_empty() {
            return Err("reason_code 为空".to_string());
        }

        Ok(DowntimeRecord {
            record_id: Uuid::new_v4().to_string(),
            machine_code: machine_code.to_string(),
            started_at,
            ended_at,
            reason_code,
            class,
        })
    }
}

#[async_trait]
impl DowntimeImporter for CsvDowntimeImporter {
    async fn import_from_csv<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> Result<ImportSummary, Box<dyn Error + Send + Sync>> {
        let path = file_path.as_ref().to_path_buf();
        let batch_id = Uuid::new_v4().to_string();
        tracing::info!("开始导入停机记录: batch={}, file={:?}", batch_id, path);

        // CSV 解析在阻塞线程池执行,避免占住异步运行时
        let rows: Vec<Result<RawDowntimeRow, String>> =
            tokio::task::spawn_blocking(move || -> Result<_, String> {
                let mut reader = csv::Reader::from_path(&path)
                    .map_err(|e| format!("文件打开失败 {:?}: {}", path, e))?;
                Ok(reader
                    .deserialize::<RawDowntimeRow>()
                    .map(|r| r.map_err(|e| format!("行解析失败: {}", e)))
                    .collect())
            })
            .await
            .map_err(|e| format!("导入任务执行失败: {}", e))??;

        let mut summary = ImportSummary {
            batch_id,
            total_rows: rows.len(),
            imported: 0,
            skipped: 0,
            errors: Vec::new(),
        };

        for (index, row) in rows.into_iter().enumerate() {
            // 行号从 2 起算(1 为表头),报告里直接可对照文件
            let line_no = index + 2;
            let record = match row.and_then(Self::parse_row) {
                Ok(record) => record,
                Err(reason) => {
                    summary.skipped += 1;
                    summary.errors.push(format!("第{}行: {}", line_no, reason));
                    continue;
                }
            };

            match self.repo.insert(&record) {
                Ok(()) => summary.imported += 1,
                Err(e) => {
                    summary.skipped += 1;
                    summary.errors.push(format!("第{}行: 落库失败: {}", line_no, e));
                }
            }
        }

        tracing::info!(
            "停机记录导入完成: batch={}, total={}, imported={}, skipped={}",
            summary.batch_id,
            summary.total_rows,
            summary.imported,
            summary.skipped
        );
        Ok(summary)
    }
}
