// ==========================================
// 停机记录 CSV 导入集成测试
// ==========================================
// 测试目标: CsvDowntimeImporter 的解析、校验、坏行报告
// ==========================================


#[cfg(test)]
mod downtime_importer_test {
    use chrono::TimeZone;
    use oee_engine::importer::{CsvDowntimeImporter, DowntimeImporter};
    use std::io::Write;
    use tempfile::NamedTempFile;

    use crate::test_helpers::setup_test_env;

    /// 写入测试 CSV 文件
    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_import_valid_rows() {
        let (_temp, state) = setup_test_env();
        let csv_file = write_csv(
            "machine_code,started_at,ended_at,reason_code,class\n\
             1,2026-03-02 08:00:00,2026-03-02 08:05:00,jam,MICROSTOP\n\
             1,2026-03-02 09:00:00,2026-03-02 09:30:00,maint,PLANNED\n\
             2,2026-03-02 10:00:00,2026-03-02 10:20:00,fault,UNPLANNED\n",
        );

        let importer = CsvDowntimeImporter::new(state.downtime_repo.clone());
        let summary = importer.import_from_csv(csv_file.path()).await.unwrap();

        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.skipped, 0);
        assert!(summary.errors.is_empty());

        assert_eq!(state.downtime_repo.count_for_machine("1").unwrap(), 2);
        assert_eq!(state.downtime_repo.count_for_machine("2").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bad_rows_skipped_with_report() {
        let (_temp, state) = setup_test_env();
        let csv_file = write_csv(
            "machine_code,started_at,ended_at,reason_code,class\n\
             1,2026-03-02 08:00:00,2026-03-02 08:05:00,jam,MICROSTOP\n\
             1,not-a-time,2026-03-02 09:30:00,maint,PLANNED\n\
             1,2026-03-02 10:00:00,2026-03-02 09:00:00,fault,UNPLANNED\n\
             1,2026-03-02 11:00:00,2026-03-02 11:10:00,fault,BOGUS_CLASS\n\
             ,2026-03-02 12:00:00,2026-03-02 12:10:00,fault,UNPLANNED\n",
        );

        let importer = CsvDowntimeImporter::new(state.downtime_repo.clone());
        let summary = importer.import_from_csv(csv_file.path()).await.unwrap();

        assert_eq!(summary.total_rows, 5);
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 4);
        assert_eq!(summary.errors.len(), 4);
        // 报告带行号,可对照文件定位
        assert!(summary.errors.iter().any(|e| e.starts_with("第3行")));

        assert_eq!(state.downtime_repo.count_for_machine("1").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reason_code_normalized_to_uppercase() {
        let (_temp, state) = setup_test_env();
        let csv_file = write_csv(
            "machine_code,started_at,ended_at,reason_code,class\n\
             1,2026-03-02 08:00:00,2026-03-02 08:05:00,jam,MICROSTOP\n",
        );

        let importer = CsvDowntimeImporter::new(state.downtime_repo.clone());
        importer.import_from_csv(csv_file.path()).await.unwrap();

        let records = state
            .downtime_repo
            .find_overlapping(
                "1",
                chrono::Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
                chrono::Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap(),
            )
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason_code, "JAM");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let (_temp, state) = setup_test_env();
        let importer = CsvDowntimeImporter::new(state.downtime_repo.clone());
        let result = importer
            .import_from_csv("/nonexistent/downtime.csv")
            .await;
        assert!(result.is_err());
    }
}
