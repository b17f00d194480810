// ==========================================
// 并发更新隔离测试
// ==========================================
// 职责: 验证机组间的并发隔离与单机组的串行化
// ==========================================


#[cfg(test)]
mod concurrent_ingest_test {
    use std::sync::Arc;
    use std::thread;

    use crate::test_helpers::{seed_full_week_shifts, setup_test_env};

    /// 机组 A 与机组 B 的并发 ingest 不得互相污染字段
    #[test]
    fn test_concurrent_ingest_isolation_between_machines() {
        let (_temp, state) = setup_test_env();
        seed_full_week_shifts(&state);
        let api: Arc<_> = state.metrics_api.clone();

        let mut handles = Vec::new();
        for (machine, target, actual) in [("A", 1000.0, 800.0), ("B", 2000.0, 500.0)] {
            let api = api.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    api.ingest(machine, "TARGET_PERFORMANCE", target).unwrap();
                    api.ingest(machine, "ACTUAL_PERFORMANCE", actual).unwrap();
                    api.ingest(machine, "ACTUAL_PRODUCTION_YIELD", actual).unwrap();
                    api.ingest(machine, "ACTUAL_PRODUCTION_QUANTITY", target).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // A: performance = 800/1000, quality = 800/1000
        let snapshot_a = api.query("A").unwrap();
        assert!((snapshot_a.performance - 0.8).abs() < 1e-9);
        assert!((snapshot_a.quality - 0.8).abs() < 1e-9);

        // B: performance = 500/2000, quality = 500/2000
        let snapshot_b = api.query("B").unwrap();
        assert!((snapshot_b.performance - 0.25).abs() < 1e-9);
        assert!((snapshot_b.quality - 0.25).abs() < 1e-9);
    }

    /// 并发读写下读方永远拿到完整一致的快照(分量与 OEE 自洽)
    #[test]
    fn test_readers_never_observe_torn_snapshot() {
        let (_temp, state) = setup_test_env();
        seed_full_week_shifts(&state);
        let api: Arc<_> = state.metrics_api.clone();

        // 写方: 在两组自洽的事实集之间交替
        let writer = {
            let api = api.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    let (target, actual) = if i % 2 == 0 {
                        (1000.0, 1000.0)
                    } else {
                        (2000.0, 500.0)
                    };
                    api.ingest("M", "TARGET_PERFORMANCE", target).unwrap();
                    api.ingest("M", "ACTUAL_PERFORMANCE", actual).unwrap();
                }
            })
        };

        // 读方: 每份快照的 OEE 必须等于三分量乘积(整体替换保证)
        let reader = {
            let api = api.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    if let Ok(snapshot) = api.query("M") {
                        let expected = snapshot.availability
                            * snapshot.performance
                            * snapshot.quality
                            * 100.0;
                        assert!(
                            (snapshot.oee - expected).abs() < 1e-9,
                            "快照出现半新半旧字段组合"
                        );
                        assert!(snapshot.is_in_range());
                    }
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    }

    /// 单机组故障不得影响其他机组(故障隔离)
    #[test]
    fn test_failure_is_local_to_one_machine() {
        let (_temp, state) = setup_test_env();
        seed_full_week_shifts(&state);
        let api = &state.metrics_api;

        api.ingest("OK", "TARGET_PERFORMANCE", 1000.0).unwrap();
        // 机组 BAD 的非法输入被拒绝
        assert!(api.ingest("BAD", "TARGET_PERFORMANCE", -1.0).is_err());

        // OK 机组不受影响
        let snapshot = api.query("OK").unwrap();
        assert!(snapshot.is_in_range());
        // BAD 机组没有留下任何状态
        assert!(api.query("BAD").is_err());
    }
}
