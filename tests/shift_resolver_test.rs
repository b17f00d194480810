// ==========================================
// ShiftCalendarResolver 引擎集成测试
// ==========================================
// 测试目标: 真实 SQLite 仓储作为 ShiftModelStore 的窗口解析
// 覆盖范围: 作用域优先级(机组>区域>全厂)、无匹配、跨午夜、休息分钟
// ==========================================


#[cfg(test)]
mod shift_resolver_test {
    use chrono::{DateTime, TimeZone, Utc};
    use oee_engine::domain::types::ShiftScope;
    use oee_engine::engine::{ShiftCalendarResolver, ShiftModelStore};
    use std::sync::Arc;

    use crate::test_helpers::{seed_machine, seed_shift, setup_test_env};

    // 2026-03-02 是周一 (weekday 0)
    fn monday(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    fn resolver_from(state: &oee_engine::app::AppState) -> ShiftCalendarResolver {
        ShiftCalendarResolver::new(state.shift_model_repo.clone() as Arc<dyn ShiftModelStore>)
    }

    #[test]
    fn test_machine_scope_wins_over_area_and_plant() {
        let (_temp, state) = setup_test_env();
        seed_machine(&state, "H032", Some("FINISHING"));
        seed_shift(&state, "S-PLANT", ShiftScope::Plant, "*", 0, (6, 0), (14, 0), 0.0);
        seed_shift(
            &state,
            "S-AREA",
            ShiftScope::Area,
            "FINISHING",
            0,
            (6, 0),
            (14, 0),
            0.0,
        );
        seed_shift(
            &state,
            "S-H032",
            ShiftScope::Machine,
            "H032",
            0,
            (6, 0),
            (14, 0),
            30.0,
        );

        let window = resolver_from(&state).resolve("H032", monday(9, 0)).unwrap();
        assert_eq!(window.shift_id.as_deref(), Some("S-H032"));
        assert_eq!(window.break_minutes, 30.0);
    }

    #[test]
    fn test_area_scope_applies_via_machine_master() {
        let (_temp, state) = setup_test_env();
        seed_machine(&state, "H032", Some("FINISHING"));
        seed_shift(&state, "S-PLANT", ShiftScope::Plant, "*", 0, (6, 0), (14, 0), 0.0);
        seed_shift(
            &state,
            "S-AREA",
            ShiftScope::Area,
            "FINISHING",
            0,
            (6, 0),
            (14, 0),
            15.0,
        );

        let window = resolver_from(&state).resolve("H032", monday(9, 0)).unwrap();
        assert_eq!(window.shift_id.as_deref(), Some("S-AREA"));

        // 区域不匹配的机组回落到全厂级
        seed_machine(&state, "H040", Some("ROLLING"));
        let window = resolver_from(&state).resolve("H040", monday(9, 0)).unwrap();
        assert_eq!(window.shift_id.as_deref(), Some("S-PLANT"));
    }

    #[test]
    fn test_no_matching_model_returns_degenerate_window() {
        let (_temp, state) = setup_test_env();
        seed_machine(&state, "H032", None);
        // 只有周二的班次,周一时刻无匹配
        seed_shift(&state, "S-TUE", ShiftScope::Plant, "*", 1, (6, 0), (14, 0), 0.0);

        let at = monday(9, 0);
        let window = resolver_from(&state).resolve("H032", at).unwrap();
        assert!(window.is_degenerate());
        assert_eq!(window.window_start, at);
    }

    #[test]
    fn test_midnight_crossing_shift_resolved_from_previous_day() {
        let (_temp, state) = setup_test_env();
        seed_machine(&state, "H032", None);
        // 周日(weekday 6) 22:00 - 周一 06:00 夜班
        seed_shift(&state, "S-NIGHT", ShiftScope::Plant, "*", 6, (22, 0), (6, 0), 20.0);

        let window = resolver_from(&state).resolve("H032", monday(3, 0)).unwrap();
        assert_eq!(window.shift_id.as_deref(), Some("S-NIGHT"));
        assert_eq!(
            window.window_start,
            Utc.with_ymd_and_hms(2026, 3, 1, 22, 0, 0).unwrap()
        );
        assert_eq!(window.window_end, monday(6, 0));
        assert_eq!(window.duration_minutes(), 480.0);
    }

    #[test]
    fn test_unknown_machine_without_area_still_gets_plant_shift() {
        let (_temp, state) = setup_test_env();
        // 机组主数据缺失时,区域级不命中,但全厂级仍然适用
        seed_shift(&state, "S-PLANT", ShiftScope::Plant, "*", 0, (6, 0), (14, 0), 0.0);
        seed_shift(
            &state,
            "S-AREA",
            ShiftScope::Area,
            "FINISHING",
            0,
            (6, 0),
            (14, 0),
            0.0,
        );

        let window = resolver_from(&state)
            .resolve("UNREGISTERED", monday(9, 0))
            .unwrap();
        assert_eq!(window.shift_id.as_deref(), Some("S-PLANT"));
    }
}
