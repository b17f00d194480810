// ==========================================
// 设备综合效率实时监测系统 - 服务主入口
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 职责: 装配应用状态,运行定时重算循环
// 说明: 事件侧 ingest 由消息消费方/HTTP 层经 MetricsApi 调用,
//       这里只承担"定时触发"一翼与快照周期性导出日志
// ==========================================

use oee_engine::app::{get_default_db_path, AppState};
use oee_engine::logging;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", oee_engine::APP_NAME);
    tracing::info!("系统版本: {}", oee_engine::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    tracing::info!("正在初始化AppState...");
    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("AppState初始化成功");

    // 将主数据里的机组登记进缓冲区,让定时重算循环从第一拍就覆盖它们
    match app_state.machine_repo.list_all() {
        Ok(machines) => {
            tracing::info!("已加载机组主数据: {} 台", machines.len());
            for machine in &machines {
                // 经门面登记: 存在执行中工单时顺带回填计划产量与目标速率
                if let Err(e) = app_state.metrics_api.reset_for_new_order(&machine.machine_code) {
                    tracing::warn!("机组登记失败: machine={}, {}", machine.machine_code, e);
                }
            }
        }
        Err(e) => {
            tracing::warn!("机组主数据加载失败(事件到达时懒创建): {}", e);
        }
    }

    let interval_secs = app_state.config_manager.recalc_interval_secs();
    tracing::info!("定时重算间隔: {}秒", interval_secs);

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    // 第一拍立即触发,之后按间隔执行
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match app_state.metrics_api.recalculate_all() {
                    Ok(refreshed) => {
                        tracing::debug!("定时重算完成: {} 台机组", refreshed);
                        if let Ok(snapshots) = app_state.metrics_api.list_snapshots() {
                            for snapshot in snapshots {
                                tracing::info!(
                                    "OEE: machine={}, availability={:.4}, performance={:.4}, quality={:.4}, oee={:.2}, grade={}",
                                    snapshot.machine_code,
                                    snapshot.availability,
                                    snapshot.performance,
                                    snapshot.quality,
                                    snapshot.oee,
                                    snapshot.grade
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("定时重算失败: {}", e);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("收到退出信号,服务停止");
                break;
            }
        }
    }
}
