/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数。
/// 标准输出只留给结果 JSON，日志一律写到标准错误。
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::Collections;
use crate::orchestrator::Phase;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时默认 `info`，详细模式为 `debug`。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, collections: &Collections) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 并发文本分类模式");
    info!("🔗 推理服务: {}", config.backend_url);
    info!("📊 最大并发数: {}", config.max_concurrent_jobs);
    match config.job_timeout() {
        Some(limit) => info!("⏱️ 单任务超时: {}s", limit.as_secs()),
        None => info!("⏱️ 单任务超时: 不限制"),
    }
    info!(
        "📁 共 {} 个集合, {} 条文本",
        collections.len(),
        collections.total_records()
    );
    for collection in collections.iter() {
        info!("   - {}: {} 条", collection.name, collection.len());
    }
    info!("{}", "=".repeat(60));
}

/// 记录阶段开始信息
///
/// # 参数
/// - `phase`: 阶段
/// - `tasks`: 本阶段任务数
pub fn log_phase_start(phase: Phase, tasks: usize) {
    info!("{}", "─".repeat(60));
    info!("📦 {}开始: {} 个任务", phase, tasks);
    info!("{}", "─".repeat(60));
}

/// 记录阶段完成信息
///
/// # 参数
/// - `phase`: 阶段
/// - `success`: 成功数量
/// - `total`: 任务总数
/// - `elapsed`: 耗时
pub fn log_phase_complete(phase: Phase, success: usize, total: usize, elapsed: Duration) {
    info!(
        "✓ {}结束: 成功 {}/{}，耗时 {:.1}s",
        phase,
        success,
        total,
        elapsed.as_secs_f64()
    );
}

/// 打印最终统计信息
pub fn print_final_stats(phase: Phase, collections: usize, records: usize, elapsed: Duration) {
    info!("{}", "=".repeat(60));
    info!("📊 运行结束: {}", phase);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("集合: {}，文本: {}", collections, records);
    info!("总耗时: {:.1}s", elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
