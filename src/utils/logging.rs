/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::path::Path;
use tracing::{info, warn};

/// 记录程序启动信息
///
/// # 参数
/// - `model_path`: 模型文件路径
/// - `questions_path`: 问题文件路径
pub fn log_startup(model_path: &Path, questions_path: &Path) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 本地模型批量问答");
    info!("🧠 模型: {}", model_path.display());
    info!("📄 问题文件: {}", questions_path.display());
    info!("{}", "=".repeat(60));
}

/// 记录问题加载信息
///
/// # 参数
/// - `total`: 问题总数
pub fn log_questions_loaded(total: usize) {
    if total == 0 {
        warn!("⚠️ 问题文件中没有任何段落，将只写出表头");
    } else {
        info!("✓ 已加载 {} 个问题", total);
    }
}

/// 记录单题开始信息
pub fn log_question_start(question_index: usize, total: usize) {
    info!("[Q{:03}/{:03}] 处理中...", question_index, total);
}

/// 打印最终统计信息
///
/// # 参数
/// - `answered`: 成功数量
/// - `failed`: 失败数量
/// - `total_ms`: 推理总耗时（毫秒）
/// - `output_path`: 结果文件路径
pub fn print_final_stats(answered: usize, failed: usize, total_ms: f64, output_path: &Path) {
    let total = answered + failed;
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", answered, total);
    info!("❌ 失败: {}", failed);
    if total > 0 {
        info!(
            "⏱️ 推理总耗时: {:.1} s (平均 {:.0} ms/题)",
            total_ms / 1000.0,
            total_ms / total as f64
        );
    }
    info!("{}", "=".repeat(60));
    info!("\n结果已写入: {}", output_path.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本，换行替换为空格
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max_len {
        flat.chars().take(max_len).collect::<String>() + "..."
    } else {
        flat
    }
}
