//! 结果写入服务 - 业务能力层
//!
//! 只负责"把问答和耗时写成 CSV"能力，不关心流程

use std::path::Path;

use tracing::debug;

use crate::error::{AppError, AppResult, ValidationError};
use crate::models::result_row::{ResultRow, CSV_HEADER};

/// 把问题、回答、耗时三组并行序列写入 CSV
///
/// 三组长度必须一致，否则在任何 I/O 之前返回校验错误。
/// 目标文件存在时会被覆盖。
///
/// # 参数
/// - `questions`: 问题列表（决定行号 1..N）
/// - `answers`: 回答列表
/// - `timings`: 推理耗时（毫秒）
/// - `out_path`: 输出路径
pub fn save_csv<Q, A>(
    questions: &[Q],
    answers: &[A],
    timings: &[f64],
    out_path: &Path,
) -> AppResult<()>
where
    Q: AsRef<str>,
    A: AsRef<str>,
{
    if questions.len() != answers.len() || questions.len() != timings.len() {
        return Err(ValidationError::LengthMismatch {
            questions: questions.len(),
            answers: answers.len(),
            timings: timings.len(),
        }
        .into());
    }

    debug!("写入 {} 行结果到 {}", questions.len(), out_path.display());

    let path_str = || out_path.display().to_string();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(out_path)
        .map_err(|e| AppError::file_write_failed(path_str(), e))?;

    // 表头单独写，保证零行时也有表头
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| AppError::file_write_failed(path_str(), e))?;

    for (i, ((question, answer), time_ms)) in questions
        .iter()
        .zip(answers)
        .zip(timings)
        .enumerate()
    {
        let row = ResultRow {
            index: i + 1,
            question: question.as_ref(),
            answer: answer.as_ref(),
            time_ms: *time_ms,
        };
        writer
            .serialize(row)
            .map_err(|e| AppError::file_write_failed(path_str(), e))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::file_write_failed(path_str(), e))?;

    Ok(())
}
