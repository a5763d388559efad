//! 问题处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整处理流程
//!
//! 流程顺序：
//! 1. 模板包裹 → 模型推理（计时）
//! 2. 成功：记录回答
//! 3. 失败：记录错误日志，用占位答案兜底，不影响后续题目

use tracing::{error, info};

use crate::config::GenerationConfig;
use crate::services::{LlmService, TextGenerator};
use crate::utils::logging::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;

/// 单个问题的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// 模型正常返回
    Answered { text: String, elapsed_ms: f64 },
    /// 推理失败，以占位答案代替
    Failed { reason: String, elapsed_ms: f64 },
}

impl ItemOutcome {
    pub fn elapsed_ms(&self) -> f64 {
        match self {
            ItemOutcome::Answered { elapsed_ms, .. } | ItemOutcome::Failed { elapsed_ms, .. } => {
                *elapsed_ms
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }

    /// 写入结果文件的回答文本，失败时为 `sentinel`
    pub fn answer_text<'a>(&'a self, sentinel: &'a str) -> &'a str {
        match self {
            ItemOutcome::Answered { text, .. } => text.as_str(),
            ItemOutcome::Failed { .. } => sentinel,
        }
    }
}

/// 问题处理流程
///
/// - 编排单个问题的处理
/// - 不持有模型（由调用方注入）
/// - 失败隔离粒度恰好为一道题
pub struct QuestionFlow {
    llm_service: LlmService,
    error_sentinel: String,
    verbose_logging: bool,
}

impl QuestionFlow {
    pub fn new(config: &GenerationConfig, verbose_logging: bool) -> Self {
        Self {
            llm_service: LlmService::new(config),
            error_sentinel: config.error_sentinel.clone(),
            verbose_logging,
        }
    }

    pub fn error_sentinel(&self) -> &str {
        &self.error_sentinel
    }

    pub fn run<G>(&self, generator: &mut G, question: &str, ctx: &QuestionCtx) -> ItemOutcome
    where
        G: TextGenerator + ?Sized,
    {
        if self.verbose_logging {
            info!("{} 问题: {}", ctx, truncate_text(question, 80));
        }

        let timed = self.llm_service.answer(generator, question);

        match timed.result {
            Ok(text) => {
                if self.verbose_logging {
                    info!(
                        "{} ✓ 回答 ({:.0} ms): {}",
                        ctx,
                        timed.elapsed_ms,
                        truncate_text(&text, 80)
                    );
                }
                ItemOutcome::Answered {
                    text,
                    elapsed_ms: timed.elapsed_ms,
                }
            }
            Err(e) => {
                error!("{} ❌ 生成失败: {}", ctx, e);
                ItemOutcome::Failed {
                    reason: e.to_string(),
                    elapsed_ms: timed.elapsed_ms,
                }
            }
        }
    }
}
