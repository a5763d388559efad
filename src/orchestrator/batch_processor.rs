//! 批量问答处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量问题的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **批量加载**：读取问题文件中的所有段落
//! 2. **资源管理**：加载模型（`LlamaRunner`），整个运行期间只加载一次
//! 3. **顺序处理**：按输入顺序逐题调用 `QuestionFlow`，不并发
//! 4. **结果落盘**：全部完成后一次性写出 CSV
//! 5. **全局统计**：汇总成功/失败数量和推理总耗时

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::models::read_paragraphs;
use crate::services::{save_csv, TextGenerator};
use crate::utils::logging::{log_question_start, log_questions_loaded, print_final_stats};
use crate::workflow::{QuestionCtx, QuestionFlow};

/// 批量处理的输出：与输入问题一一对应的回答和耗时
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchOutput {
    pub answers: Vec<String>,
    pub timings: Vec<f64>,
    /// 失败题目的索引（从1开始）
    pub failed: Vec<usize>,
}

/// 处理统计
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub answered: usize,
    pub failed: usize,
    /// 所有推理调用的耗时之和（毫秒）
    pub total_ms: f64,
    pub output_path: PathBuf,
}

/// 按顺序处理所有问题
///
/// 单题失败只会在对应位置写入占位答案，不会中断批处理。
///
/// # 参数
/// - `generator`: 已加载的模型
/// - `flow`: 单题处理流程
/// - `prompts`: 问题列表
pub fn run_batch<G, S>(generator: &mut G, flow: &QuestionFlow, prompts: &[S]) -> BatchOutput
where
    G: TextGenerator + ?Sized,
    S: AsRef<str>,
{
    let total = prompts.len();
    let mut output = BatchOutput {
        answers: Vec::with_capacity(total),
        timings: Vec::with_capacity(total),
        failed: Vec::new(),
    };

    for (idx, prompt) in prompts.iter().enumerate() {
        let ctx = QuestionCtx::new(idx + 1, total);
        log_question_start(ctx.question_index, total);

        let outcome = flow.run(generator, prompt.as_ref(), &ctx);
        if outcome.is_failed() {
            output.failed.push(ctx.question_index);
        }

        output
            .answers
            .push(outcome.answer_text(flow.error_sentinel()).to_string());
        output.timings.push(outcome.elapsed_ms());
    }

    output
}

/// 应用主结构
pub struct App {
    config: Config,
    output_path: PathBuf,
}

impl App {
    /// 创建应用，`output_path` 为空时使用 `QA_<模型名>.csv`
    pub fn new(config: Config, output_path: Option<PathBuf>) -> Self {
        let output_path = output_path.unwrap_or_else(|| config.output_csv_path());
        Self {
            config,
            output_path,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// 运行应用主逻辑：读题 → 加载模型 → 批量推理 → 写出结果
    #[cfg(feature = "llama")]
    pub fn run(&self) -> Result<RunSummary> {
        use crate::error::AppError;
        use crate::infrastructure::LlamaRunner;
        use crate::utils::logging::log_startup;

        let paths = &self.config.paths;
        log_startup(&paths.model_path, &paths.questions_path);

        let questions = self.load_questions()?;

        if !paths.model_path.exists() {
            return Err(AppError::file_not_found(paths.model_path.display().to_string()).into());
        }
        let mut runner = LlamaRunner::load(
            &paths.model_path,
            &self.config.llama,
            self.config.verbose_logging,
        )
        .context("模型加载失败")?;

        self.process(&mut runner, &questions)
    }

    /// 未启用 `llama` 特性时没有可用的推理后端
    #[cfg(not(feature = "llama"))]
    pub fn run(&self) -> Result<RunSummary> {
        anyhow::bail!("当前构建未启用 llama 特性，无法加载模型")
    }

    /// 读取问题文件
    pub fn load_questions(&self) -> Result<Vec<String>> {
        let path = &self.config.paths.questions_path;
        let questions = read_paragraphs(path)
            .with_context(|| format!("无法读取问题文件: {}", path.display()))?;
        log_questions_loaded(questions.len());
        Ok(questions)
    }

    /// 用给定的模型处理问题并写出结果
    pub fn process<G>(&self, generator: &mut G, questions: &[String]) -> Result<RunSummary>
    where
        G: TextGenerator + ?Sized,
    {
        let flow = QuestionFlow::new(&self.config.generation, self.config.verbose_logging);
        let output = run_batch(generator, &flow, questions);

        save_csv(questions, output.answers.as_slice(), &output.timings, &self.output_path)
            .with_context(|| format!("无法写入结果文件: {}", self.output_path.display()))?;

        let summary = RunSummary {
            total: questions.len(),
            answered: questions.len() - output.failed.len(),
            failed: output.failed.len(),
            total_ms: output.timings.iter().sum(),
            output_path: self.output_path.clone(),
        };

        print_final_stats(
            summary.answered,
            summary.failed,
            summary.total_ms,
            &summary.output_path,
        );

        Ok(summary)
    }
}
