//! LLM 服务 - 业务能力层
//!
//! 只负责"回答一道题并计时"的能力，不关心流程
//!
//! ## 设计
//! - 模型以 [`TextGenerator`] trait 注入，本层不负责加载模型
//! - 计时只覆盖 `generate` 调用本身，不含模板渲染和日志

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::GenerationConfig;
use crate::error::LlmError;
use crate::models::generation::{GenerationOptions, PromptTemplate};
use crate::utils::logging::truncate_text;

/// 可同步调用的文本生成能力
///
/// 真实实现见 `infrastructure::LlamaRunner`；测试中可用任意桩实现替代。
pub trait TextGenerator {
    /// 对已渲染好的提示词生成一段补全文本
    fn generate(&mut self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError>;
}

impl<G: TextGenerator + ?Sized> TextGenerator for &mut G {
    fn generate(&mut self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        (**self).generate(prompt, options)
    }
}

impl<G: TextGenerator + ?Sized> TextGenerator for Box<G> {
    fn generate(&mut self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        (**self).generate(prompt, options)
    }
}

/// 单次回答结果及其耗时
#[derive(Debug)]
pub struct TimedAnswer {
    /// 成功时为去掉首尾空白的回答
    pub result: Result<String, LlmError>,
    /// 推理调用耗时（毫秒），失败时为失败前的耗时
    pub elapsed_ms: f64,
}

/// LLM 服务
///
/// 职责：
/// - 用指令模板包裹问题
/// - 调用模型并计时
/// - 只处理单个问题，不出现问题列表
pub struct LlmService {
    prompt_template: PromptTemplate,
    options: GenerationOptions,
}

impl LlmService {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            prompt_template: config.prompt_template.clone(),
            options: config.options.clone(),
        }
    }

    /// 渲染提示词
    pub fn format_prompt(&self, question: &str) -> String {
        self.prompt_template.render(question)
    }

    /// 回答单个问题
    ///
    /// # 参数
    /// - `generator`: 已加载好的模型
    /// - `question`: 问题原文
    ///
    /// # 返回
    /// 返回回答文本（或错误）以及推理耗时
    pub fn answer<G>(&self, generator: &mut G, question: &str) -> TimedAnswer
    where
        G: TextGenerator + ?Sized,
    {
        let prompt = self.format_prompt(question);
        debug!("提示词: {}", truncate_text(&prompt, 80));

        let start = Instant::now();
        let raw = generator.generate(&prompt, &self.options);
        let elapsed_ms = duration_to_ms(start.elapsed());

        TimedAnswer {
            result: raw.map(|text| text.trim().to_string()),
            elapsed_ms,
        }
    }
}

/// 时长转换为毫秒（浮点）
pub fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
