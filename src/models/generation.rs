//! 生成参数与提示词模板

use serde::Deserialize;

/// 提示词模板中的问题占位符
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// 解码参数
///
/// 默认值为贪心解码：temperature 0、top-k 1、top-p 1，最多 1024 个 token，遇到 `</s>` 停止。
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationOptions {
    /// 最多生成的 token 数
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: i32,
    /// 停止序列，命中后截断（不含停止序列本身）
    pub stop: Vec<String>,
    /// 非贪心采样时使用的随机种子
    pub seed: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.0,
            top_p: 1.0,
            top_k: 1,
            stop: vec!["</s>".to_string()],
            seed: 0,
        }
    }
}

impl GenerationOptions {
    /// 是否等价于贪心解码
    pub fn is_greedy(&self) -> bool {
        self.temperature <= 0.0 || self.top_k == 1
    }
}

/// 包裹问题的指令模板
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PromptTemplate(String);

impl Default for PromptTemplate {
    fn default() -> Self {
        Self("[INST] {question} [/INST]".to_string())
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn has_placeholder(&self) -> bool {
        self.0.contains(QUESTION_PLACEHOLDER)
    }

    /// 用问题原文替换占位符
    pub fn render(&self, question: &str) -> String {
        self.0.replace(QUESTION_PLACEHOLDER, question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_render() {
        let template = PromptTemplate::default();
        assert_eq!(
            template.render("What is 6 x 7?"),
            "[INST] What is 6 x 7? [/INST]"
        );
    }

    #[test]
    fn test_render_keeps_question_verbatim() {
        let template = PromptTemplate::new("Q: {question}\nA:");
        assert_eq!(template.render("a {b} c"), "Q: a {b} c\nA:");
    }

    #[test]
    fn test_default_options_are_greedy() {
        let options = GenerationOptions::default();
        assert!(options.is_greedy());
        assert_eq!(options.max_tokens, 1024);
        assert_eq!(options.stop, vec!["</s>".to_string()]);

        let sampled = GenerationOptions {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.9,
            ..GenerationOptions::default()
        };
        assert!(!sampled.is_greedy());
    }
}
