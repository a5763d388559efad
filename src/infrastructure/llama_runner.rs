//! llama.cpp 推理执行器 - 基础设施层
//!
//! 唯一持有 `LlamaBackend` 和 `LlamaModel` 的模块，只向上暴露 [`TextGenerator`] 能力。
//! 每次调用都新建推理上下文，题目之间不共享 KV cache。

use std::num::NonZeroU32;
use std::path::Path;

use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use llama_cpp_2::{send_logs_to_tracing, LogOptions};
use tracing::{debug, info};

use crate::config::LlamaConfig;
use crate::error::LlmError;
use crate::models::generation::GenerationOptions;
use crate::services::TextGenerator;

/// llama.cpp 执行器
pub struct LlamaRunner {
    // 字段按声明顺序析构：model 必须先于 backend 释放
    model: LlamaModel,
    backend: LlamaBackend,
    settings: LlamaConfig,
}

impl LlamaRunner {
    /// 初始化后端并加载 GGUF 模型
    ///
    /// # 参数
    /// - `model_path`: 模型文件
    /// - `settings`: 上下文长度、线程数、GPU 层数
    /// - `verbose`: 是否把 llama.cpp 自身的日志转发到 tracing
    pub fn load(model_path: &Path, settings: &LlamaConfig, verbose: bool) -> Result<Self, LlmError> {
        send_logs_to_tracing(LogOptions::default().with_logs_enabled(verbose));

        let backend = LlamaBackend::init().map_err(|e| LlmError::boxed(LlmError::Backend, e))?;

        info!(
            "🧠 正在加载模型 (n_ctx={}, n_threads={}, n_gpu_layers={})...",
            settings.n_ctx, settings.n_threads, settings.n_gpu_layers
        );
        let params = LlamaModelParams::default().with_n_gpu_layers(settings.n_gpu_layers);
        let model = LlamaModel::load_from_file(&backend, model_path, &params).map_err(|e| {
            LlmError::ModelLoad {
                path: model_path.display().to_string(),
                source: Box::new(e),
            }
        })?;
        info!("✓ 模型加载完成");

        Ok(Self {
            model,
            backend,
            settings: settings.clone(),
        })
    }

    fn context_params(&self) -> LlamaContextParams {
        let threads = i32::try_from(self.settings.n_threads).unwrap_or(i32::MAX);
        LlamaContextParams::default()
            .with_n_ctx(NonZeroU32::new(self.settings.n_ctx))
            .with_n_batch(self.settings.n_ctx)
            .with_n_threads(threads)
            .with_n_threads_batch(threads)
    }
}

impl TextGenerator for LlamaRunner {
    fn generate(&mut self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        let n_ctx = self.settings.n_ctx;

        let tokens = self
            .model
            .str_to_token(prompt, AddBos::Always)
            .map_err(|e| LlmError::boxed(LlmError::Tokenize, e))?;
        if tokens.len() >= n_ctx as usize {
            return Err(LlmError::ContextOverflow {
                prompt_tokens: tokens.len(),
                n_ctx,
            });
        }

        let mut ctx = self
            .model
            .new_context(&self.backend, self.context_params())
            .map_err(|e| LlmError::boxed(LlmError::Context, e))?;

        // 预填充提示词，只需要最后一个位置的 logits
        let mut batch = LlamaBatch::new(n_ctx as usize, 1);
        let last_index = tokens.len() as i32 - 1;
        for (pos, token) in (0_i32..).zip(tokens.iter().copied()) {
            batch
                .add(token, pos, &[0], pos == last_index)
                .map_err(|e| LlmError::boxed(LlmError::Decode, e))?;
        }
        ctx.decode(&mut batch)
            .map_err(|e| LlmError::boxed(LlmError::Decode, e))?;

        let budget = generation_budget(tokens.len(), n_ctx, options.max_tokens);
        let mut sampler = build_sampler(options);
        let mut n_cur = batch.n_tokens();
        let mut output: Vec<u8> = Vec::new();
        let mut generated = 0usize;

        while generated < budget {
            let token = sampler.sample(&ctx, batch.n_tokens() - 1);
            sampler.accept(token);
            generated += 1;

            if self.model.is_eog_token(token) {
                break;
            }

            let piece = self
                .model
                .token_to_bytes(token, Special::Tokenize)
                .map_err(|e| LlmError::Generation(e.to_string()))?;
            output.extend_from_slice(&piece);

            if let Some(cut) = find_stop(&output, &options.stop) {
                output.truncate(cut);
                break;
            }

            batch.clear();
            batch
                .add(token, n_cur, &[0], true)
                .map_err(|e| LlmError::boxed(LlmError::Decode, e))?;
            n_cur += 1;
            ctx.decode(&mut batch)
                .map_err(|e| LlmError::boxed(LlmError::Decode, e))?;
        }

        debug!(
            "生成 {} tokens (提示词 {} tokens, 上限 {})",
            generated,
            tokens.len(),
            budget
        );

        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

/// 贪心参数用 greedy 采样器，否则 top-k → top-p → temperature → 随机
fn build_sampler(options: &GenerationOptions) -> LlamaSampler {
    if options.is_greedy() {
        return LlamaSampler::greedy();
    }
    LlamaSampler::chain_simple([
        LlamaSampler::top_k(options.top_k),
        LlamaSampler::top_p(options.top_p, 1),
        LlamaSampler::temp(options.temperature),
        LlamaSampler::dist(options.seed),
    ])
}

/// 本次最多可生成的 token 数：不超过 `max_tokens`，也不超过上下文剩余空间
fn generation_budget(prompt_tokens: usize, n_ctx: u32, max_tokens: u32) -> usize {
    let remaining = (n_ctx as usize).saturating_sub(prompt_tokens);
    remaining.min(max_tokens as usize)
}

/// 在已生成的字节中查找最早出现的停止序列，返回截断位置
fn find_stop(output: &[u8], stops: &[String]) -> Option<usize> {
    stops
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|stop| {
            output
                .windows(stop.len())
                .position(|window| window == stop.as_bytes())
        })
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_budget() {
        assert_eq!(generation_budget(10, 2048, 1024), 1024);
        assert_eq!(generation_budget(1500, 2048, 1024), 548);
        assert_eq!(generation_budget(2048, 2048, 1024), 0);
        assert_eq!(generation_budget(3000, 2048, 1024), 0);
    }

    #[test]
    fn test_find_stop() {
        let stops = vec!["</s>".to_string()];
        assert_eq!(find_stop(b"The answer is 42</s>", &stops), Some(16));
        assert_eq!(find_stop(b"no stop here", &stops), None);
        assert_eq!(find_stop(b"</", &stops), None);
    }

    #[test]
    fn test_find_stop_picks_earliest() {
        let stops = vec!["</s>".to_string(), "[INST]".to_string(), String::new()];
        assert_eq!(find_stop(b"abc[INST]def</s>", &stops), Some(3));
        assert_eq!(find_stop(b"abc", &[]), None);
    }
}
