//! 程序配置
//!
//! 配置来源（优先级从低到高）：
//! 1. 代码内默认值
//! 2. `parameters.toml` 配置文件
//! 3. `QA_*` 环境变量

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};
use crate::models::generation::{GenerationOptions, PromptTemplate};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "parameters.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// 输入输出路径
    pub paths: PathsConfig,
    /// llama.cpp 加载参数
    #[serde(default)]
    pub llama: LlamaConfig,
    /// 生成策略
    #[serde(default)]
    pub generation: GenerationConfig,
    /// 是否显示详细日志
    #[serde(default)]
    pub verbose_logging: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PathsConfig {
    /// 问题文件（段落之间以空行分隔）
    pub questions_path: PathBuf,
    /// GGUF 模型文件
    pub model_path: PathBuf,
}

/// llama.cpp 模型与上下文参数
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LlamaConfig {
    /// 上下文长度（tokens）
    pub n_ctx: u32,
    /// 推理线程数
    pub n_threads: u32,
    /// 卸载到 GPU 的层数（0 = 纯 CPU）
    pub n_gpu_layers: u32,
}

impl Default for LlamaConfig {
    fn default() -> Self {
        Self {
            n_ctx: 2048,
            n_threads: 6,
            n_gpu_layers: 0,
        }
    }
}

/// 生成策略：提示词模板、失败占位答案和解码参数
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub prompt_template: PromptTemplate,
    /// 推理失败时写入 CSV 的答案
    pub error_sentinel: String,
    #[serde(flatten)]
    pub options: GenerationOptions,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            prompt_template: PromptTemplate::default(),
            error_sentinel: "<ERROR>".to_string(),
            options: GenerationOptions::default(),
        }
    }
}

impl Config {
    /// 从 TOML 文件加载配置，再叠加环境变量覆盖
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::file_not_found(path.display().to_string()));
        }
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        let mut config = Self::from_toml_str(&content, path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    /// 解析 TOML 内容（不做覆盖与校验）
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.display().to_string(),
            source,
        })
    }

    /// 用 `lookup` 提供的变量覆盖配置项
    ///
    /// 生产环境下 `lookup` 读取进程环境变量，测试中可传入闭包。
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QA_QUESTIONS_PATH") {
            self.paths.questions_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("QA_MODEL_PATH") {
            self.paths.model_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("QA_N_CTX") {
            self.llama.n_ctx = parse_var("QA_N_CTX", &v, "u32")?;
        }
        if let Some(v) = lookup("QA_N_THREADS") {
            self.llama.n_threads = parse_var("QA_N_THREADS", &v, "u32")?;
        }
        if let Some(v) = lookup("QA_N_GPU_LAYERS") {
            self.llama.n_gpu_layers = parse_var("QA_N_GPU_LAYERS", &v, "u32")?;
        }
        if let Some(v) = lookup("QA_VERBOSE") {
            self.verbose_logging = parse_var("QA_VERBOSE", &v, "bool")?;
        }
        Ok(())
    }

    /// 展开路径开头的 `~`
    pub fn expand_paths(&mut self) {
        self.paths.questions_path = expand_tilde(&self.paths.questions_path);
        self.paths.model_path = expand_tilde(&self.paths.model_path);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llama.n_ctx == 0 {
            return Err(invalid("llama.n_ctx", "必须大于 0"));
        }
        if self.llama.n_threads == 0 {
            return Err(invalid("llama.n_threads", "必须大于 0"));
        }
        if self.generation.options.max_tokens == 0 {
            return Err(invalid("generation.max_tokens", "必须大于 0"));
        }
        if !self.generation.prompt_template.has_placeholder() {
            return Err(invalid(
                "generation.prompt_template",
                "缺少 {question} 占位符",
            ));
        }
        Ok(())
    }

    /// 结果文件路径：当前目录下的 `QA_<模型文件名>.csv`
    pub fn output_csv_path(&self) -> PathBuf {
        let stem = self
            .paths
            .model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        PathBuf::from(format!("QA_{}.csv", stem))
    }
}

fn parse_var<T: std::str::FromStr>(
    var_name: &str,
    value: &str,
    expected_type: &str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: expected_type.to_string(),
        })
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// `~` 或 `~/...` 展开到用户主目录；找不到主目录时原样返回
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
