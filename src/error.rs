use thiserror::Error;

/// 包装第三方错误的来源类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 模型推理错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 数据校验错误（内部不变量被破坏）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: BoxError,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: BoxError,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 字段取值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 模型加载与推理错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 后端初始化失败
    #[error("llama.cpp 后端初始化失败: {0}")]
    Backend(#[source] BoxError),
    /// 模型加载失败
    #[error("模型加载失败 ({path}): {source}")]
    ModelLoad {
        path: String,
        #[source]
        source: BoxError,
    },
    /// 推理上下文创建失败
    #[error("推理上下文创建失败: {0}")]
    Context(#[source] BoxError),
    /// 分词失败
    #[error("分词失败: {0}")]
    Tokenize(#[source] BoxError),
    /// 提示词超出上下文长度
    #[error("提示词长度 {prompt_tokens} tokens 超出上下文上限 {n_ctx}")]
    ContextOverflow { prompt_tokens: usize, n_ctx: u32 },
    /// 解码失败
    #[error("解码失败: {0}")]
    Decode(#[source] BoxError),
    /// 其他生成失败
    #[error("生成失败: {0}")]
    Generation(String),
}

/// 数据校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// 三个并行序列长度不一致
    #[error("输入序列长度不一致: questions={questions}, answers={answers}, timings={timings}")]
    LengthMismatch {
        questions: usize,
        answers: usize,
        timings: usize,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件不存在错误
    pub fn file_not_found(path: impl Into<String>) -> Self {
        AppError::File(FileError::NotFound { path: path.into() })
    }
}

impl LlmError {
    /// 包装任意第三方错误
    pub fn boxed<E>(wrap: fn(BoxError) -> Self, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        wrap(Box::new(err))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_message() {
        let err = AppError::from(ValidationError::LengthMismatch {
            questions: 3,
            answers: 2,
            timings: 3,
        });
        let msg = err.to_string();
        assert!(msg.contains("questions=3"));
        assert!(msg.contains("answers=2"));
    }

    #[test]
    fn test_file_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = AppError::file_write_failed("out.csv", io);
        let file_err = err.source().expect("AppError::File 应当携带来源");
        assert!(file_err.source().is_some());
        assert!(err.to_string().contains("out.csv"));
    }
}
