//! 基础设施层：持有模型这一稀缺资源，只暴露生成能力

#[cfg(feature = "llama")]
pub mod llama_runner;

#[cfg(feature = "llama")]
pub use llama_runner::LlamaRunner;
