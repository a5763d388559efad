//! # Models QA
//!
//! 用本地 GGUF 模型批量回答问题文件中的题目，并把回答和推理耗时写入 CSV。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（模型），只暴露能力
//! - `LlamaRunner` - 唯一的模型 owner，实现 `TextGenerator`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个问题
//! - `LlmService` - 包裹模板、调用模型并计时
//! - `save_csv` - 写结果文件
//!
//! ### ③ 流程层（Workflow）
//! - `QuestionCtx` - 上下文封装（题号 + 总数）
//! - `QuestionFlow` - 单题流程（推理 → 失败兜底）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 顺序遍历问题、写出结果、输出统计

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
#[cfg(feature = "llama")]
pub use infrastructure::LlamaRunner;
pub use models::{read_paragraphs, GenerationOptions, PromptTemplate, ResultRow};
pub use orchestrator::{run_batch, App, BatchOutput, RunSummary};
pub use services::{save_csv, LlmService, TextGenerator, TimedAnswer};
pub use workflow::{ItemOutcome, QuestionCtx, QuestionFlow};
