//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Question>)
//!     ↓
//! workflow::QuestionFlow (处理单个问题)
//!     ↓
//! services (能力层：llm / csv)
//!     ↓
//! infrastructure (基础设施：LlamaRunner)
//! ```
//!
//! 只做调度和统计，不做具体业务判断。

pub mod batch_processor;

pub use batch_processor::{run_batch, App, BatchOutput, RunSummary};
