pub mod csv_writer;
pub mod llm_service;

pub use csv_writer::save_csv;
pub use llm_service::{LlmService, TextGenerator, TimedAnswer};
