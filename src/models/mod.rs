pub mod generation;
pub mod loaders;
pub mod result_row;

pub use generation::{GenerationOptions, PromptTemplate};
pub use loaders::{read_paragraphs, split_paragraphs};
pub use result_row::ResultRow;
