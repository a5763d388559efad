pub mod paragraph_loader;

pub use paragraph_loader::{read_paragraphs, split_paragraphs};
