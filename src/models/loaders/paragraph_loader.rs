use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppError, AppResult};

/// 段落分隔：至少包含一个空行的空白串
fn paragraph_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\n\s*\n").expect("段落分隔正则必须合法"))
}

/// 从文本文件读取所有非空段落（段落之间以至少一个空行分隔）
pub fn read_paragraphs(path: &Path) -> AppResult<Vec<String>> {
    if !path.exists() {
        return Err(AppError::file_not_found(path.display().to_string()));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    Ok(split_paragraphs(&content))
}

/// 统一换行符后按空行切分，去掉首尾空白并丢弃空段落
pub fn split_paragraphs(content: &str) -> Vec<String> {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");

    paragraph_separator()
        .split(&normalized)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_basic() {
        assert_eq!(
            split_paragraphs("Q1?\n\nQ2?\n\n\nQ3?"),
            vec!["Q1?", "Q2?", "Q3?"]
        );
    }

    #[test]
    fn test_multiline_paragraph_kept_together() {
        let content = "第一行\n第二行\n\n  下一段  \n";
        assert_eq!(split_paragraphs(content), vec!["第一行\n第二行", "下一段"]);
    }

    #[test]
    fn test_blank_line_with_interior_whitespace() {
        assert_eq!(split_paragraphs("A\n  \t \nB"), vec!["A", "B"]);
    }

    #[test]
    fn test_crlf_and_cr_line_endings() {
        assert_eq!(split_paragraphs("A\r\n\r\nB\r\rC"), vec!["A", "B", "C"]);
        assert_eq!(split_paragraphs("A\r\nstill A"), vec!["A\nstill A"]);
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert!(split_paragraphs("").is_empty());
        assert!(split_paragraphs("\n\n  \n\t\n").is_empty());
    }

    #[test]
    fn test_leading_and_trailing_blank_lines() {
        assert_eq!(split_paragraphs("\n\n\nonly\n\n\n"), vec!["only"]);
    }

    #[test]
    fn test_split_is_idempotent() {
        let content = "x\n\ny\n \nz";
        assert_eq!(split_paragraphs(content), split_paragraphs(content));
    }

    #[test]
    fn test_read_paragraphs_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "What is Rust?\n\nWho wrote it?\n").unwrap();

        let paragraphs = read_paragraphs(file.path()).unwrap();
        assert_eq!(paragraphs, vec!["What is Rust?", "Who wrote it?"]);
    }

    #[test]
    fn test_read_paragraphs_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_paragraphs(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(
            err,
            AppError::File(crate::error::FileError::NotFound { .. })
        ));
    }
}
