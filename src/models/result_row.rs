use serde::Serialize;

/// 结果文件表头
pub const CSV_HEADER: [&str; 4] = ["Index", "Question", "Answer", "Time[ms]"];

/// 结果文件中的一行
///
/// `index` 从 1 开始，与问题在输入文件中的位置一致。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow<'a> {
    #[serde(rename = "Index")]
    pub index: usize,
    #[serde(rename = "Question")]
    pub question: &'a str,
    #[serde(rename = "Answer")]
    pub answer: &'a str,
    #[serde(rename = "Time[ms]")]
    pub time_ms: f64,
}
