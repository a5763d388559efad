//! 问题处理上下文
//!
//! 封装"我正在处理第几题、共几题"这一信息

use std::fmt::Display;

/// 问题处理上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionCtx {
    /// 问题在输入文件中的索引（从1开始）
    pub question_index: usize,

    /// 问题总数（仅用于日志显示）
    pub total: usize,
}

impl QuestionCtx {
    pub fn new(question_index: usize, total: usize) -> Self {
        Self {
            question_index,
            total,
        }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Q{:03}/{:03}]", self.question_index, self.total)
    }
}
