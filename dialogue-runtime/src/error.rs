//! # Error 模块
//!
//! 定义 dialogue-runtime 中使用的错误类型。
//!
//! 所有错误都是可恢复的：引擎在返回错误后保持一致、可继续使用的
//! 状态，由 Host 记录日志后继续运行，绝不终止宿主进程。

use thiserror::Error;

use crate::catalog::DialogueId;

/// 目录错误
///
/// 构建或校验对话目录时产生。其中后三个变体只出现在严格校验模式
/// （见 [`crate::diagnostic::validate_strict`]），运行时不会触发。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// 没有加载任何对话树
    #[error("对话目录为空，没有任何对话可以开始")]
    EmptyCatalog,

    /// 对话树没有台词
    #[error("对话 {id} 没有任何台词")]
    EmptyDialogue { id: DialogueId },

    /// 对话树缺少终点台词
    #[error("对话 {id} 缺少终点台词，推进越界后会无限循环")]
    UnterminatedDialogue { id: DialogueId },

    /// 选项指向目录中不存在的目标
    #[error("对话 {id} 的选项指向不存在的目标 {target}")]
    MissingChoiceTarget {
        id: DialogueId,
        target: DialogueId,
    },
}

/// 引擎错误
///
/// 状态机操作失败时产生。除 `EmptyDialogue`（开始空对话会先强制
/// 收尾当前会话）外，返回错误时引擎状态不发生任何变化。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 对话 ID 未注册
    #[error("对话 ID {id} 不存在")]
    DialogueNotFound { id: DialogueId },

    /// 目标对话树没有台词
    #[error("对话 {id} 没有任何台词")]
    EmptyDialogue { id: DialogueId },

    /// 当前状态不允许此操作
    #[error("无效的状态操作: {message}")]
    InvalidState { message: String },
}

/// dialogue-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogueError {
    /// 目录错误
    #[error("目录错误: {0}")]
    Catalog(#[from] CatalogError),

    /// 引擎错误
    #[error("引擎错误: {0}")]
    Engine(#[from] EngineError),
}

/// Result 类型别名
pub type DialogueResult<T> = Result<T, DialogueError>;
