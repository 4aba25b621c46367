//! # Dialogue Runtime
//!
//! 分支对话系统的核心运行时库。
//!
//! ## 架构概述
//!
//! `dialogue-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它通过 **命令驱动模式** 与宿主层（Host）通信：
//!
//! ```text
//! Host                               Engine
//!   │                                   │
//!   │── start / advance / choose ─────►│
//!   │                                   │ 状态机推进
//!   │◄──────── Vec<Command> ───────────│
//!   │                                   │
//!   │ 转发给渲染方 / 日志方 / 属性方    │
//! ```
//!
//! ## 核心类型
//!
//! - [`Catalog`]：按数字 ID 索引的不可变对话目录
//! - [`DialogueEngine`]：对话状态机（推进 / 分支 / 结束）
//! - [`Command`]：引擎向 Host 发出的指令
//! - [`EffectTable`]：选项 ID → 属性增量的策略表
//! - [`Reveal`]：打字机效果的确定性定时序列
//!
//! ## 使用示例
//!
//! ```ignore
//! use dialogue_runtime::{Catalog, DialogueEngine, EffectTable, PlayerInput};
//!
//! // 加载数据并创建引擎
//! let catalog = Catalog::build(trees)?;
//! let mut engine = DialogueEngine::new(catalog, effects);
//!
//! // 交互触发方开始对话
//! for cmd in engine.start(0)? {
//!     host.execute(cmd);
//! }
//!
//! // 玩家输入驱动状态机
//! loop {
//!     let input = host.collect_input();     // 继续 / 选择
//!     match engine.handle(input) {
//!         Ok(commands) => host.execute_all(commands),
//!         Err(err) => host.log_warning(err), // 记录后继续，引擎状态一致
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`catalog`]：对话数据模型与目录
//! - [`command`]：Command 定义
//! - [`diagnostic`]：目录静态检查与严格校验
//! - [`effects`]：选项效果表
//! - [`engine`]：状态机核心
//! - [`error`]：错误类型定义
//! - [`history`]：会话历史（回看）
//! - [`input`]：玩家输入定义
//! - [`reveal`]：打字机效果
//! - [`state`]：引擎状态定义

pub mod catalog;
pub mod command;
pub mod diagnostic;
pub mod effects;
pub mod engine;
pub mod error;
pub mod history;
pub mod input;
pub mod reveal;
pub mod state;

// 重导出核心类型
pub use catalog::{Catalog, Choice, DialogueId, DialogueTree, Line, Side};
pub use command::{ChoiceView, Command, LineView};
pub use diagnostic::{
    Diagnostic, DiagnosticLevel, DiagnosticResult, analyze_catalog, validate_strict,
};
pub use effects::{EffectTable, StatDelta};
pub use engine::DialogueEngine;
pub use error::{CatalogError, DialogueError, DialogueResult, EngineError};
pub use history::{History, HistoryEvent};
pub use input::PlayerInput;
pub use reveal::{PAUSE_CHARS, Reveal, RevealConfig, RevealStep};
pub use state::EngineState;
