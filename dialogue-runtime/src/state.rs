//! # State 模块
//!
//! 定义引擎的可变状态。
//!
//! ## 设计原则
//!
//! - 所有状态必须**显式建模**
//! - 所有状态必须**可序列化**（支持存档/读档）
//! - 不允许隐式全局状态：状态只存在于引擎实例内

use serde::{Deserialize, Serialize};

use crate::catalog::DialogueId;

/// 引擎状态
///
/// 这是引擎的**唯一可变状态**。状态机只有两个阶段：
///
/// ```text
/// Inactive（面板隐藏）--start--> Active（面板显示，台词下标有效）
/// Active --推进到终点 / end--> Inactive
/// ```
///
/// 不存在嵌套或并发的 Active 会话：在 Active 中再次 start 会先
/// 强制收尾当前会话。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    /// 当前对话树 ID（从未开始过任何对话时为 None）
    pub active: Option<DialogueId>,
    /// 当前台词下标
    pub line_index: usize,
    /// 对话是否已结束
    ///
    /// 结束后 `active` 保留最后一棵树的 ID，便于存档展示。
    pub ended: bool,
}

impl EngineState {
    /// 创建初始状态（未开始任何对话）
    pub fn new() -> Self {
        Self {
            active: None,
            line_index: 0,
            ended: false,
        }
    }

    /// 是否处于 Active 阶段
    pub fn is_active(&self) -> bool {
        self.active.is_some() && !self.ended
    }

    /// 进入新会话：从指定树的第一句开始
    pub fn open(&mut self, id: DialogueId) {
        self.active = Some(id);
        self.line_index = 0;
        self.ended = false;
    }

    /// 收尾当前会话：标记结束并复位台词下标
    pub fn close(&mut self) {
        self.ended = true;
        self.line_index = 0;
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}
