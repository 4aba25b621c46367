//! # Input 模块
//!
//! 定义 Host 向引擎传递的玩家输入。
//!
//! ## 设计说明
//!
//! - `PlayerInput` 是 Host 采集用户操作后，传递给引擎的语义化输入
//! - 引擎不直接处理鼠标/键盘事件，只处理"继续"与"选择"两种语义
//! - 开始与结束对话由交互触发方直接调用引擎方法，不走玩家输入

use serde::{Deserialize, Serialize};

use crate::catalog::DialogueId;

/// Host 向引擎传递的玩家输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerInput {
    /// 点击"继续"，推进到下一句
    Advance,

    /// 点击某个选项控件
    ///
    /// `target` 是控件生成时携带的跳转目标 ID。
    Choose { target: DialogueId },
}

impl PlayerInput {
    /// 创建推进输入
    pub fn advance() -> Self {
        Self::Advance
    }

    /// 创建选择输入
    pub fn choose(target: DialogueId) -> Self {
        Self::Choose { target }
    }
}
