//! # Command 模块
//!
//! 定义引擎向 Host 发出的所有指令。
//! Command 是引擎与 Host 之间的**唯一通信方式**。
//!
//! ## 设计原则
//!
//! - **声明式**：Command 描述"做什么"，不描述"怎么做"
//! - **无副作用**：Command 本身不执行任何操作
//! - **引擎无关**：不包含任何 UI 框架或渲染后端的类型

use serde::{Deserialize, Serialize};

use crate::catalog::{DialogueId, Side};
use crate::effects::StatDelta;

/// 当前台词快照
///
/// 每次台词切换推送给渲染方的完整信息：两位角色的名字与立绘、
/// 正在说话的一侧、台词文本。渲染方据此高亮说话者（非说话者
/// 变暗或隐藏由渲染方自行决定）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineView {
    /// 左侧角色名
    pub left_name: String,
    /// 右侧角色名
    pub right_name: String,
    /// 左侧立绘路径
    pub left_portrait: Option<String>,
    /// 右侧立绘路径
    pub right_portrait: Option<String>,
    /// 正在说话的一侧
    pub side: Side,
    /// 台词文本
    pub text: String,
}

/// 选项展示项
///
/// 渲染方按给定顺序为每一项生成一个控件，点击后以 `target`
/// 回调引擎。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceView {
    /// 跳转目标对话树 ID
    pub target: DialogueId,
    /// 按钮文本
    pub label: String,
}

/// 引擎向 Host 发出的指令
///
/// Host 接收 Command 后，将其转发给对应的协作方：
/// 渲染方（面板/台词/选项/继续按钮）、日志方（`AppendLog`）、
/// 玩家属性方（`ApplyStats`）、任意数量的结束监听方
/// （`DialogueEnded`，发后不理，不保证监听方之间的顺序）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// 显示对话面板
    ShowPanel,

    /// 隐藏对话面板
    HidePanel,

    /// 台词切换，推送当前台词快照
    ShowLine {
        /// 快照内容
        view: LineView,
    },

    /// 展示选项控件（按给定顺序）
    PresentChoices {
        /// 选项列表
        choices: Vec<ChoiceView>,
    },

    /// 清除已展示的选项控件
    ClearChoices,

    /// 显示"继续"按钮
    ShowContinue,

    /// 隐藏"继续"按钮
    HideContinue,

    /// 向日志方追加一条文本
    AppendLog {
        /// 日志内容
        text: String,
    },

    /// 向玩家属性方结算一次增量
    ApplyStats {
        /// 属性增量（未登记的选项为零增量）
        delta: StatDelta,
    },

    /// 对话结束通知
    DialogueEnded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = Command::ShowLine {
            view: LineView {
                left_name: "艾琳".to_string(),
                right_name: "村长".to_string(),
                left_portrait: Some("portraits/ailin.png".to_string()),
                right_portrait: None,
                side: Side::Right,
                text: "你终于来了。".to_string(),
            },
        };

        let json = serde_json::to_string(&cmd).unwrap();
        let deserialized: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, deserialized);
    }

    #[test]
    fn test_choice_view_order_preserved() {
        let cmd = Command::PresentChoices {
            choices: vec![
                ChoiceView {
                    target: 1,
                    label: "我来帮忙".to_string(),
                },
                ChoiceView {
                    target: 2,
                    label: "给我报酬".to_string(),
                },
            ],
        };

        if let Command::PresentChoices { choices } = &cmd {
            assert_eq!(choices[0].target, 1);
            assert_eq!(choices[1].target, 2);
        } else {
            unreachable!();
        }
    }

    #[test]
    fn test_apply_stats_serialization() {
        let cmd = Command::ApplyStats {
            delta: StatDelta::new(-10, 20, 0),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        let deserialized: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, deserialized);
    }
}
