//! # Engine 模块
//!
//! 对话状态机核心。
//!
//! ## 执行模型
//!
//! ```text
//! start / advance / select_choice -> Result<Vec<Command>, EngineError>
//! ```
//!
//! 每个操作要么成功并返回一批按序执行的 Command，要么返回一个
//! 可恢复的错误（此时不产出任何 Command）。Host 对错误只做记录，
//! 引擎始终保持一致、可继续使用的状态。

use crate::catalog::{Catalog, DialogueId, Line, Side};
use crate::command::{ChoiceView, Command, LineView};
use crate::effects::EffectTable;
use crate::error::EngineError;
use crate::history::{History, HistoryEvent};
use crate::input::PlayerInput;
use crate::state::EngineState;

/// 对话引擎
///
/// 这是 dialogue-runtime 的核心类型，驱动对话的推进与分支。
/// 引擎拥有对话目录与效果表（构建后只读），以及唯一的可变状态
/// [`EngineState`]。需要引擎的协作方显式持有它的引用，
/// 不存在全局单例。
///
/// # 使用示例
///
/// ```ignore
/// let catalog = Catalog::build(trees)?;
/// let mut engine = DialogueEngine::new(catalog, effects);
///
/// for cmd in engine.start(0)? {
///     host.execute(cmd);
/// }
///
/// // 玩家点击"继续" / 点击选项
/// let commands = engine.handle(PlayerInput::Advance)?;
/// ```
pub struct DialogueEngine {
    /// 对话目录（构建后只读）
    catalog: Catalog,
    /// 选项效果表
    effects: EffectTable,
    /// 引擎状态
    state: EngineState,
    /// 历史记录
    history: History,
}

impl DialogueEngine {
    /// 创建新的引擎实例
    pub fn new(catalog: Catalog, effects: EffectTable) -> Self {
        Self {
            catalog,
            effects,
            state: EngineState::new(),
            history: History::new(),
        }
    }

    /// 从保存的状态恢复引擎
    ///
    /// # 参数
    ///
    /// - `catalog` / `effects`: 必须与保存时相同的数据
    /// - `state`: 保存的引擎状态
    /// - `history`: 历史记录
    pub fn restore(
        catalog: Catalog,
        effects: EffectTable,
        state: EngineState,
        history: History,
    ) -> Self {
        Self {
            catalog,
            effects,
            state,
            history,
        }
    }

    /// 开始指定 ID 的对话
    ///
    /// 成功时引擎进入 Active，返回的指令显示面板与第一句台词。
    /// 若当前已有会话在进行，先强制收尾（其收尾指令排在最前）。
    /// 首句即终点的对话会显示一次后立即结束。
    ///
    /// 注意：开始时不生成选项控件——选项只在推进到分支点时出现。
    ///
    /// # 错误
    ///
    /// - [`EngineError::DialogueNotFound`]：ID 未注册，状态不变
    /// - [`EngineError::EmptyDialogue`]：目标树没有台词；引擎收尾
    ///   当前会话并落回 Inactive，不显示任何台词
    pub fn start(&mut self, id: DialogueId) -> Result<Vec<Command>, EngineError> {
        let (is_empty, first_is_end) = {
            let tree = self
                .catalog
                .get(id)
                .ok_or(EngineError::DialogueNotFound { id })?;
            (
                tree.lines.is_empty(),
                tree.lines.first().is_some_and(|line| line.is_end_node),
            )
        };

        if is_empty {
            self.state.close();
            self.history.push(HistoryEvent::ended());
            return Err(EngineError::EmptyDialogue { id });
        }

        let mut commands = Vec::new();

        if self.state.is_active() {
            // 不允许嵌套会话：先终止上一段，清掉残留的选项控件
            self.close_session(&mut commands);
        }

        self.state.open(id);
        commands.push(Command::ShowPanel);
        self.push_line(&mut commands);

        if first_is_end {
            // 首句即终点：显示一次后立即结束
            self.close_session(&mut commands);
        }

        Ok(commands)
    }

    /// 推进到下一句
    ///
    /// 算法：当前句是终点则结束对话；否则转发日志文本（如有，
    /// 每次经过都转发）、下标加一、越界绕回 0、显示新句并重算
    /// 分支 UI（有选项则生成控件并隐藏"继续"，否则确保"继续"
    /// 可见）。
    ///
    /// # 错误
    ///
    /// - 引擎不在 Active 阶段（未开始或已结束）
    /// - 当前句是分支点：必须等玩家选择，不能直接推进
    pub fn advance(&mut self) -> Result<Vec<Command>, EngineError> {
        if !self.state.is_active() {
            return Err(EngineError::InvalidState {
                message: "对话未开始或已结束，无法推进".to_string(),
            });
        }

        let (is_end, is_branch, log_text, line_count) = {
            let line = self.current_line().ok_or_else(|| EngineError::InvalidState {
                message: "台词下标越界".to_string(),
            })?;
            (
                line.is_end_node,
                line.is_branch_point(),
                line.log_text.clone().filter(|text| !text.is_empty()),
                self.current_tree_len(),
            )
        };

        if is_end {
            return Ok(self.end());
        }

        if is_branch {
            return Err(EngineError::InvalidState {
                message: "当前台词有未选择的分支，等待玩家选择".to_string(),
            });
        }

        let mut commands = Vec::new();

        if let Some(text) = log_text {
            self.history.push(HistoryEvent::log_added(text.clone()));
            commands.push(Command::AppendLog { text });
        }

        self.state.line_index += 1;
        if self.state.line_index >= line_count {
            // 越界绕回开头，自然终止依赖终点标记
            self.state.line_index = 0;
        }

        self.push_line(&mut commands);

        let choices = self.current_choices();
        if choices.is_empty() {
            commands.push(Command::ShowContinue);
        } else {
            commands.push(Command::PresentChoices { choices });
            commands.push(Command::HideContinue);
        }

        Ok(commands)
    }

    /// 选择分支，跳转到目标对话树
    ///
    /// 成功时先按效果表结算一次增量（未登记的目标为零增量），
    /// 然后切换到目标树并从第一句重新开始——无论目标树之前
    /// 播放到哪里，分支总是从头开始。
    ///
    /// 引擎不校验 `target` 是否出现在当前台词的选项里：控件由
    /// 引擎生成，目标合法性由展示方保证。
    ///
    /// # 错误
    ///
    /// - 引擎不在 Active 阶段
    /// - 目标 ID 未注册，或目标树没有台词；两种情况都不改变
    ///   任何状态，也不结算效果
    pub fn select_choice(&mut self, target: DialogueId) -> Result<Vec<Command>, EngineError> {
        if !self.state.is_active() {
            return Err(EngineError::InvalidState {
                message: "对话未开始或已结束，无法选择分支".to_string(),
            });
        }

        let tree = self
            .catalog
            .get(target)
            .ok_or(EngineError::DialogueNotFound { id: target })?;
        if tree.lines.is_empty() {
            return Err(EngineError::EmptyDialogue { id: target });
        }

        let label = self
            .current_line()
            .and_then(|line| line.choices.iter().find(|c| c.target == target))
            .map(|c| c.label.clone());
        let delta = self.effects.delta_for(target);

        let mut commands = Vec::new();
        self.history.push(HistoryEvent::choice_made(label, target));
        commands.push(Command::ApplyStats { delta });
        commands.push(Command::ShowContinue);
        commands.push(Command::ClearChoices);

        self.state.open(target);
        self.push_line(&mut commands);

        Ok(commands)
    }

    /// 结束当前对话
    ///
    /// 幂等，永不失败。每次调用都重新发出完整的收尾指令
    /// （清选项、隐藏面板、结束通知），监听方需自行容忍重复通知。
    pub fn end(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        self.close_session(&mut commands);
        commands
    }

    /// 处理玩家输入
    ///
    /// UI 回调的统一入口：把语义化输入分发到对应操作。
    pub fn handle(&mut self, input: PlayerInput) -> Result<Vec<Command>, EngineError> {
        match input {
            PlayerInput::Advance => self.advance(),
            PlayerInput::Choose { target } => self.select_choice(target),
        }
    }

    /// 是否处于 Active 阶段
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// 对话是否已结束
    pub fn has_ended(&self) -> bool {
        self.state.ended
    }

    /// 当前会话对应的台词（结束后仍指向最后一棵树的首句）
    pub fn current_line(&self) -> Option<&Line> {
        let tree = self.state.active.and_then(|id| self.catalog.get(id))?;
        tree.lines.get(self.state.line_index)
    }

    /// 当前台词快照
    pub fn current_view(&self) -> Option<LineView> {
        let tree = self.state.active.and_then(|id| self.catalog.get(id))?;
        let line = tree.lines.get(self.state.line_index)?;

        Some(LineView {
            left_name: tree.left_name.clone(),
            right_name: tree.right_name.clone(),
            left_portrait: tree.left_portrait.clone(),
            right_portrait: tree.right_portrait.clone(),
            side: line.side,
            text: line.text.clone(),
        })
    }

    /// 获取对话目录
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// 获取效果表
    pub fn effects(&self) -> &EffectTable {
        &self.effects
    }

    /// 获取当前状态（用于存档）
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// 恢复状态（用于读档）
    ///
    /// 注意：调用方需要确保 state 引用的对话树存在于当前目录中。
    pub fn restore_state(&mut self, state: EngineState) {
        self.state = state;
    }

    /// 获取历史记录
    pub fn history(&self) -> &History {
        &self.history
    }

    /// 恢复历史记录（用于读档）
    pub fn restore_history(&mut self, history: History) {
        self.history = history;
    }

    /// 当前树的台词数量
    fn current_tree_len(&self) -> usize {
        self.state
            .active
            .and_then(|id| self.catalog.get(id))
            .map(|tree| tree.lines.len())
            .unwrap_or(0)
    }

    /// 当前台词的选项展示列表
    fn current_choices(&self) -> Vec<ChoiceView> {
        self.current_line()
            .map(|line| {
                line.choices
                    .iter()
                    .map(|c| ChoiceView {
                        target: c.target,
                        label: c.label.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 显示当前台词并记入历史
    fn push_line(&mut self, commands: &mut Vec<Command>) {
        if let Some(view) = self.current_view() {
            let name = match view.side {
                Side::Left => view.left_name.clone(),
                Side::Right => view.right_name.clone(),
            };
            self.history
                .push(HistoryEvent::line_shown(name, view.side, view.text.clone()));
            commands.push(Command::ShowLine { view });
        }
    }

    /// 收尾当前会话
    fn close_session(&mut self, commands: &mut Vec<Command>) {
        self.state.close();
        self.history.push(HistoryEvent::ended());
        commands.push(Command::ClearChoices);
        commands.push(Command::HidePanel);
        commands.push(Command::DialogueEnded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Choice, DialogueTree};
    use crate::effects::StatDelta;

    fn tree(id: DialogueId, lines: Vec<Line>) -> DialogueTree {
        DialogueTree {
            id,
            lines,
            left_name: "艾琳".to_string(),
            right_name: "村长".to_string(),
            left_portrait: None,
            right_portrait: None,
        }
    }

    fn test_engine() -> DialogueEngine {
        let trees = vec![
            tree(
                0,
                vec![
                    Line::new(Side::Right, "你终于来了。"),
                    Line::new(Side::Left, "村里出什么事了？").with_log("接下了村长的委托"),
                    Line::new(Side::Right, "你愿意帮忙吗？").with_choices(vec![
                        Choice {
                            target: 1,
                            label: "我来帮忙".to_string(),
                        },
                        Choice {
                            target: 2,
                            label: "给我报酬".to_string(),
                        },
                    ]),
                ],
            ),
            tree(
                1,
                vec![
                    Line::new(Side::Left, "交给我吧。"),
                    Line::new(Side::Right, "谢谢你！").end_node(),
                ],
            ),
            tree(2, vec![Line::new(Side::Left, "先付钱。").end_node()]),
            tree(9, Vec::new()),
        ];
        let catalog = Catalog::build(trees).unwrap();
        let effects = EffectTable::from_entries([
            (1, StatDelta::new(10, 0, 0)),
            (2, StatDelta::new(-10, 20, 0)),
        ]);
        DialogueEngine::new(catalog, effects)
    }

    fn shown_text(commands: &[Command]) -> Option<&str> {
        commands.iter().find_map(|cmd| match cmd {
            Command::ShowLine { view } => Some(view.text.as_str()),
            _ => None,
        })
    }

    #[test]
    fn test_start_shows_first_line() {
        let mut engine = test_engine();
        let commands = engine.start(0).unwrap();

        assert!(engine.is_active());
        assert_eq!(engine.state().line_index, 0);
        assert_eq!(commands[0], Command::ShowPanel);
        assert_eq!(shown_text(&commands), Some("你终于来了。"));
        // 开始时不生成选项控件
        assert!(!commands
            .iter()
            .any(|c| matches!(c, Command::PresentChoices { .. })));
    }

    #[test]
    fn test_start_unknown_id_leaves_state_unchanged() {
        let mut engine = test_engine();
        engine.start(0).unwrap();

        let err = engine.start(42).unwrap_err();
        assert_eq!(err, EngineError::DialogueNotFound { id: 42 });
        assert!(engine.is_active());
        assert_eq!(engine.state().active, Some(0));
    }

    #[test]
    fn test_start_empty_tree_ends_immediately() {
        let mut engine = test_engine();

        let err = engine.start(9).unwrap_err();
        assert_eq!(err, EngineError::EmptyDialogue { id: 9 });
        assert!(engine.has_ended());
        assert!(!engine.is_active());
    }

    #[test]
    fn test_start_while_active_force_terminates() {
        let mut engine = test_engine();
        engine.start(0).unwrap();

        let commands = engine.start(1).unwrap();

        // 上一段会话的收尾指令排在新面板之前
        let ended_at = commands
            .iter()
            .position(|c| matches!(c, Command::DialogueEnded))
            .unwrap();
        let panel_at = commands
            .iter()
            .position(|c| matches!(c, Command::ShowPanel))
            .unwrap();
        assert!(ended_at < panel_at);
        assert_eq!(engine.state().active, Some(1));
        assert_eq!(engine.state().line_index, 0);
    }

    #[test]
    fn test_start_first_line_end_node_shows_once_then_ends() {
        let mut engine = test_engine();
        let commands = engine.start(2).unwrap();

        // 台词先显示一次，然后立即收尾
        assert_eq!(shown_text(&commands), Some("先付钱。"));
        assert!(commands.iter().any(|c| matches!(c, Command::DialogueEnded)));
        assert!(engine.has_ended());
    }

    #[test]
    fn test_advance_moves_to_next_line() {
        let mut engine = test_engine();
        engine.start(0).unwrap();

        let commands = engine.advance().unwrap();
        assert_eq!(engine.state().line_index, 1);
        assert_eq!(shown_text(&commands), Some("村里出什么事了？"));
        assert!(commands.iter().any(|c| matches!(c, Command::ShowContinue)));
    }

    #[test]
    fn test_advance_onto_branch_point_presents_choices() {
        let mut engine = test_engine();
        engine.start(0).unwrap();
        engine.advance().unwrap();

        let commands = engine.advance().unwrap();
        assert!(matches!(
            commands
                .iter()
                .find(|c| matches!(c, Command::PresentChoices { .. })),
            Some(Command::PresentChoices { choices }) if choices.len() == 2
        ));
        assert!(commands.iter().any(|c| matches!(c, Command::HideContinue)));
    }

    #[test]
    fn test_advance_emits_log_on_leaving_line() {
        let mut engine = test_engine();
        engine.start(0).unwrap();

        // 离开第 0 句：无日志
        let commands = engine.advance().unwrap();
        assert!(!commands
            .iter()
            .any(|c| matches!(c, Command::AppendLog { .. })));

        // 离开第 1 句：转发日志
        let commands = engine.advance().unwrap();
        assert!(matches!(
            commands.iter().find(|c| matches!(c, Command::AppendLog { .. })),
            Some(Command::AppendLog { text }) if text == "接下了村长的委托"
        ));
    }

    #[test]
    fn test_advance_on_branch_point_is_rejected() {
        let mut engine = test_engine();
        engine.start(0).unwrap();
        engine.advance().unwrap();
        engine.advance().unwrap(); // 到达分支点

        let err = engine.advance().unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));
        // 状态不变
        assert_eq!(engine.state().line_index, 2);
        assert!(engine.is_active());
    }

    #[test]
    fn test_advance_on_end_node_closes_session() {
        let mut engine = test_engine();
        engine.start(1).unwrap();
        engine.advance().unwrap(); // 到"谢谢你！"（终点）

        let commands = engine.advance().unwrap();
        assert!(commands.iter().any(|c| matches!(c, Command::DialogueEnded)));
        assert!(commands.iter().any(|c| matches!(c, Command::HidePanel)));
        assert!(engine.has_ended());
        assert_eq!(engine.state().line_index, 0);

        // 结束后再推进是无效操作
        assert!(matches!(
            engine.advance(),
            Err(EngineError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_select_choice_applies_effects_and_restarts_target() {
        let mut engine = test_engine();
        engine.start(0).unwrap();
        engine.advance().unwrap();
        engine.advance().unwrap(); // 分支点

        let commands = engine.select_choice(2).unwrap();

        let deltas: Vec<&StatDelta> = commands
            .iter()
            .filter_map(|c| match c {
                Command::ApplyStats { delta } => Some(delta),
                _ => None,
            })
            .collect();
        assert_eq!(deltas, vec![&StatDelta::new(-10, 20, 0)]);

        assert_eq!(engine.state().active, Some(2));
        assert_eq!(engine.state().line_index, 0);
        assert!(commands.iter().any(|c| matches!(c, Command::ClearChoices)));
        assert_eq!(shown_text(&commands), Some("先付钱。"));
    }

    #[test]
    fn test_select_choice_unknown_target_no_mutation() {
        let mut engine = test_engine();
        engine.start(0).unwrap();
        engine.advance().unwrap();
        engine.advance().unwrap();

        let err = engine.select_choice(77).unwrap_err();
        assert_eq!(err, EngineError::DialogueNotFound { id: 77 });
        assert_eq!(engine.state().active, Some(0));
        assert_eq!(engine.state().line_index, 2);
        assert!(engine.is_active());
    }

    #[test]
    fn test_select_choice_empty_target_no_effects() {
        let mut engine = test_engine();
        engine.start(0).unwrap();

        let err = engine.select_choice(9).unwrap_err();
        assert_eq!(err, EngineError::EmptyDialogue { id: 9 });
        // 不切树、不结算
        assert_eq!(engine.state().active, Some(0));
        assert!(engine.is_active());
    }

    #[test]
    fn test_select_choice_unregistered_effect_is_zero() {
        let catalog = Catalog::build(vec![
            tree(
                0,
                vec![Line::new(Side::Right, "选吧。").with_choices(vec![Choice {
                    target: 3,
                    label: "未登记".to_string(),
                }])],
            ),
            tree(3, vec![Line::new(Side::Left, "到了。").end_node()]),
        ])
        .unwrap();
        let mut engine = DialogueEngine::new(catalog, EffectTable::new());
        engine.start(0).unwrap();

        let commands = engine.select_choice(3).unwrap();
        assert!(matches!(
            commands.iter().find(|c| matches!(c, Command::ApplyStats { .. })),
            Some(Command::ApplyStats { delta }) if delta.is_zero()
        ));
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut engine = test_engine();
        engine.start(0).unwrap();

        let first = engine.end();
        assert!(engine.has_ended());
        assert!(first.iter().any(|c| matches!(c, Command::DialogueEnded)));

        // 再次调用仍然发出完整收尾指令，状态保持结束
        let second = engine.end();
        assert_eq!(first, second);
        assert!(engine.has_ended());
    }

    #[test]
    fn test_handle_dispatch() {
        let mut engine = test_engine();
        engine.start(0).unwrap();

        let commands = engine.handle(PlayerInput::Advance).unwrap();
        assert_eq!(shown_text(&commands), Some("村里出什么事了？"));

        engine.handle(PlayerInput::Advance).unwrap();
        let commands = engine.handle(PlayerInput::Choose { target: 1 }).unwrap();
        assert_eq!(engine.state().active, Some(1));
        assert_eq!(shown_text(&commands), Some("交给我吧。"));
    }

    #[test]
    fn test_history_recording() {
        let mut engine = test_engine();
        engine.start(0).unwrap();
        engine.advance().unwrap();
        engine.advance().unwrap();
        engine.select_choice(1).unwrap();

        let history = engine.history();
        // 4 次台词显示 + 1 次日志 + 1 次选择
        assert_eq!(history.line_count(), 4);
        assert!(history
            .events()
            .iter()
            .any(|e| matches!(e, HistoryEvent::LogAdded { text, .. } if text == "接下了村长的委托")));
        assert!(history
            .events()
            .iter()
            .any(|e| matches!(e, HistoryEvent::ChoiceMade { target: 1, label: Some(l), .. } if l == "我来帮忙")));
    }

    #[test]
    fn test_state_save_restore() {
        let mut engine = test_engine();
        engine.start(0).unwrap();
        engine.advance().unwrap();

        let saved_state = engine.state().clone();
        let saved_history = engine.history().clone();

        engine.advance().unwrap();
        assert_eq!(engine.state().line_index, 2);

        engine.restore_state(saved_state);
        engine.restore_history(saved_history);
        assert_eq!(engine.state().line_index, 1);
        assert_eq!(engine.history().line_count(), 2);
        assert_eq!(engine.current_line().unwrap().text, "村里出什么事了？");
    }
}
