//! # 命令执行器
//!
//! 把引擎发出的 Command 转发给各协作方：终端渲染（面板/台词/
//! 选项/继续按钮）、任务日志、玩家属性。执行器不包含对话逻辑，
//! 只负责呈现与转发。

use std::fmt;
use std::io::{self, Write};
use std::thread;

use dialogue_runtime::{ChoiceView, Command, LineView, Reveal, RevealConfig, Side, StatDelta};
use tracing::info;

/// 玩家属性（协作方）
///
/// 引擎只通过 `ApplyStats` 往这里加增量；不做钳制。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStats {
    pub morality: i32,
    pub coins: i32,
    pub health: i32,
}

impl PlayerStats {
    pub fn new() -> Self {
        Self {
            morality: 0,
            coins: 50,
            health: 100,
        }
    }

    /// 结算一次增量
    pub fn apply(&mut self, delta: &StatDelta) {
        self.morality = self.morality.saturating_add(delta.morality);
        self.coins = self.coins.saturating_add(delta.coins);
        self.health = self.health.saturating_add(delta.health);
    }
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "道德 {} | 金币 {} | 生命 {}",
            self.morality, self.coins, self.health
        )
    }
}

/// 任务日志（协作方）
#[derive(Debug, Default)]
pub struct QuestLog {
    entries: Vec<String>,
}

impl QuestLog {
    /// 追加一条日志
    pub fn add(&mut self, text: impl Into<String>) {
        let text = text.into();
        info!("日志 +「{}」", text);
        self.entries.push(text);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// 对话面板的终端呈现状态
///
/// "继续"默认可用：引擎只在分支点隐藏它、在选择后恢复。
#[derive(Debug)]
pub struct Panel {
    /// 面板是否可见
    pub visible: bool,
    /// "继续"是否可用（空行输入推进）
    pub continue_visible: bool,
    /// 当前展示的选项（编号从 1 开始对应下标）
    pub choices: Vec<ChoiceView>,
}

impl Panel {
    pub fn new() -> Self {
        Self {
            visible: false,
            continue_visible: true,
            choices: Vec::new(),
        }
    }

    /// 按玩家输入的编号取选项
    pub fn choice_at(&self, number: usize) -> Option<&ChoiceView> {
        number.checked_sub(1).and_then(|i| self.choices.get(i))
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

/// 命令执行器
pub struct CommandExecutor {
    /// 打字机参数
    reveal_config: RevealConfig,
    /// 跳过打字机，整句直出
    instant: bool,
}

impl CommandExecutor {
    pub fn new(instant: bool) -> Self {
        Self {
            reveal_config: RevealConfig::default(),
            instant,
        }
    }

    /// 按序执行一批指令
    pub fn execute_all(
        &mut self,
        commands: &[Command],
        panel: &mut Panel,
        stats: &mut PlayerStats,
        log: &mut QuestLog,
    ) {
        for command in commands {
            self.execute(command, panel, stats, log);
        }
    }

    /// 执行单条指令
    pub fn execute(
        &mut self,
        command: &Command,
        panel: &mut Panel,
        stats: &mut PlayerStats,
        log: &mut QuestLog,
    ) {
        match command {
            Command::ShowPanel => {
                panel.visible = true;
                println!("\n──────────────────────────────");
            }

            Command::HidePanel => {
                panel.visible = false;
                println!("──────────────────────────────");
            }

            Command::ShowLine { view } => self.render_line(view),

            Command::PresentChoices { choices } => {
                panel.choices = choices.clone();
                for (index, choice) in panel.choices.iter().enumerate() {
                    println!("  {}. {}", index + 1, choice.label);
                }
            }

            Command::ClearChoices => panel.choices.clear(),

            Command::ShowContinue => panel.continue_visible = true,

            Command::HideContinue => panel.continue_visible = false,

            Command::AppendLog { text } => log.add(text.clone()),

            Command::ApplyStats { delta } => {
                stats.apply(delta);
                if !delta.is_zero() {
                    info!("属性变化 → {}", stats);
                }
            }

            Command::DialogueEnded => info!("对话结束"),
        }
    }

    /// 渲染一句台词：说话者一侧加标记，正文逐字显示
    fn render_line(&mut self, view: &LineView) {
        let (left_marker, right_marker) = match view.side {
            Side::Left => ("▶", " "),
            Side::Right => (" ", "▶"),
        };
        println!(
            "\n{} {}　　{} {}",
            left_marker, view.left_name, right_marker, view.right_name
        );
        print!("  ");

        // 同一面板至多一个打字机：上一句在进入这里之前已播完或被跳过
        let mut reveal = Reveal::with_config(view.text.clone(), self.reveal_config);
        if self.instant {
            Reveal::skip(&mut reveal);
            println!("{}", reveal.visible());
            return;
        }

        for step in reveal {
            print!("{}", step.ch);
            let _ = io::stdout().flush();
            thread::sleep(step.delay);
        }
        println!();
    }
}
