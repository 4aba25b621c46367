//! # 终端 Host
//!
//! 加载 JSON 对话目录与效果表，驱动对话引擎，把 Command 转发给
//! 终端渲染 / 任务日志 / 玩家属性三个协作方。
//!
//! ## 操作
//!
//! - 空行：继续（推进到下一句）
//! - 数字：选择对应编号的选项
//! - `start <ID>`：开始指定对话
//! - `stats` / `log` / `history`：查看属性 / 任务日志 / 历史回看
//! - `q`：退出

mod executor;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use dialogue_runtime::{
    Catalog, Command, DiagnosticLevel, DialogueEngine, DialogueId, DialogueTree, EffectTable,
    EngineError, HistoryEvent, PlayerInput, analyze_catalog, validate_strict,
};

use executor::{CommandExecutor, Panel, PlayerStats, QuestLog};

#[derive(Parser, Debug)]
#[command(name = "dialogue-host", about = "终端对话 Host：加载目录并驱动对话引擎")]
struct Args {
    /// 对话目录 JSON 文件
    #[arg(long, default_value = "assets/dialogues.json")]
    catalog: PathBuf,

    /// 效果表 JSON 文件
    #[arg(long, default_value = "assets/effects.json")]
    effects: PathBuf,

    /// 启动时进入的对话 ID
    #[arg(long, default_value_t = 0)]
    start: DialogueId,

    /// 加载前严格校验目录（空树 / 坏目标 / 缺终点直接拒绝）
    #[arg(long)]
    strict: bool,

    /// 跳过打字机效果，整句直出
    #[arg(long)]
    instant: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = Args::parse();

    let engine = load_engine(&args)?;
    run(engine, &args)
}

/// 加载目录与效果表，构建引擎
fn load_engine(args: &Args) -> Result<DialogueEngine> {
    let text = fs::read_to_string(&args.catalog)
        .with_context(|| format!("读取对话目录 {} 失败", args.catalog.display()))?;
    let trees: Vec<DialogueTree> =
        serde_json::from_str(&text).context("解析对话目录失败")?;

    let catalog = Catalog::build(trees).context("构建对话目录失败")?;
    info!("已加载 {} 段对话", catalog.len());

    for diagnostic in analyze_catalog(&catalog).diagnostics {
        match diagnostic.level {
            DiagnosticLevel::Error => error!("{diagnostic}"),
            DiagnosticLevel::Warn => warn!("{diagnostic}"),
            DiagnosticLevel::Info => info!("{diagnostic}"),
        }
    }

    if args.strict {
        validate_strict(&catalog).context("严格校验失败")?;
    }

    let effects = load_effects(&args.effects)?;
    Ok(DialogueEngine::new(catalog, effects))
}

/// 加载效果表；文件不存在时退化为空表（所有选项零增量）
fn load_effects(path: &PathBuf) -> Result<EffectTable> {
    if !path.exists() {
        warn!("效果表 {} 不存在，使用空表", path.display());
        return Ok(EffectTable::new());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("读取效果表 {} 失败", path.display()))?;
    serde_json::from_str(&text).context("解析效果表失败")
}

/// 主循环：读取玩家输入，驱动引擎，转发指令
fn run(mut engine: DialogueEngine, args: &Args) -> Result<()> {
    let mut executor = CommandExecutor::new(args.instant);
    let mut panel = Panel::new();
    let mut stats = PlayerStats::new();
    let mut log = QuestLog::default();

    let result = engine.start(args.start);
    absorb(result, &engine, &mut executor, &mut panel, &mut stats, &mut log);

    let stdin = io::stdin();
    prompt();
    for line in stdin.lock().lines() {
        let line = line.context("读取输入失败")?;
        let input = line.trim();

        match input {
            "" => {
                if panel.continue_visible && engine.is_active() {
                    let result = engine.handle(PlayerInput::Advance);
                    absorb(result, &engine, &mut executor, &mut panel, &mut stats, &mut log);
                } else if !engine.is_active() {
                    println!("当前没有进行中的对话，输入 start <ID> 开始");
                } else {
                    println!("请输入编号选择一个选项");
                }
            }

            "q" | "quit" | "exit" => break,

            "stats" => println!("{stats}"),

            "log" => {
                for entry in log.entries() {
                    println!("  · {entry}");
                }
            }

            "history" => {
                for event in engine.history().recent_lines(10) {
                    if let HistoryEvent::LineShown { name, text, .. } = event {
                        println!("  {}：{}", name, text);
                    }
                }
            }

            _ => {
                if let Ok(number) = input.parse::<usize>() {
                    choose(number, &mut engine, &mut executor, &mut panel, &mut stats, &mut log);
                } else if let Some(id_text) = input.strip_prefix("start ") {
                    match id_text.trim().parse::<DialogueId>() {
                        Ok(id) => {
                            let result = engine.start(id);
                            absorb(result, &engine, &mut executor, &mut panel, &mut stats, &mut log);
                        }
                        Err(_) => println!("无法解析对话 ID：{id_text}"),
                    }
                } else {
                    println!("空行=继续，数字=选择，start <ID> / stats / log / history / q");
                }
            }
        }

        prompt();
    }

    Ok(())
}

/// 按编号选择当前展示的选项
fn choose(
    number: usize,
    engine: &mut DialogueEngine,
    executor: &mut CommandExecutor,
    panel: &mut Panel,
    stats: &mut PlayerStats,
    log: &mut QuestLog,
) {
    let Some(target) = panel.choice_at(number).map(|c| c.target) else {
        println!("没有编号为 {number} 的选项");
        return;
    };
    let result = engine.select_choice(target);
    absorb(result, engine, executor, panel, stats, log);
}

/// 吸收引擎结果：成功则执行指令，失败则记录日志并继续
///
/// 错误被吸收后把面板可见性与引擎阶段对齐（开始空对话会在
/// 返回错误前强制收尾当前会话）。
fn absorb(
    result: Result<Vec<Command>, EngineError>,
    engine: &DialogueEngine,
    executor: &mut CommandExecutor,
    panel: &mut Panel,
    stats: &mut PlayerStats,
    log: &mut QuestLog,
) {
    match result {
        Ok(commands) => executor.execute_all(&commands, panel, stats, log),
        Err(err) => {
            warn!("{err}");
            if !engine.is_active() {
                panel.visible = false;
                panel.choices.clear();
            }
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
