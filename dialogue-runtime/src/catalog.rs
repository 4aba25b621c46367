//! # Catalog 模块
//!
//! 对话数据模型与对话目录。
//!
//! ## 设计说明
//!
//! 数据模型是两层固定结构：对话树（DialogueTree）按数字 ID 注册到
//! 目录（Catalog）中，每棵树持有一段有序台词（Line），台词上可以
//! 挂零个或多个选项（Choice）。加载完成后所有数据不可变，
//! 引擎只读不写。

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostic::Diagnostic;
use crate::error::CatalogError;

/// 对话树标识符
///
/// 与选项的跳转目标共用同一个 ID 空间。
pub type DialogueId = i32;

/// 说话者所在的一侧
///
/// 对话面板左右各有一位角色，每句台词由其中一侧说出。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 左侧角色
    Left,
    /// 右侧角色
    Right,
}

impl Side {
    /// 从字符串解析（便捷方法）
    pub fn parse(s: &str) -> Option<Self> {
        Self::from_str(s).ok()
    }
}

impl FromStr for Side {
    type Err = ();

    /// 从字符串解析一侧（不区分大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(()),
        }
    }
}

/// 选项
///
/// 玩家可选的分支：跳转到目标对话树，同时按效果表结算一次增量。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// 跳转目标对话树 ID
    pub target: DialogueId,
    /// 选项按钮上显示的文本
    pub label: String,
}

/// 台词
///
/// 一句显示在对话面板上的话。
///
/// 约束：`is_end_node == true` 的台词是对话终点，推进到它之后
/// 对话结束，不会再读取"下一句"。`choices` 非空且不是终点的台词
/// 是分支点，引擎不会在玩家选择之前继续推进。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// 说话者在哪一侧
    pub side: Side,
    /// 台词文本
    pub text: String,
    /// 本句挂载的选项（空表示普通台词）
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// 是否对话终点
    #[serde(default)]
    pub is_end_node: bool,
    /// 推进离开本句时写入日志的文本（不需要时留空）
    #[serde(default)]
    pub log_text: Option<String>,
}

impl Line {
    /// 创建一句普通台词
    pub fn new(side: Side, text: impl Into<String>) -> Self {
        Self {
            side,
            text: text.into(),
            choices: Vec::new(),
            is_end_node: false,
            log_text: None,
        }
    }

    /// 标记为对话终点
    pub fn end_node(mut self) -> Self {
        self.is_end_node = true;
        self
    }

    /// 挂载选项
    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    /// 设置日志文本
    pub fn with_log(mut self, text: impl Into<String>) -> Self {
        self.log_text = Some(text.into());
        self
    }

    /// 是否分支点（有选项且不是终点）
    pub fn is_branch_point(&self) -> bool {
        !self.choices.is_empty() && !self.is_end_node
    }
}

/// 对话树
///
/// 一段完整对话：有序台词序列，加上左右两位角色的名字与立绘。
/// 立绘以资源路径表示，由 Host 负责解析加载。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTree {
    /// 目录内唯一的数字 ID
    pub id: DialogueId,
    /// 台词序列（合法数据非空）
    pub lines: Vec<Line>,
    /// 左侧角色名
    pub left_name: String,
    /// 右侧角色名
    pub right_name: String,
    /// 左侧立绘路径
    #[serde(default)]
    pub left_portrait: Option<String>,
    /// 右侧立绘路径
    #[serde(default)]
    pub right_portrait: Option<String>,
}

impl DialogueTree {
    /// 是否有终点台词
    ///
    /// 没有终点的树在推进越界时会绕回开头循环播放。
    pub fn has_end_node(&self) -> bool {
        self.lines.iter().any(|line| line.is_end_node)
    }
}

/// 对话目录
///
/// 启动时一次性构建的不可变集合，按 ID 索引对话树。
/// 引擎持有目录只读访问，所有树由目录拥有。
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// ID → 对话树
    trees: HashMap<DialogueId, DialogueTree>,
    /// 构建期间记录的警告（重复 ID 等）
    warnings: Vec<Diagnostic>,
}

impl Catalog {
    /// 从对话树列表构建目录
    ///
    /// ID 冲突时**先到者保留**，后到的整棵树被跳过并记录一条警告
    /// （通过 [`Catalog::warnings`] 读取，由 Host 负责输出）。
    ///
    /// # 错误
    ///
    /// 输入为空时返回 [`CatalogError::EmptyCatalog`]：
    /// 没有任何对话可以开始，调用方必须处理。
    pub fn build(trees: Vec<DialogueTree>) -> Result<Self, CatalogError> {
        if trees.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut map: HashMap<DialogueId, DialogueTree> = HashMap::new();
        let mut warnings = Vec::new();

        for tree in trees {
            if map.contains_key(&tree.id) {
                warnings.push(
                    Diagnostic::warn("重复的对话 ID，后一条已跳过").with_dialogue(tree.id),
                );
                continue;
            }
            map.insert(tree.id, tree);
        }

        Ok(Self {
            trees: map,
            warnings,
        })
    }

    /// 按 ID 查找对话树（纯读取）
    pub fn get(&self, id: DialogueId) -> Option<&DialogueTree> {
        self.trees.get(&id)
    }

    /// 是否包含指定 ID
    pub fn contains(&self, id: DialogueId) -> bool {
        self.trees.contains_key(&id)
    }

    /// 目录内的对话树数量
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// 所有已注册的 ID（无序）
    pub fn ids(&self) -> impl Iterator<Item = DialogueId> + '_ {
        self.trees.keys().copied()
    }

    /// 构建期间记录的警告
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}
