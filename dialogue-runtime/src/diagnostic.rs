//! # 诊断模块
//!
//! 对话目录的静态检查 API，不依赖 IO 或引擎。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行（编辑器、导入管线、CI）
//! - 诊断分级：Error（必须修复）、Warn（建议修复）、Info（信息提示）
//! - 严格模式把致命问题升级为错误返回，供制作管线在加载前拦截

use crate::catalog::{Catalog, DialogueId};
use crate::error::CatalogError;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 相关对话树 ID（目录级问题为 None）
    pub dialogue_id: Option<DialogueId>,
    /// 诊断消息
    pub message: String,
    /// 诊断详情（可选）
    pub detail: Option<String>,
}

impl Diagnostic {
    /// 创建错误诊断
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            dialogue_id: None,
            message: message.into(),
            detail: None,
        }
    }

    /// 创建警告诊断
    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            dialogue_id: None,
            message: message.into(),
            detail: None,
        }
    }

    /// 创建信息诊断
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            dialogue_id: None,
            message: message.into(),
            detail: None,
        }
    }

    /// 关联对话树 ID
    pub fn with_dialogue(mut self, id: DialogueId) -> Self {
        self.dialogue_id = Some(id);
        self
    }

    /// 设置详情
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.level)?;
        if let Some(id) = self.dialogue_id {
            write!(f, " 对话 {}", id)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  | {}", detail)?;
        }
        Ok(())
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .count()
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .count()
    }

    /// 是否存在错误级诊断
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// 分析整个目录
///
/// 检查项：
///
/// - 没有任何台词的树 → Error（开始即结束，无法显示）
/// - 选项指向目录中不存在的目标 → Error（运行时选择会被拒绝）
/// - 没有终点台词的树 → Warn（推进越界后绕回开头无限循环）
///
/// 构建目录时记录的警告（重复 ID）也会合并进结果。
pub fn analyze_catalog(catalog: &Catalog) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();

    for warning in catalog.warnings() {
        result.push(warning.clone());
    }

    for id in sorted_ids(catalog) {
        let Some(tree) = catalog.get(id) else {
            continue;
        };

        if tree.lines.is_empty() {
            result.push(Diagnostic::error("没有任何台词").with_dialogue(id));
            continue;
        }

        for (index, line) in tree.lines.iter().enumerate() {
            for choice in &line.choices {
                if !catalog.contains(choice.target) {
                    result.push(
                        Diagnostic::error(format!("选项指向不存在的目标 {}", choice.target))
                            .with_dialogue(id)
                            .with_detail(format!("第 {} 句「{}」", index, choice.label)),
                    );
                }
            }
        }

        if !tree.has_end_node() {
            result.push(
                Diagnostic::warn("缺少终点台词，推进越界后会循环播放").with_dialogue(id),
            );
        }
    }

    result
}

/// 严格校验目录
///
/// 制作管线用的加载前拦截：任何会导致运行时静默退化的问题都
/// 变成硬错误，包括绕回行为掩盖的无限循环。
///
/// # 错误
///
/// - [`CatalogError::EmptyDialogue`]：树没有台词
/// - [`CatalogError::MissingChoiceTarget`]：选项目标未注册
/// - [`CatalogError::UnterminatedDialogue`]：树没有终点台词
pub fn validate_strict(catalog: &Catalog) -> Result<(), CatalogError> {
    for id in sorted_ids(catalog) {
        let Some(tree) = catalog.get(id) else {
            continue;
        };

        if tree.lines.is_empty() {
            return Err(CatalogError::EmptyDialogue { id });
        }

        for line in &tree.lines {
            for choice in &line.choices {
                if !catalog.contains(choice.target) {
                    return Err(CatalogError::MissingChoiceTarget {
                        id,
                        target: choice.target,
                    });
                }
            }
        }

        if !tree.has_end_node() {
            return Err(CatalogError::UnterminatedDialogue { id });
        }
    }

    Ok(())
}

/// 按 ID 升序遍历，保证诊断顺序稳定
fn sorted_ids(catalog: &Catalog) -> Vec<DialogueId> {
    let mut ids: Vec<DialogueId> = catalog.ids().collect();
    ids.sort_unstable();
    ids
}
