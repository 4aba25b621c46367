//! # History 模块
//!
//! 会话历史数据模型，用于支持历史回看功能。
//!
//! ## 设计原则
//!
//! - 记录对话中的关键事件（台词、选择、日志、结束）
//! - 所有数据可序列化，与存档系统对齐
//! - 不记录临时状态（如打字机播放进度）

use serde::{Deserialize, Serialize};

use crate::catalog::{DialogueId, Side};

/// 历史事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// 台词显示事件
    LineShown {
        /// 说话者名字
        name: String,
        /// 说话者所在的一侧
        side: Side,
        /// 台词文本
        text: String,
        /// 时间戳（Unix 秒）
        timestamp: u64,
    },

    /// 选择事件
    ChoiceMade {
        /// 选项按钮文本（目标不在当前台词的选项里时为 None）
        label: Option<String>,
        /// 跳转目标
        target: DialogueId,
        /// 时间戳
        timestamp: u64,
    },

    /// 日志写入事件
    LogAdded {
        /// 日志文本
        text: String,
        /// 时间戳
        timestamp: u64,
    },

    /// 对话结束事件
    Ended {
        /// 时间戳
        timestamp: u64,
    },
}

impl HistoryEvent {
    /// 获取事件时间戳
    pub fn timestamp(&self) -> u64 {
        match self {
            HistoryEvent::LineShown { timestamp, .. } => *timestamp,
            HistoryEvent::ChoiceMade { timestamp, .. } => *timestamp,
            HistoryEvent::LogAdded { timestamp, .. } => *timestamp,
            HistoryEvent::Ended { timestamp } => *timestamp,
        }
    }

    /// 创建台词显示事件
    pub fn line_shown(name: impl Into<String>, side: Side, text: impl Into<String>) -> Self {
        HistoryEvent::LineShown {
            name: name.into(),
            side,
            text: text.into(),
            timestamp: current_timestamp(),
        }
    }

    /// 创建选择事件
    pub fn choice_made(label: Option<String>, target: DialogueId) -> Self {
        HistoryEvent::ChoiceMade {
            label,
            target,
            timestamp: current_timestamp(),
        }
    }

    /// 创建日志写入事件
    pub fn log_added(text: impl Into<String>) -> Self {
        HistoryEvent::LogAdded {
            text: text.into(),
            timestamp: current_timestamp(),
        }
    }

    /// 创建对话结束事件
    pub fn ended() -> Self {
        HistoryEvent::Ended {
            timestamp: current_timestamp(),
        }
    }
}

/// 历史记录容器
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    /// 事件列表（按时间顺序）
    events: Vec<HistoryEvent>,
    /// 最大记录数（防止内存无限增长）
    max_events: usize,
}

impl History {
    /// 创建新的历史记录
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            max_events: 1000, // 默认最多记录 1000 条
        }
    }

    /// 设置最大记录数
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// 添加事件
    pub fn push(&mut self, event: HistoryEvent) {
        self.events.push(event);

        // 如果超过最大数量，移除最早的事件
        while self.events.len() > self.max_events {
            self.events.remove(0);
        }
    }

    /// 获取所有事件
    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    /// 获取台词事件数量
    pub fn line_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::LineShown { .. }))
            .count()
    }

    /// 获取最近的 N 条台词
    pub fn recent_lines(&self, count: usize) -> Vec<&HistoryEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::LineShown { .. }))
            .rev()
            .take(count)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    /// 清空历史
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// 获取事件总数
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// 获取当前时间戳（Unix 秒）
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
