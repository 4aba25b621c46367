//! # Effects 模块
//!
//! 选项效果表：选项 ID → 玩家属性增量。
//!
//! ## 设计说明
//!
//! - 效果是**数据**而非代码：表在加载期配置（可直接从 JSON
//!   反序列化），新增选项/效果不需要改引擎
//! - 未登记的 ID 结算为零增量，不报错
//! - 本模块只产出增量，不持有玩家属性；加法与钳制（如果需要）
//!   都由属性方负责

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::DialogueId;

/// 玩家属性增量
///
/// 道德 / 金币 / 生命三元组，按选项结算一次。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatDelta {
    /// 道德变化
    #[serde(default)]
    pub morality: i32,
    /// 金币变化
    #[serde(default)]
    pub coins: i32,
    /// 生命变化
    #[serde(default)]
    pub health: i32,
}

impl StatDelta {
    /// 零增量
    pub const ZERO: StatDelta = StatDelta {
        morality: 0,
        coins: 0,
        health: 0,
    };

    /// 创建增量
    pub fn new(morality: i32, coins: i32, health: i32) -> Self {
        Self {
            morality,
            coins,
            health,
        }
    }

    /// 是否零增量
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// 选项效果表
///
/// 加载期配置的策略表，替代按 ID 硬编码的分支。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectTable {
    /// 选项 ID → 增量
    entries: HashMap<DialogueId, StatDelta>,
}

impl EffectTable {
    /// 创建空表（所有选项结算为零增量）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从条目列表构建
    pub fn from_entries(entries: impl IntoIterator<Item = (DialogueId, StatDelta)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// 登记一个选项的效果
    pub fn insert(&mut self, id: DialogueId, delta: StatDelta) {
        self.entries.insert(id, delta);
    }

    /// 查询选项对应的增量
    ///
    /// 未登记的 ID 返回零增量。
    pub fn delta_for(&self, id: DialogueId) -> StatDelta {
        self.entries.get(&id).copied().unwrap_or(StatDelta::ZERO)
    }

    /// 已登记的条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
