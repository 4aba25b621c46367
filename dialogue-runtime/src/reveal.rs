//! # Reveal 模块
//!
//! 打字机效果：台词逐字显示的定时序列。
//!
//! ## 设计说明
//!
//! - 核心不触碰真实时间：[`Reveal`] 是一个确定性迭代器，
//!   每步产出"下一个字符 + 之后应等待的时长"，由 Host 负责真正
//!   等待（sleep / 定时器 / 帧循环均可）
//! - 句读之后停顿更久：标点字符的延迟是普通字符的若干倍
//! - 取消必须是确定性的：[`Reveal::skip`] 之后全文立即可见，
//!   迭代器结束
//! - 同一面板同时至多一个 Reveal 在播放：Host 以新 Reveal 替换旧
//!   Reveal 即完成取消重启，本模块不做全局管理

use std::time::Duration;

/// 触发额外停顿的标点
///
/// 半角与全角句读各取一组，兼容中英文台词。
pub const PAUSE_CHARS: [char; 8] = [',', '.', '?', '!', '，', '。', '？', '！'];

/// 打字机参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealConfig {
    /// 每个字符之后的基础延迟
    pub char_delay: Duration,
    /// 标点字符的延迟倍数
    pub pause_multiplier: u32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            char_delay: Duration::from_millis(50),
            pause_multiplier: 5,
        }
    }
}

/// 一步显示结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealStep {
    /// 本步新显示的字符
    pub ch: char,
    /// 显示之后应等待的时长
    pub delay: Duration,
}

/// 逐字显示序列
///
/// # 使用示例
///
/// ```ignore
/// let mut reveal = Reveal::new("你来了，旅行者。");
/// while let Some(step) = reveal.next() {
///     print!("{}", step.ch);
///     sleep(step.delay);
/// }
/// assert!(reveal.is_finished());
/// ```
///
/// 玩家跳过时调用 [`Reveal::skip`]，之后 [`Reveal::visible`]
/// 返回完整文本而非半截字符串。
#[derive(Debug, Clone)]
pub struct Reveal {
    /// 完整台词
    text: String,
    /// 已显示部分的字节长度（始终落在字符边界上）
    cursor: usize,
    /// 打字机参数
    config: RevealConfig,
}

impl Reveal {
    /// 以默认参数创建
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_config(text, RevealConfig::default())
    }

    /// 以指定参数创建
    pub fn with_config(text: impl Into<String>, config: RevealConfig) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            config,
        }
    }

    /// 当前已显示的前缀
    pub fn visible(&self) -> &str {
        &self.text[..self.cursor]
    }

    /// 完整台词
    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// 是否已全部显示
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.text.len()
    }

    /// 取消播放，直接显示全文
    ///
    /// 之后迭代器不再产出任何步骤。
    pub fn skip(&mut self) {
        self.cursor = self.text.len();
    }
}

impl Iterator for Reveal {
    type Item = RevealStep;

    fn next(&mut self) -> Option<RevealStep> {
        let ch = self.text[self.cursor..].chars().next()?;
        self.cursor += ch.len_utf8();

        let delay = if PAUSE_CHARS.contains(&ch) {
            self.config.char_delay * self.config.pause_multiplier
        } else {
            self.config.char_delay
        };

        Some(RevealStep { ch, delay })
    }
}
