//! # Flow 模块
//!
//! 导航流程表：把"在某个屏幕上触发某个触发器"映射为导航意图。
//!
//! 流程表让向前/返回的分类成为调用方显式给出的数据，
//! 协调器不需要记住"上一次停在哪个屏幕"。

use serde::{Deserialize, Serialize};

use crate::input::{NavigationIntent, TriggerId};
use crate::screen::ScreenId;

/// 默认触发器
pub const ADVANCE_TRIGGER: &str = "advance";

/// 流程规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRule {
    /// 规则生效的当前屏幕
    pub from: ScreenId,
    /// 触发器
    #[serde(default = "default_trigger")]
    pub trigger: TriggerId,
    /// 产生的导航意图
    pub intent: NavigationIntent,
}

fn default_trigger() -> TriggerId {
    ADVANCE_TRIGGER.to_string()
}

impl FlowRule {
    /// 创建规则
    pub fn new(
        from: impl Into<ScreenId>,
        trigger: impl Into<TriggerId>,
        intent: NavigationIntent,
    ) -> Self {
        Self {
            from: from.into(),
            trigger: trigger.into(),
            intent,
        }
    }
}

/// 导航流程表
///
/// 规则按声明顺序匹配，首个匹配生效。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationFlow {
    rules: Vec<FlowRule>,
}

impl NavigationFlow {
    /// 创建空流程表
    pub fn new() -> Self {
        Self::default()
    }

    /// 两屏演示流程：a 前进到 b，b 以共享布局动画返回上一个屏幕
    pub fn demo() -> Self {
        Self::new()
            .with_rule(FlowRule::new(
                "a",
                ADVANCE_TRIGGER,
                NavigationIntent::advance("b"),
            ))
            .with_rule(FlowRule::new(
                "b",
                ADVANCE_TRIGGER,
                NavigationIntent::return_to_previous(),
            ))
    }

    /// 追加规则
    pub fn with_rule(mut self, rule: FlowRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// 查找当前屏幕上某个触发器对应的意图
    pub fn resolve(&self, current: &str, trigger: &str) -> Option<&NavigationIntent> {
        self.rules
            .iter()
            .find(|rule| rule.from == current && rule.trigger == trigger)
            .map(|rule| &rule.intent)
    }

    /// 所有规则
    pub fn rules(&self) -> &[FlowRule] {
        &self.rules
    }

    /// 规则数量
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
