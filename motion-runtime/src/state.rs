//! # State 模块
//!
//! 定义导航状态快照和过渡令牌。
//!
//! ## 设计原则
//!
//! - `NavigationState` 是**不可变快照**：每次过渡都产生新实例
//! - 所有状态必须**可序列化**
//! - 过渡令牌只比较是否变化，不解读其内容

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ContractViolation, InvariantViolation};
use crate::screen::{ContentHandle, Screen, ScreenId, ScreenRegistry};

/// 过渡令牌
///
/// 令牌**不变**表示"即时更新，只增删内容"；令牌**变化**表示需要执行共享布局动画。
/// 动画引擎自行比较前后令牌，协调器从不直接调用引擎。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionToken(u64);

impl TransitionToken {
    /// 初始令牌
    pub fn initial() -> Self {
        Self(0)
    }

    /// 生成下一个令牌（保证与当前不同）
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// 获取原始值
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransitionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 导航状态快照
///
/// # 不变量
///
/// 1. `current` 对应且仅对应一个未移除的屏幕
/// 2. 同一时刻至多一个屏幕处于移除状态
/// 3. 同时可见的屏幕（当前 + 上一个）视觉层级互不相同
/// 4. 令牌变化当且仅当本次过渡需要共享布局动画
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    screens: ScreenRegistry,
    current: u32,
    previous: Option<u32>,
    token: TransitionToken,
}

impl NavigationState {
    /// 以初始屏幕创建导航状态
    pub fn new(
        initial: impl Into<ScreenId>,
        content: ContentHandle,
    ) -> Result<Self, ContractViolation> {
        let id = initial.into();
        if content.is_empty() {
            return Err(ContractViolation::EmptyContent { id });
        }

        let screens = ScreenRegistry::new().with_added(id, content);
        Ok(Self {
            screens,
            current: 0,
            previous: None,
            token: TransitionToken::initial(),
        })
    }

    /// 由各部分组装新快照（仅供协调器使用）
    pub(crate) fn from_parts(
        screens: ScreenRegistry,
        current: u32,
        previous: Option<u32>,
        token: TransitionToken,
    ) -> Self {
        Self {
            screens,
            current,
            previous,
            token,
        }
    }

    /// 屏幕注册表
    pub fn screens(&self) -> &ScreenRegistry {
        &self.screens
    }

    /// 当前屏幕的逻辑索引
    pub fn current(&self) -> u32 {
        self.current
    }

    /// 上一个屏幕的逻辑索引（`None` 表示没有上一个屏幕）
    pub fn previous(&self) -> Option<u32> {
        self.previous
    }

    /// 过渡令牌
    pub fn token(&self) -> TransitionToken {
        self.token
    }

    /// 当前屏幕
    pub fn current_screen(&self) -> Option<&Screen> {
        self.screens.by_logical_index(self.current)
    }

    /// 上一个屏幕
    pub fn previous_screen(&self) -> Option<&Screen> {
        self.previous
            .and_then(|index| self.screens.by_logical_index(index))
    }

    /// 屏幕是否为当前屏幕
    pub fn is_current(&self, screen: &Screen) -> bool {
        screen.logical_index == self.current
    }

    /// 屏幕是否为上一个屏幕
    pub fn is_previous(&self, screen: &Screen) -> bool {
        self.previous == Some(screen.logical_index)
    }

    /// 校验状态不变量 1–3，以及槽位分配的一致性
    ///
    /// 逻辑索引必须互不相同，且都小于注册表的下一个槽位；
    /// 否则后续分配的槽位会与已有屏幕冲突。
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.check_slots()?;

        let current = self
            .current_screen()
            .ok_or(InvariantViolation::CurrentMissing {
                index: self.current,
            })?;
        if current.removed {
            return Err(InvariantViolation::CurrentRemoved {
                id: current.id.clone(),
            });
        }

        let removed = self.screens.removed_ids().len();
        if removed > 1 {
            return Err(InvariantViolation::MultipleRemoved { count: removed });
        }

        if let Some(previous) = self.previous_screen()
            && previous.visual_order == current.visual_order
        {
            return Err(InvariantViolation::DuplicateVisualOrder {
                first: current.id.clone(),
                second: previous.id.clone(),
                order: current.visual_order,
            });
        }

        Ok(())
    }

    fn check_slots(&self) -> Result<(), InvariantViolation> {
        let mut by_index: BTreeMap<u32, &ScreenId> = BTreeMap::new();
        for screen in self.screens.iter() {
            if let Some(first) = by_index.insert(screen.logical_index, &screen.id) {
                return Err(InvariantViolation::DuplicateLogicalIndex {
                    first: first.clone(),
                    second: screen.id.clone(),
                    index: screen.logical_index,
                });
            }
        }

        let assigned = self
            .screens
            .iter()
            .map(|screen| screen.logical_index.max(screen.visual_order))
            .max();
        if let Some(assigned) = assigned
            && self.screens.next_slot() <= assigned
        {
            return Err(InvariantViolation::StaleSlot {
                next_slot: self.screens.next_slot(),
                assigned,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_next_changes() {
        let token = TransitionToken::initial();
        assert_ne!(token.next(), token);
        assert_eq!(token.next().value(), 1);
        assert_eq!(token.next().to_string(), "#1");
    }

    #[test]
    fn test_initial_state() {
        let state = NavigationState::new("a", ContentHandle::new("a")).unwrap();
        assert_eq!(state.current(), 0);
        assert_eq!(state.previous(), None);
        assert_eq!(state.current_screen().unwrap().id, "a");
        assert!(state.previous_screen().is_none());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_initial_state_requires_content() {
        let err = NavigationState::new("a", ContentHandle::new("")).unwrap_err();
        assert_eq!(
            err,
            ContractViolation::EmptyContent {
                id: "a".to_string()
            }
        );
    }

    #[test]
    fn test_invariant_current_removed() {
        let state = NavigationState::new("a", ContentHandle::new("a")).unwrap();
        let broken = NavigationState::from_parts(
            state.screens().with_marked_removed("a"),
            0,
            None,
            state.token(),
        );
        assert!(matches!(
            broken.check_invariants(),
            Err(InvariantViolation::CurrentRemoved { .. })
        ));
    }

    #[test]
    fn test_invariant_current_missing() {
        let state = NavigationState::new("a", ContentHandle::new("a")).unwrap();
        let broken =
            NavigationState::from_parts(state.screens().clone(), 7, None, state.token());
        assert_eq!(
            broken.check_invariants(),
            Err(InvariantViolation::CurrentMissing { index: 7 })
        );
    }

    /// 从 JSON 构造一个快照：a 占用槽位 0
    fn snapshot_json(next_slot: u32, b_index: Option<u32>) -> String {
        let b = b_index
            .map(|i| {
                format!(
                    r#","b":{{"id":"b","content":"b","logical_index":{i},"visual_order":{i},"removed":false,"can_provide_layout_anchor":true}}"#
                )
            })
            .unwrap_or_default();
        format!(
            r#"{{"screens":{{"screens":{{"a":{{"id":"a","content":"a","logical_index":0,"visual_order":0,"removed":false,"can_provide_layout_anchor":true}}{b}}},"next_slot":{next_slot}}},"current":0,"previous":null,"token":0}}"#
        )
    }

    #[test]
    fn test_invariant_stale_next_slot() {
        let state: NavigationState = serde_json::from_str(&snapshot_json(0, None)).unwrap();
        assert_eq!(
            state.check_invariants(),
            Err(InvariantViolation::StaleSlot {
                next_slot: 0,
                assigned: 0
            })
        );

        let state: NavigationState = serde_json::from_str(&snapshot_json(1, None)).unwrap();
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_invariant_duplicate_logical_index() {
        let state: NavigationState = serde_json::from_str(&snapshot_json(1, Some(0))).unwrap();
        assert_eq!(
            state.check_invariants(),
            Err(InvariantViolation::DuplicateLogicalIndex {
                first: "a".to_string(),
                second: "b".to_string(),
                index: 0
            })
        );
    }

    #[test]
    fn test_state_serialization() {
        let state = NavigationState::new("a", ContentHandle::new("a")).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: NavigationState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
