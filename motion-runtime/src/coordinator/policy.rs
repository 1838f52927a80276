//! # Policy 模块
//!
//! 过渡策略：给定当前快照和一个输入，计算下一个快照。
//!
//! ## 策略表（自上而下，首个匹配生效）
//!
//! | 条件 | 动作 | 令牌 |
//! |---|---|---|
//! | `Advance`，目标未注册 | `with_added`，当前 = 新槽位，上一个 = 旧当前 | 不变 |
//! | `Advance`，目标已注册且非当前 | `with_advanced`，更新索引 | 不变 |
//! | `Return`，目标已注册且非当前 | 离开的屏幕标记移除，`with_reentered`，更新索引 | 重新生成 |
//!
//! 所有函数都是纯函数：输入快照不会被修改。

use serde::{Deserialize, Serialize};

use crate::error::{ContractViolation, MotionError, MotionResult, NavigationError};
use crate::input::{NavigationInput, NavigationIntent, ReturnTarget};
use crate::screen::{ContentHandle, ScreenId};
use crate::state::NavigationState;

/// 过渡分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    /// 状态未变化
    Unchanged,
    /// 即时更新，不执行布局动画
    Instant,
    /// 执行共享布局动画
    Animated,
}

impl TransitionKind {
    /// 是否需要共享布局动画
    pub fn is_animated(self) -> bool {
        matches!(self, Self::Animated)
    }
}

/// 一次过渡的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// 注册了新屏幕并成为当前屏幕
    Added { screen_id: ScreenId },

    /// 已注册的屏幕被提升为当前屏幕
    Advanced { screen_id: ScreenId },

    /// 返回到已注册的屏幕，离开的屏幕开始退出
    Returned {
        screen_id: ScreenId,
        /// 离开的屏幕（已标记移除）
        departing: ScreenId,
        /// 被新的退出取代、直接删除的屏幕
        #[serde(default, skip_serializing_if = "Option::is_none")]
        superseded: Option<ScreenId>,
    },

    /// 屏幕已被彻底删除
    Purged { screen_id: ScreenId },

    /// 屏幕锚点资格已更新
    AnchorUpdated { screen_id: ScreenId, eligible: bool },

    /// 输入被拒绝，状态不变
    Rejected { reason: NavigationError },
}

impl TransitionOutcome {
    /// 过渡分类
    pub fn kind(&self) -> TransitionKind {
        match self {
            Self::Returned { .. } => TransitionKind::Animated,
            Self::Added { .. }
            | Self::Advanced { .. }
            | Self::Purged { .. }
            | Self::AnchorUpdated { .. } => TransitionKind::Instant,
            Self::Rejected { .. } => TransitionKind::Unchanged,
        }
    }

    /// 由拒绝原因创建结果
    pub fn rejected(reason: &NavigationError) -> Self {
        Self::Rejected {
            reason: reason.clone(),
        }
    }
}

/// 过渡：新快照及其分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// 下一个快照
    pub state: NavigationState,
    /// 过渡结果
    pub outcome: TransitionOutcome,
}

/// 对快照应用一个输入
pub fn apply(state: &NavigationState, input: &NavigationInput) -> MotionResult<Transition> {
    match input {
        NavigationInput::Navigate { intent } => navigate(state, intent),
        NavigationInput::UnmountAck { screen_id } => {
            acknowledge_unmount(state, screen_id).map_err(MotionError::from)
        }
        NavigationInput::AnchorEligibility {
            screen_id,
            eligible,
        } => update_anchor(state, screen_id, *eligible).map_err(MotionError::from),
    }
}

/// 对快照应用一个导航意图
pub fn navigate(state: &NavigationState, intent: &NavigationIntent) -> MotionResult<Transition> {
    match intent {
        NavigationIntent::Advance { target, content } => advance(state, target, content.as_ref()),
        NavigationIntent::Return { target } => return_to(state, target),
    }
}

fn advance(
    state: &NavigationState,
    target: &str,
    content: Option<&ContentHandle>,
) -> MotionResult<Transition> {
    let slot = free_slot(state)?;
    let previous = Some(state.current());

    if let Some(screen) = state.screens().get(target) {
        if state.is_current(screen) {
            return Err(NavigationError::AlreadyCurrent {
                id: target.to_string(),
            }
            .into());
        }

        let screens = state.screens().with_advanced(target);
        return Ok(Transition {
            state: NavigationState::from_parts(screens, slot, previous, state.token()),
            outcome: TransitionOutcome::Advanced {
                screen_id: target.to_string(),
            },
        });
    }

    let content = content.ok_or_else(|| ContractViolation::MissingContent {
        id: target.to_string(),
    })?;
    if content.is_empty() {
        return Err(ContractViolation::EmptyContent {
            id: target.to_string(),
        }
        .into());
    }

    // 新屏幕上还没有可匹配的元素，令牌保持不变
    let screens = state.screens().with_added(target, content.clone());
    Ok(Transition {
        state: NavigationState::from_parts(screens, slot, previous, state.token()),
        outcome: TransitionOutcome::Added {
            screen_id: target.to_string(),
        },
    })
}

fn return_to(state: &NavigationState, target: &ReturnTarget) -> MotionResult<Transition> {
    let target_screen = match target {
        ReturnTarget::Previous => state
            .previous_screen()
            .ok_or(NavigationError::NoPreviousScreen)?,
        ReturnTarget::Screen(id) => state
            .screens()
            .get(id)
            .ok_or_else(|| NavigationError::UnknownScreen { id: id.clone() })?,
    };
    if state.is_current(target_screen) {
        return Err(NavigationError::AlreadyCurrent {
            id: target_screen.id.clone(),
        }
        .into());
    }

    free_slot(state)?;
    let target_id = target_screen.id.clone();
    let departing = state.current_screen().map(|s| s.id.clone());

    // 至多保留一个待退出的屏幕：更早的退出直接结束
    let superseded = state
        .screens()
        .removed_ids()
        .into_iter()
        .find(|id| **id != target_id)
        .cloned();

    let mut screens = state.screens().clone();
    if let Some(id) = &superseded {
        screens = screens.with_removed_purged(id);
    }
    if let Some(id) = &departing {
        screens = screens.with_marked_removed(id);
    }
    let slot = screens.next_slot();
    let screens = screens.with_reentered(&target_id);

    Ok(Transition {
        state: NavigationState::from_parts(
            screens,
            slot,
            Some(state.current()),
            state.token().next(),
        ),
        outcome: TransitionOutcome::Returned {
            screen_id: target_id,
            departing: departing.unwrap_or_default(),
            superseded,
        },
    })
}

/// 下一个可分配的槽位；计数器用尽时拒绝导航
fn free_slot(state: &NavigationState) -> Result<u32, NavigationError> {
    if state.screens().has_free_slot() {
        Ok(state.screens().next_slot())
    } else {
        Err(NavigationError::SlotsExhausted)
    }
}

/// 处理外部卸载确认
///
/// 只删除处于移除状态的屏幕；未知 ID 或未移除的屏幕都会被拒绝（状态不变）。
pub fn acknowledge_unmount(
    state: &NavigationState,
    screen_id: &str,
) -> Result<Transition, NavigationError> {
    let screen = state
        .screens()
        .get(screen_id)
        .ok_or_else(|| NavigationError::UnknownScreen {
            id: screen_id.to_string(),
        })?;
    if !screen.removed {
        return Err(NavigationError::NotRemoved {
            id: screen_id.to_string(),
        });
    }

    Ok(Transition {
        state: NavigationState::from_parts(
            state.screens().with_removed_purged(screen_id),
            state.current(),
            state.previous(),
            state.token(),
        ),
        outcome: TransitionOutcome::Purged {
            screen_id: screen_id.to_string(),
        },
    })
}

/// 更新屏幕的锚点资格
pub fn update_anchor(
    state: &NavigationState,
    screen_id: &str,
    eligible: bool,
) -> Result<Transition, NavigationError> {
    if !state.screens().contains(screen_id) {
        return Err(NavigationError::UnknownScreen {
            id: screen_id.to_string(),
        });
    }

    Ok(Transition {
        state: NavigationState::from_parts(
            state.screens().with_anchor_eligibility(screen_id, eligible),
            state.current(),
            state.previous(),
            state.token(),
        ),
        outcome: TransitionOutcome::AnchorUpdated {
            screen_id: screen_id.to_string(),
            eligible,
        },
    })
}
