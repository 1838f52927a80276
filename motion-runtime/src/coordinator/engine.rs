//! # Engine 模块
//!
//! 过渡协调器：持有当前导航快照，逐个处理输入。
//!
//! ## 执行模型
//!
//! ```text
//! handle(input) -> Result<TransitionOutcome, ContractViolation>
//! ```
//!
//! 1. 用 [`policy::apply`] 计算下一个快照
//! 2. 成功：替换当前快照（旧快照仍可被外部持有）
//! 3. 导航被拒绝：记录日志，状态保持不变
//! 4. 契约违规：记录日志并返回错误，由宿主决定终止

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::coordinator::policy::{self, Transition, TransitionOutcome};
use crate::error::{ContractViolation, InvariantViolation, MotionError, NavigationError};
use crate::input::{NavigationInput, NavigationIntent};
use crate::screen::{ContentHandle, ScreenId};
use crate::state::NavigationState;

/// 过渡协调器
///
/// 导航状态的唯一持有者。读者通过 [`TransitionCoordinator::snapshot`] 获得不可变快照，
/// 因此不需要加锁。导航请求必须由调用方串行提交。
///
/// # 使用示例
///
/// ```ignore
/// let mut coordinator = TransitionCoordinator::new("a", ContentHandle::new("a"))?;
///
/// coordinator.navigate(NavigationIntent::advance_with("b", ContentHandle::new("b")))?;
/// let frame = navigator::render(coordinator.state());
/// ```
#[derive(Debug, Clone)]
pub struct TransitionCoordinator {
    state: Arc<NavigationState>,
}

impl TransitionCoordinator {
    /// 以初始屏幕创建协调器
    pub fn new(
        initial: impl Into<ScreenId>,
        content: ContentHandle,
    ) -> Result<Self, ContractViolation> {
        Ok(Self {
            state: Arc::new(NavigationState::new(initial, content)?),
        })
    }

    /// 从已有快照恢复协调器
    ///
    /// 快照可能来自外部（例如反序列化），不满足不变量时拒绝恢复。
    pub fn restore(state: NavigationState) -> Result<Self, InvariantViolation> {
        if let Err(violation) = state.check_invariants() {
            error!(error = %violation, "拒绝恢复无效的导航快照");
            return Err(violation);
        }
        Ok(Self {
            state: Arc::new(state),
        })
    }

    /// 当前快照
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// 共享当前快照
    pub fn snapshot(&self) -> Arc<NavigationState> {
        Arc::clone(&self.state)
    }

    /// 处理一个输入
    ///
    /// # 返回
    ///
    /// - `Ok(outcome)`：过渡结果；被拒绝的请求返回 [`TransitionOutcome::Rejected`]，状态不变
    /// - `Err(violation)`：调用方违反契约，状态不变
    pub fn handle(&mut self, input: NavigationInput) -> Result<TransitionOutcome, ContractViolation> {
        match policy::apply(&self.state, &input) {
            Ok(transition) => Ok(self.commit(transition)),
            Err(MotionError::Navigation(reason)) => Ok(self.reject(&reason, &input)),
            Err(MotionError::Contract(violation)) => {
                error!(error = %violation, input = ?input, "导航契约违规");
                Err(violation)
            }
        }
    }

    /// 处理一个导航意图
    pub fn navigate(
        &mut self,
        intent: NavigationIntent,
    ) -> Result<TransitionOutcome, ContractViolation> {
        self.handle(NavigationInput::navigate(intent))
    }

    /// 处理外部卸载确认
    ///
    /// 可以在任意时刻到达；对已删除的屏幕重复确认是空操作。
    pub fn acknowledge_unmount(&mut self, screen_id: &str) -> TransitionOutcome {
        match policy::acknowledge_unmount(&self.state, screen_id) {
            Ok(transition) => self.commit(transition),
            Err(reason) => self.reject(&reason, &NavigationInput::unmount_ack(screen_id)),
        }
    }

    fn commit(&mut self, transition: Transition) -> TransitionOutcome {
        let Transition { state, outcome } = transition;
        debug_assert!(
            state.check_invariants().is_ok(),
            "导航不变量被破坏: {:?}",
            state.check_invariants()
        );

        debug!(
            outcome = ?outcome,
            kind = ?outcome.kind(),
            current = state.current(),
            previous = ?state.previous(),
            token = %state.token(),
            "导航过渡"
        );
        self.state = Arc::new(state);
        outcome
    }

    fn reject(&self, reason: &NavigationError, input: &NavigationInput) -> TransitionOutcome {
        match (reason, input) {
            // 重复的卸载确认属于正常情况
            (NavigationError::UnknownScreen { id }, NavigationInput::UnmountAck { .. }) => {
                debug!(screen = %id, "忽略重复的卸载确认");
            }
            _ => {
                warn!(reason = %reason, input = ?input, "导航请求被拒绝，状态保持不变");
            }
        }
        TransitionOutcome::rejected(reason)
    }
}
