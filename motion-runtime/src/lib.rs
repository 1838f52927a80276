//! # Motion Runtime
//!
//! 共享布局过渡协调器的核心库。
//!
//! ## 架构概述
//!
//! `motion-runtime` 是纯逻辑核心，不依赖任何 IO、渲染或动画引擎。
//! 它决定每一步导航时：哪些屏幕已挂载、它们的可见性与层级、哪些图层可以参与共享布局动画，
//! 以及这一步是即时更新还是需要执行共享布局动画。
//!
//! ```text
//! Host                                   Runtime
//!   │                                       │
//!   │──── NavigationInput ─────────────────►│ handle()
//!   │                                       │
//!   │◄─── TransitionOutcome ────────────────│
//!   │                                       │
//!   │──── navigator::render(state) ────────►│
//!   │◄─── RenderFrame (token + ScreenFrame) │
//! ```
//!
//! ## 核心类型
//!
//! - [`TransitionCoordinator`]：持有导航快照的状态机
//! - [`NavigationState`]：不可变导航快照
//! - [`ScreenRegistry`]：已挂载屏幕的值类型注册表
//! - [`ElementContext`]：传给屏幕内图层的上下文
//! - [`RenderFrame`]：交给渲染层和动画引擎的输出
//!
//! ## 使用示例
//!
//! ```ignore
//! use motion_runtime::{ContentHandle, NavigationFlow, TransitionCoordinator, navigator};
//!
//! let flow = NavigationFlow::demo();
//! let mut coordinator = TransitionCoordinator::new("a", ContentHandle::new("a"))?;
//!
//! // 每次点击
//! let current = coordinator.state().current_screen().map(|s| s.id.clone());
//! if let Some(intent) = current.and_then(|id| flow.resolve(&id, "advance").cloned()) {
//!     coordinator.navigate(intent.with_content(content_for_target))?;
//! }
//!
//! let frame = navigator::render(coordinator.state());
//! renderer.present(&frame);
//! ```
//!
//! ## 模块结构
//!
//! - [`screen`]：屏幕与注册表
//! - [`state`]：导航快照与过渡令牌
//! - [`input`]：导航意图与输入
//! - [`coordinator`]：过渡策略与协调器
//! - [`context`]：元素上下文
//! - [`navigator`]：渲染指令推导
//! - [`layer`]：图层契约
//! - [`flow`]：导航流程表
//! - [`diagnostic`]：流程表静态检查
//! - [`error`]：错误类型定义

pub mod context;
pub mod coordinator;
pub mod diagnostic;
pub mod error;
pub mod flow;
pub mod input;
pub mod layer;
pub mod navigator;
pub mod screen;
pub mod state;

// 重导出核心类型
pub use context::{ElementContext, Presence};
pub use coordinator::{Transition, TransitionCoordinator, TransitionKind, TransitionOutcome};
pub use diagnostic::{Diagnostic, DiagnosticLevel, DiagnosticResult, analyze_flow};
pub use error::{ContractViolation, InvariantViolation, MotionError, MotionResult, NavigationError};
pub use flow::{ADVANCE_TRIGGER, FlowRule, NavigationFlow};
pub use input::{NavigationInput, NavigationIntent, ReturnTarget, TriggerId};
pub use layer::{LayerNode, LayerProps};
pub use navigator::{RenderFrame, ScreenFrame};
pub use screen::{ContentHandle, Screen, ScreenId, ScreenRegistry};
pub use state::{NavigationState, TransitionToken};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let _intent = NavigationIntent::advance("b");
        let _input = NavigationInput::unmount_ack("b");
        let _ctx = ElementContext::default();
        let _flow = NavigationFlow::demo();

        let coordinator = TransitionCoordinator::new("a", ContentHandle::new("a")).unwrap();
        let frame = navigator::render(coordinator.state());
        assert_eq!(frame.screens.len(), 1);
    }
}
