//! # Input 模块
//!
//! 定义宿主向协调器传递的输入。
//!
//! ## 设计说明
//!
//! - 协调器不直接处理指针/键盘事件，只处理语义化的导航意图
//! - 触发器（如一次点击）到导航意图的映射由 [`crate::flow::NavigationFlow`] 负责
//! - 向前/返回的分类由调用方显式给出，协调器不从历史推断

use serde::{Deserialize, Serialize};

use crate::screen::{ContentHandle, ScreenId};

/// 触发器标识符
///
/// 例如 `"advance"`。除标识外不携带任何参数。
pub type TriggerId = String;

/// 返回型导航的目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnTarget {
    /// 上一个屏幕
    Previous,
    /// 指定屏幕
    Screen(ScreenId),
}

/// 导航意图
///
/// # 分类
///
/// - `Advance`：向前导航，新内容直接出现，不触发共享布局动画
/// - `Return`：返回到已注册的屏幕，触发共享布局动画（magic motion）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavigationIntent {
    /// 向前导航到目标屏幕
    Advance {
        /// 目标屏幕
        target: ScreenId,
        /// 目标屏幕尚未注册时必须提供的内容
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<ContentHandle>,
    },

    /// 返回到已注册的屏幕
    Return {
        /// 返回目标
        target: ReturnTarget,
    },
}

impl NavigationIntent {
    /// 创建向前导航意图
    pub fn advance(target: impl Into<ScreenId>) -> Self {
        Self::Advance {
            target: target.into(),
            content: None,
        }
    }

    /// 创建携带内容的向前导航意图
    pub fn advance_with(target: impl Into<ScreenId>, content: ContentHandle) -> Self {
        Self::Advance {
            target: target.into(),
            content: Some(content),
        }
    }

    /// 创建返回上一个屏幕的意图
    pub fn return_to_previous() -> Self {
        Self::Return {
            target: ReturnTarget::Previous,
        }
    }

    /// 创建返回指定屏幕的意图
    pub fn return_to(target: impl Into<ScreenId>) -> Self {
        Self::Return {
            target: ReturnTarget::Screen(target.into()),
        }
    }

    /// 意图中显式指定的目标屏幕（`Return { Previous }` 返回 `None`）
    pub fn target_id(&self) -> Option<&ScreenId> {
        match self {
            Self::Advance { target, .. } => Some(target),
            Self::Return {
                target: ReturnTarget::Screen(id),
            } => Some(id),
            Self::Return {
                target: ReturnTarget::Previous,
            } => None,
        }
    }

    /// 补充内容句柄（仅对 `Advance` 且尚未携带内容时生效）
    pub fn with_content(self, handle: ContentHandle) -> Self {
        match self {
            Self::Advance {
                target,
                content: None,
            } => Self::Advance {
                target,
                content: Some(handle),
            },
            other => other,
        }
    }
}

/// 宿主向协调器传递的输入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationInput {
    /// 导航请求
    Navigate { intent: NavigationIntent },

    /// 外部卸载确认：屏幕的退出动画已完成，可以彻底删除
    UnmountAck { screen_id: ScreenId },

    /// 更新屏幕的锚点资格
    AnchorEligibility { screen_id: ScreenId, eligible: bool },
}

impl NavigationInput {
    /// 创建导航输入
    pub fn navigate(intent: NavigationIntent) -> Self {
        Self::Navigate { intent }
    }

    /// 创建卸载确认输入
    pub fn unmount_ack(screen_id: impl Into<ScreenId>) -> Self {
        Self::UnmountAck {
            screen_id: screen_id.into(),
        }
    }

    /// 创建锚点资格输入
    pub fn anchor_eligibility(screen_id: impl Into<ScreenId>, eligible: bool) -> Self {
        Self::AnchorEligibility {
            screen_id: screen_id.into(),
            eligible,
        }
    }
}
