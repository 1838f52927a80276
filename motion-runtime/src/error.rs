//! # Error 模块
//!
//! 定义 motion-runtime 中使用的错误类型。
//!
//! ## 错误分级
//!
//! - [`NavigationError`]：无效的导航请求。由协调器在本地恢复为空操作，状态保持不变。
//! - [`ContractViolation`]：调用方违反契约（例如注册屏幕时未提供内容），视为致命错误。
//! - [`InvariantViolation`]：导航状态不变量被破坏，仅用于校验与测试。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::TriggerId;
use crate::screen::ScreenId;

/// 导航请求被拒绝的原因
///
/// 协调器遇到这些情况时返回原状态，不会把错误抛给渲染逻辑。
/// 原因随 [`crate::TransitionOutcome::Rejected`] 一起输出，宿主可以按类型匹配。
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavigationError {
    /// 请求返回上一个屏幕，但当前没有上一个屏幕
    #[error("没有可返回的上一个屏幕")]
    NoPreviousScreen,

    /// 目标屏幕未注册
    #[error("屏幕 '{id}' 未注册")]
    UnknownScreen { id: ScreenId },

    /// 目标屏幕已经是当前屏幕
    #[error("屏幕 '{id}' 已是当前屏幕")]
    AlreadyCurrent { id: ScreenId },

    /// 卸载确认指向一个未处于移除状态的屏幕
    #[error("屏幕 '{id}' 未处于移除状态，忽略卸载确认")]
    NotRemoved { id: ScreenId },

    /// 流程表中没有当前屏幕上该触发器的规则
    #[error("屏幕 '{screen}' 没有触发器 '{trigger}' 的规则")]
    NoRule { screen: ScreenId, trigger: TriggerId },

    /// 槽位计数器已用尽，无法再分配逻辑索引
    #[error("槽位已用尽，无法继续导航")]
    SlotsExhausted,
}

/// 调用方契约违规
///
/// 与 [`NavigationError`] 不同，这类错误不会被静默吞掉：
/// 渲染一个没有内容的屏幕比立即暴露问题更糟。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// 注册新屏幕时缺少内容句柄
    #[error("注册屏幕 '{id}' 时缺少内容")]
    MissingContent { id: ScreenId },

    /// 内容句柄为空
    #[error("屏幕 '{id}' 的内容句柄为空")]
    EmptyContent { id: ScreenId },
}

/// 导航状态不变量违规
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// `current` 没有对应的屏幕
    #[error("当前索引 {index} 没有对应的屏幕")]
    CurrentMissing { index: u32 },

    /// `current` 对应的屏幕处于移除状态
    #[error("当前屏幕 '{id}' 处于移除状态")]
    CurrentRemoved { id: ScreenId },

    /// 多个屏幕同时处于移除状态
    #[error("同时有 {count} 个屏幕处于移除状态")]
    MultipleRemoved { count: usize },

    /// 两个同时可见的屏幕共用同一个层级
    #[error("可见屏幕 '{first}' 与 '{second}' 共用层级 {order}")]
    DuplicateVisualOrder {
        first: ScreenId,
        second: ScreenId,
        order: u32,
    },

    /// 两个屏幕共用同一个逻辑索引
    #[error("屏幕 '{first}' 与 '{second}' 共用逻辑索引 {index}")]
    DuplicateLogicalIndex {
        first: ScreenId,
        second: ScreenId,
        index: u32,
    },

    /// 下一个槽位不大于已分配的槽位，继续分配会与现有屏幕冲突
    #[error("下一个槽位 {next_slot} 不大于已分配的槽位 {assigned}")]
    StaleSlot { next_slot: u32, assigned: u32 },
}

/// motion-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MotionError {
    /// 导航请求被拒绝
    #[error("导航被拒绝: {0}")]
    Navigation(#[from] NavigationError),

    /// 契约违规
    #[error("契约违规: {0}")]
    Contract(#[from] ContractViolation),
}

/// Result 类型别名
pub type MotionResult<T> = Result<T, MotionError>;
