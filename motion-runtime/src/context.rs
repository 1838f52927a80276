//! # Context 模块
//!
//! 每个屏幕向其内部所有图层传递的元素上下文。
//!
//! 上下文通过参数显式逐层传递，不存在隐式的环境通道。

use serde::{Deserialize, Serialize};

/// 图层的存在状态
///
/// 这里刻意不用 `bool`：
/// - `Inherit`：沿用动画引擎的默认处理（进入或保持）
/// - `Suppressed`：显式标记为"不存在"，动画引擎执行退出动画
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presence {
    /// 沿用默认行为
    #[default]
    Inherit,
    /// 正在退出
    Suppressed,
}

impl Presence {
    /// 是否处于退出状态
    pub fn is_suppressed(self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

/// 元素上下文
///
/// 由导航器为每个屏幕计算，屏幕内所有图层读取同一份上下文。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementContext {
    /// 所属屏幕是否为当前屏幕
    pub is_current: bool,
    /// 共享布局动画的排序提示（即屏幕的视觉层级）
    pub layout_order: u32,
    /// 图层能否作为共享布局动画的源/目标
    pub is_valid_anchor: bool,
    /// 图层的存在状态
    pub presence: Presence,
}

impl Default for ElementContext {
    /// 没有外层导航时的上下文：视为当前屏幕，正常参与动画
    fn default() -> Self {
        Self {
            is_current: true,
            layout_order: 0,
            is_valid_anchor: true,
            presence: Presence::Inherit,
        }
    }
}
