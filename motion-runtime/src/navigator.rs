//! # Navigator 模块
//!
//! 遍历屏幕注册表，为每个屏幕计算元素上下文和可见性/层级/命中测试指令。
//!
//! ## 推导规则
//!
//! ```text
//! is_current       = logical_index == current
//! is_previous      = logical_index == previous
//! presence         = Suppressed  当 !is_current && removed
//! visible          = is_current || is_previous
//! z_order          = visual_order
//! hit_test_enabled = presence != Suppressed
//! ```

use serde::{Deserialize, Serialize};

use crate::context::{ElementContext, Presence};
use crate::screen::{ContentHandle, Screen, ScreenId};
use crate::state::{NavigationState, TransitionToken};

/// 单个屏幕的渲染指令
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenFrame {
    /// 屏幕标识符
    pub screen_id: ScreenId,
    /// 内容句柄（原样转交）
    pub content: ContentHandle,
    /// 是否可见
    pub visible: bool,
    /// 堆叠层级
    pub z_order: u32,
    /// 是否接收输入
    pub hit_test_enabled: bool,
    /// 传给屏幕内图层的上下文
    pub context: ElementContext,
}

/// 一帧渲染输出
///
/// 每次渲染都重新携带过渡令牌，由动画引擎自行检测变化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderFrame {
    /// 过渡令牌
    pub token: TransitionToken,
    /// 所有已挂载屏幕（按 ID 排序）
    pub screens: Vec<ScreenFrame>,
}

impl RenderFrame {
    /// 按 ID 查找屏幕
    pub fn screen(&self, id: &str) -> Option<&ScreenFrame> {
        self.screens.iter().find(|s| s.screen_id == id)
    }

    /// 可见屏幕（按层级从低到高）
    pub fn visible_screens(&self) -> Vec<&ScreenFrame> {
        let mut visible: Vec<_> = self.screens.iter().filter(|s| s.visible).collect();
        visible.sort_by_key(|s| s.z_order);
        visible
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// 计算屏幕的元素上下文
pub fn element_context(state: &NavigationState, screen: &Screen) -> ElementContext {
    let is_current = state.is_current(screen);
    let presence = if !is_current && screen.removed {
        Presence::Suppressed
    } else {
        Presence::Inherit
    };

    ElementContext {
        is_current,
        layout_order: screen.visual_order,
        is_valid_anchor: screen.can_provide_layout_anchor,
        presence,
    }
}

/// 计算单个屏幕的渲染指令
pub fn screen_frame(state: &NavigationState, screen: &Screen) -> ScreenFrame {
    let context = element_context(state, screen);
    ScreenFrame {
        screen_id: screen.id.clone(),
        content: screen.content.clone(),
        visible: context.is_current || state.is_previous(screen),
        z_order: context.layout_order,
        hit_test_enabled: !context.presence.is_suppressed(),
        context,
    }
}

/// 渲染整个快照
pub fn render(state: &NavigationState) -> RenderFrame {
    RenderFrame {
        token: state.token(),
        screens: state
            .screens()
            .iter()
            .map(|screen| screen_frame(state, screen))
            .collect(),
    }
}
