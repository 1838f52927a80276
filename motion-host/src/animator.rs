//! # Animator 模块
//!
//! 动画引擎的无界面替身：检测过渡令牌变化，决定本帧是即时更新还是共享布局动画。
//!
//! ## 匹配规则
//!
//! - 令牌未变化：即时更新（首帧同样即时）
//! - 令牌变化：当前屏幕与其他可见屏幕上相同的 `layout_id` 互相匹配，执行形变动画
//! - `presence` 为 `Suppressed` 的图层执行退出动画

use std::collections::HashSet;

use motion_runtime::{LayerProps, ScreenId, TransitionToken};
use serde::Serialize;
use tracing::debug;

/// 单个可见屏幕解析后的图层
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenLayers {
    /// 屏幕标识符
    pub screen_id: ScreenId,
    /// 堆叠层级
    pub z_order: u32,
    /// 先序排列的图层属性
    pub layers: Vec<LayerProps>,
}

impl ScreenLayers {
    /// 是否属于当前屏幕
    pub fn is_current(&self) -> bool {
        self.layers.first().is_some_and(|layer| layer.is_current)
    }

    fn layout_ids(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().filter_map(|layer| layer.layout_id.as_deref())
    }
}

/// 一帧的动画决策
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "pass", rename_all = "snake_case")]
pub enum AnimationPass {
    /// 即时更新
    Instant,
    /// 共享布局动画
    SharedLayout {
        /// 触发动画的令牌
        token: TransitionToken,
        /// 两端都存在、执行形变的 layout_id（按当前屏幕的先序）
        matched: Vec<String>,
        /// 执行退出动画的图层
        exiting: Vec<String>,
    },
}

impl AnimationPass {
    /// 是否执行动画
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::SharedLayout { .. })
    }
}

/// 动画引擎接口
pub trait Animator {
    /// 呈现一帧，返回本帧的动画决策
    fn present(&mut self, token: TransitionToken, screens: &[ScreenLayers]) -> AnimationPass;
}

/// 共享布局动画引擎
#[derive(Debug, Default)]
pub struct SharedLayoutAnimator {
    last_token: Option<TransitionToken>,
    animations: usize,
}

impl SharedLayoutAnimator {
    /// 创建动画引擎
    pub fn new() -> Self {
        Self::default()
    }

    /// 已执行的共享布局动画次数
    pub fn animations(&self) -> usize {
        self.animations
    }
}

impl Animator for SharedLayoutAnimator {
    fn present(&mut self, token: TransitionToken, screens: &[ScreenLayers]) -> AnimationPass {
        let changed = self.last_token.is_some_and(|last| last != token);
        self.last_token = Some(token);
        if !changed {
            return AnimationPass::Instant;
        }

        let others: HashSet<&str> = screens
            .iter()
            .filter(|screen| !screen.is_current())
            .flat_map(ScreenLayers::layout_ids)
            .collect();

        let mut seen = HashSet::new();
        let matched: Vec<String> = screens
            .iter()
            .filter(|screen| screen.is_current())
            .flat_map(ScreenLayers::layout_ids)
            .filter(|id| others.contains(id) && seen.insert(*id))
            .map(str::to_string)
            .collect();

        let exiting: Vec<String> = screens
            .iter()
            .flat_map(|screen| &screen.layers)
            .filter(|layer| layer.presence.is_suppressed())
            .map(|layer| layer.layer_id.clone())
            .collect();

        self.animations += 1;
        debug!(token = %token, matched = ?matched, exiting = ?exiting, "共享布局动画");

        AnimationPass::SharedLayout {
            token,
            matched,
            exiting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motion_runtime::{ElementContext, LayerNode, Presence};

    fn layers(screen: &str, ctx: ElementContext) -> ScreenLayers {
        let tree = LayerNode::new(format!("{screen}-container"))
            .with_layout_id("container")
            .with_child(LayerNode::new(format!("{screen}-card")).with_layout_id("card"))
            .with_child(LayerNode::new(format!("{screen}-label")));
        ScreenLayers {
            screen_id: screen.to_string(),
            z_order: ctx.layout_order,
            layers: tree.resolve_tree(&ctx),
        }
    }

    fn returned_pair() -> Vec<ScreenLayers> {
        let departing = ElementContext {
            is_current: false,
            layout_order: 1,
            is_valid_anchor: true,
            presence: Presence::Suppressed,
        };
        let current = ElementContext {
            layout_order: 0,
            ..ElementContext::default()
        };
        vec![layers("a", current), layers("b", departing)]
    }

    #[test]
    fn test_first_frame_is_instant() {
        let mut animator = SharedLayoutAnimator::new();
        let pass = animator.present(TransitionToken::initial(), &returned_pair());
        assert_eq!(pass, AnimationPass::Instant);
        assert_eq!(animator.animations(), 0);
    }

    #[test]
    fn test_token_change_animates() {
        let mut animator = SharedLayoutAnimator::new();
        let token = TransitionToken::initial();
        animator.present(token, &returned_pair());

        let pass = animator.present(token.next(), &returned_pair());
        assert_eq!(
            pass,
            AnimationPass::SharedLayout {
                token: token.next(),
                matched: vec!["container".to_string(), "card".to_string()],
                exiting: vec![
                    "b-container".to_string(),
                    "b-card".to_string(),
                    "b-label".to_string()
                ],
            }
        );
        assert_eq!(animator.animations(), 1);

        // 同一令牌再次呈现不会重复动画
        assert!(!animator.present(token.next(), &returned_pair()).is_animated());
    }

    #[test]
    fn test_invalid_anchor_does_not_match() {
        let mut screens = returned_pair();
        screens[1] = layers(
            "b",
            ElementContext {
                is_current: false,
                layout_order: 1,
                is_valid_anchor: false,
                presence: Presence::Suppressed,
            },
        );

        let mut animator = SharedLayoutAnimator::new();
        animator.present(TransitionToken::initial(), &screens);
        match animator.present(TransitionToken::initial().next(), &screens) {
            AnimationPass::SharedLayout { matched, exiting, .. } => {
                assert!(matched.is_empty());
                assert_eq!(exiting.len(), 3);
            }
            AnimationPass::Instant => panic!("令牌变化应触发动画"),
        }
    }
}
