//! # App 模块
//!
//! 无界面演示宿主：把触发器按流程表翻译为导航意图，驱动协调器，
//! 再把每个快照解析成带图层的帧交给动画引擎和输出表面。
//!
//! ## 一步的执行顺序
//!
//! ```text
//! tick(trigger)
//!   ├─ 确认上一帧中退出屏幕的卸载（auto_unmount）
//!   ├─ dispatch(trigger) -> TransitionOutcome
//!   └─ render(outcome)   -> HostFrame
//! ```

use motion_runtime::{
    ContractViolation, NavigationError, NavigationFlow, NavigationInput, RenderFrame, ScreenId,
    TransitionCoordinator, TransitionOutcome, TriggerId, navigator,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::animator::{AnimationPass, Animator, ScreenLayers, SharedLayoutAnimator};
use crate::catalog::ContentCatalog;
use crate::config::{AppConfig, SessionConfig};
use crate::error::{HostError, HostResult};
use crate::surface::RenderSurface;

/// 宿主输出的一帧
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostFrame {
    /// 步序号（初始帧为 0）
    pub step: usize,
    /// 本步使用的触发器
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<TriggerId>,
    /// 本步的过渡结果
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TransitionOutcome>,
    /// 本步之前确认卸载的屏幕
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmounted: Vec<ScreenId>,
    /// 协调器的渲染指令
    pub frame: RenderFrame,
    /// 可见屏幕解析后的图层（按层级从低到高）
    pub layers: Vec<ScreenLayers>,
    /// 动画决策
    pub animation: AnimationPass,
}

/// 演示宿主
pub struct HostApp {
    coordinator: TransitionCoordinator,
    flow: NavigationFlow,
    catalog: ContentCatalog,
    animator: SharedLayoutAnimator,
    session: SessionConfig,
    check_invariants: bool,
    step: usize,
    pending_unmounts: Vec<ScreenId>,
}

impl HostApp {
    /// 按配置创建宿主
    pub fn new(config: &AppConfig) -> HostResult<Self> {
        let catalog = ContentCatalog::from_config(config);
        let initial = config.initial_screen.clone();
        let content = catalog.content_for(&initial).cloned().ok_or_else(|| {
            error!(initial = %initial, "初始屏幕不在屏幕目录中");
            HostError::Contract(ContractViolation::MissingContent {
                id: initial.clone(),
            })
        })?;

        let mut coordinator = TransitionCoordinator::new(initial.clone(), content)?;
        if !catalog.layout_anchor(&initial) {
            coordinator.handle(NavigationInput::anchor_eligibility(initial.clone(), false))?;
        }

        info!(
            initial = %initial,
            screens = catalog.len(),
            rules = config.flow.len(),
            "宿主初始化完成"
        );

        Ok(Self {
            coordinator,
            flow: config.flow.clone(),
            catalog,
            animator: SharedLayoutAnimator::new(),
            session: config.session.clone(),
            check_invariants: config.debug.check_invariants,
            step: 0,
            pending_unmounts: Vec::new(),
        })
    }

    /// 协调器
    pub fn coordinator(&self) -> &TransitionCoordinator {
        &self.coordinator
    }

    /// 已执行的步数
    pub fn step(&self) -> usize {
        self.step
    }

    /// 等待确认卸载的屏幕
    pub fn pending_unmounts(&self) -> &[ScreenId] {
        &self.pending_unmounts
    }

    /// 在当前屏幕上触发一个触发器
    ///
    /// 没有匹配规则时返回 [`TransitionOutcome::Rejected`]，状态不变。
    pub fn dispatch(&mut self, trigger: &str) -> HostResult<TransitionOutcome> {
        let current = self
            .coordinator
            .state()
            .current_screen()
            .map(|screen| screen.id.clone())
            .unwrap_or_default();

        let Some(mut intent) = self.flow.resolve(&current, trigger).cloned() else {
            warn!(screen = %current, trigger, "没有匹配的流程规则");
            return Ok(TransitionOutcome::rejected(&NavigationError::NoRule {
                screen: current,
                trigger: trigger.to_string(),
            }));
        };

        let content = intent
            .target_id()
            .and_then(|target| self.catalog.content_for(target))
            .cloned();
        if let Some(content) = content {
            intent = intent.with_content(content);
        }

        let outcome = self.coordinator.navigate(intent)?;

        if let TransitionOutcome::Added { screen_id } = &outcome
            && !self.catalog.layout_anchor(screen_id)
        {
            self.coordinator
                .handle(NavigationInput::anchor_eligibility(screen_id.clone(), false))?;
        }

        self.verify();
        Ok(outcome)
    }

    /// 确认屏幕已卸载
    pub fn acknowledge_unmount(&mut self, screen_id: &str) -> TransitionOutcome {
        let outcome = self.coordinator.acknowledge_unmount(screen_id);
        self.verify();
        outcome
    }

    /// 把当前快照解析为一帧
    pub fn render(&mut self, outcome: Option<TransitionOutcome>) -> HostResult<HostFrame> {
        let frame = navigator::render(self.coordinator.state());

        let mut layers = Vec::new();
        for screen in frame.visible_screens() {
            let tree = self.catalog.layers(&screen.content).ok_or_else(|| {
                HostError::UnknownContent {
                    handle: screen.content.clone(),
                }
            })?;
            layers.push(ScreenLayers {
                screen_id: screen.screen_id.clone(),
                z_order: screen.z_order,
                layers: tree.resolve_tree(&screen.context),
            });
        }

        let animation = self.animator.present(frame.token, &layers);

        if self.session.auto_unmount {
            for screen in frame
                .screens
                .iter()
                .filter(|screen| screen.context.presence.is_suppressed())
            {
                if !self.pending_unmounts.contains(&screen.screen_id) {
                    self.pending_unmounts.push(screen.screen_id.clone());
                }
            }
        }

        Ok(HostFrame {
            step: self.step,
            trigger: None,
            outcome,
            unmounted: Vec::new(),
            frame,
            layers,
            animation,
        })
    }

    /// 执行一步：确认待卸载屏幕、触发、渲染
    pub fn tick(&mut self, trigger: &str) -> HostResult<HostFrame> {
        let unmounted = self.flush_unmounts();

        self.step += 1;
        let outcome = self.dispatch(trigger)?;
        debug!(step = self.step, trigger, outcome = ?outcome, "执行一步");

        let mut frame = self.render(Some(outcome))?;
        frame.trigger = Some(trigger.to_string());
        frame.unmounted = unmounted;
        Ok(frame)
    }

    /// 运行整个会话：输出初始帧，再按配置的步数逐步输出
    ///
    /// 返回已执行的步数。
    pub fn run(&mut self, surface: &mut dyn RenderSurface) -> HostResult<usize> {
        let initial = self.render(None)?;
        surface.present(&initial)?;

        let trigger = self.session.trigger.clone();
        for _ in 0..self.session.steps {
            let frame = self.tick(&trigger)?;
            surface.present(&frame)?;
        }
        surface.flush()?;

        info!(
            steps = self.step,
            animations = self.animator.animations(),
            "会话结束"
        );
        Ok(self.step)
    }

    fn flush_unmounts(&mut self) -> Vec<ScreenId> {
        let pending = std::mem::take(&mut self.pending_unmounts);
        let mut unmounted = Vec::new();
        for screen_id in pending {
            if let TransitionOutcome::Purged { screen_id } = self.acknowledge_unmount(&screen_id) {
                unmounted.push(screen_id);
            }
        }
        unmounted
    }

    fn verify(&self) {
        if !self.check_invariants {
            return;
        }
        if let Err(violation) = self.coordinator.state().check_invariants() {
            error!(error = %violation, "导航不变量被破坏");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motion_runtime::{FlowRule, NavigationIntent, Presence, TransitionKind};

    fn demo_app() -> HostApp {
        HostApp::new(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_dispatch_follows_flow() {
        let mut app = demo_app();

        let outcome = app.dispatch("advance").unwrap();
        assert_eq!(
            outcome,
            TransitionOutcome::Added {
                screen_id: "b".to_string()
            }
        );

        let outcome = app.dispatch("advance").unwrap();
        assert_eq!(outcome.kind(), TransitionKind::Animated);
        assert_eq!(app.coordinator().state().current_screen().unwrap().id, "a");
    }

    #[test]
    fn test_unknown_trigger_is_rejected() {
        let mut app = demo_app();
        let before = app.coordinator().state().clone();

        let outcome = app.dispatch("jump").unwrap();
        assert_eq!(outcome.kind(), TransitionKind::Unchanged);
        assert_eq!(
            outcome,
            TransitionOutcome::Rejected {
                reason: NavigationError::NoRule {
                    screen: "a".to_string(),
                    trigger: "jump".to_string(),
                }
            }
        );
        assert_eq!(app.coordinator().state(), &before);
    }

    #[test]
    fn test_render_after_return() {
        let mut app = demo_app();
        app.render(None).unwrap();
        app.dispatch("advance").unwrap();
        app.render(None).unwrap();
        app.dispatch("advance").unwrap();

        let frame = app.render(None).unwrap();
        assert_eq!(frame.layers.len(), 2);
        // a 保留原来的层级，退出中的 b 仍在其上方
        assert_eq!(frame.layers[0].screen_id, "a");
        assert!(frame.layers[0].is_current());
        assert_eq!(frame.layers[1].screen_id, "b");
        assert!(
            frame.layers[1]
                .layers
                .iter()
                .all(|layer| layer.presence == Presence::Suppressed)
        );
        assert!(frame.animation.is_animated());
    }

    #[test]
    fn test_anchor_ineligible_screen() {
        let mut config = AppConfig::default();
        if let Some(screen) = config.screens.get_mut("b") {
            screen.layout_anchor = false;
        }
        let mut app = HostApp::new(&config).unwrap();

        app.dispatch("advance").unwrap();
        let b = app.coordinator().state().screens().get("b").unwrap();
        assert!(!b.can_provide_layout_anchor);

        let frame = app.render(None).unwrap();
        let b_layers = frame.layers.iter().find(|s| s.screen_id == "b").unwrap();
        assert!(b_layers.layers.iter().all(|layer| layer.layout_id.is_none()));
    }

    #[test]
    fn test_missing_content_is_contract_violation() {
        let mut config = AppConfig::default();
        config.flow = NavigationFlow::new().with_rule(FlowRule::new(
            "a",
            "advance",
            NavigationIntent::advance("ghost"),
        ));
        let mut app = HostApp::new(&config).unwrap();

        assert!(matches!(
            app.dispatch("advance"),
            Err(HostError::Contract(_))
        ));
    }

    #[test]
    fn test_initial_screen_without_content_is_contract_violation() {
        let mut config = AppConfig::default();
        config.initial_screen = "ghost".to_string();

        let err = HostApp::new(&config).err().unwrap();
        assert!(matches!(
            err,
            HostError::Contract(ContractViolation::MissingContent { ref id }) if id == "ghost"
        ));
    }

    #[test]
    fn test_auto_unmount_purges_departing_screen() {
        let mut config = AppConfig::default();
        config.session.auto_unmount = true;
        let mut app = HostApp::new(&config).unwrap();

        app.render(None).unwrap();
        app.tick("advance").unwrap();
        let returned = app.tick("advance").unwrap();
        assert!(returned.unmounted.is_empty());
        assert_eq!(app.pending_unmounts(), &["b".to_string()]);

        // 下一步之前确认卸载，b 被删除后重新添加
        let frame = app.tick("advance").unwrap();
        assert_eq!(frame.unmounted, vec!["b".to_string()]);
        assert_eq!(
            frame.outcome,
            Some(TransitionOutcome::Added {
                screen_id: "b".to_string()
            })
        );
        assert!(app.pending_unmounts().is_empty());
    }
}
