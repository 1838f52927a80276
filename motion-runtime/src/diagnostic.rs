//! # 诊断模块
//!
//! 对导航流程表和屏幕图层树做静态检查，不依赖 IO。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Error（必须修复）、Warn（建议修复）、Info（信息提示）

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::flow::NavigationFlow;
use crate::layer::LayerNode;
use crate::screen::ScreenId;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 配置来源（文件路径等）
    pub source: String,
    /// 相关屏幕
    pub screen: Option<ScreenId>,
    /// 诊断消息
    pub message: String,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, source: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            source: source.to_string(),
            screen: None,
            message: message.into(),
        }
    }

    /// 创建错误诊断
    pub fn error(source: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, source, message)
    }

    /// 创建警告诊断
    pub fn warn(source: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, source, message)
    }

    /// 创建信息诊断
    pub fn info(source: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, source, message)
    }

    /// 设置相关屏幕
    pub fn with_screen(mut self, screen: impl Into<ScreenId>) -> Self {
        self.screen = Some(screen.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.source)?;
        if let Some(screen) = &self.screen {
            write!(f, " <{}>", screen)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.count(DiagnosticLevel::Error)
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.count(DiagnosticLevel::Warn)
    }

    fn count(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 按级别过滤
    pub fn filter_by_level(&self, min_level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level >= min_level)
            .collect()
    }
}

/// 分析流程表与屏幕目录
///
/// # 参数
///
/// - `source`: 配置来源，用于诊断输出
/// - `initial`: 初始屏幕
/// - `screens`: 屏幕 ID 到图层树的目录
/// - `flow`: 导航流程表
pub fn analyze_flow(
    source: &str,
    initial: &str,
    screens: &BTreeMap<ScreenId, LayerNode>,
    flow: &NavigationFlow,
) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();

    if !screens.contains_key(initial) {
        result.push(Diagnostic::error(
            source,
            format!("初始屏幕 '{}' 不在屏幕目录中", initial),
        ));
    }

    check_rules(source, screens, flow, &mut result);
    for (id, tree) in screens {
        check_layers(source, id, tree, &mut result);
    }
    check_layout_matches(source, screens, &mut result);

    result
}

fn check_rules(
    source: &str,
    screens: &BTreeMap<ScreenId, LayerNode>,
    flow: &NavigationFlow,
    result: &mut DiagnosticResult,
) {
    let mut seen = HashSet::new();
    let mut outgoing: HashSet<&str> = HashSet::new();

    for rule in flow.rules() {
        if !screens.contains_key(&rule.from) {
            result.push(Diagnostic::error(
                source,
                format!("规则的起始屏幕 '{}' 未定义", rule.from),
            ));
        }
        if let Some(target) = rule.intent.target_id()
            && !screens.contains_key(target)
        {
            result.push(
                Diagnostic::error(source, format!("规则的目标屏幕 '{}' 未定义", target))
                    .with_screen(rule.from.clone()),
            );
        }
        if rule.intent.target_id() == Some(&rule.from) {
            result.push(
                Diagnostic::warn(source, format!("触发器 '{}' 指向自身，总会被拒绝", rule.trigger))
                    .with_screen(rule.from.clone()),
            );
        }
        if !seen.insert((rule.from.as_str(), rule.trigger.as_str())) {
            result.push(
                Diagnostic::warn(
                    source,
                    format!("触发器 '{}' 存在重复规则，后续规则不会生效", rule.trigger),
                )
                .with_screen(rule.from.clone()),
            );
        }
        outgoing.insert(rule.from.as_str());
    }

    for id in screens.keys() {
        if !outgoing.contains(id.as_str()) {
            result.push(Diagnostic::warn(source, "屏幕没有任何出口规则").with_screen(id.clone()));
        }
    }
}

fn check_layers(source: &str, screen: &str, tree: &LayerNode, result: &mut DiagnosticResult) {
    let mut layer_ids = HashSet::new();
    for node in tree.walk() {
        if !layer_ids.insert(node.id.as_str()) {
            result.push(
                Diagnostic::error(source, format!("图层 ID '{}' 重复", node.id))
                    .with_screen(screen),
            );
        }
    }

    let mut layout_ids = HashSet::new();
    for layout_id in tree.layout_ids() {
        if !layout_ids.insert(layout_id) {
            result.push(
                Diagnostic::warn(source, format!("共享布局 ID '{}' 在同一屏幕内重复", layout_id))
                    .with_screen(screen),
            );
        }
    }
}

fn check_layout_matches(
    source: &str,
    screens: &BTreeMap<ScreenId, LayerNode>,
    result: &mut DiagnosticResult,
) {
    // layout_id -> 声明它的屏幕集合
    let mut owners: HashMap<&str, HashSet<&str>> = HashMap::new();
    for (id, tree) in screens {
        for layout_id in tree.layout_ids() {
            owners.entry(layout_id).or_default().insert(id.as_str());
        }
    }

    for (id, tree) in screens {
        let mut reported = HashSet::new();
        for layout_id in tree.layout_ids() {
            let shared = owners.get(layout_id).is_some_and(|set| set.len() > 1);
            if !shared && reported.insert(layout_id) {
                result.push(
                    Diagnostic::info(
                        source,
                        format!("共享布局 ID '{}' 没有出现在其他屏幕上，不会产生形变动画", layout_id),
                    )
                    .with_screen(id.clone()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{ADVANCE_TRIGGER, FlowRule};
    use crate::input::NavigationIntent;

    fn screen(prefix: &str) -> LayerNode {
        LayerNode::new(format!("{prefix}1"))
            .with_layout_id("container")
            .with_child(LayerNode::new(format!("{prefix}2")).with_layout_id("card"))
    }

    fn demo_screens() -> BTreeMap<ScreenId, LayerNode> {
        let mut screens = BTreeMap::new();
        screens.insert("a".to_string(), screen("a"));
        screens.insert("b".to_string(), screen("b"));
        screens
    }

    #[test]
    fn test_demo_is_clean() {
        let result = analyze_flow("demo", "a", &demo_screens(), &NavigationFlow::demo());
        assert!(result.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn test_unknown_screens() {
        let flow = NavigationFlow::demo().with_rule(FlowRule::new(
            "x",
            ADVANCE_TRIGGER,
            NavigationIntent::return_to("y"),
        ));
        let result = analyze_flow("cfg", "z", &demo_screens(), &flow);

        // 初始屏幕 z、起始屏幕 x、目标屏幕 y
        assert_eq!(result.error_count(), 3);
        assert!(result.has_errors());
    }

    #[test]
    fn test_duplicate_rules_and_dead_end() {
        let flow = NavigationFlow::new()
            .with_rule(FlowRule::new("a", "go", NavigationIntent::advance("b")))
            .with_rule(FlowRule::new("a", "go", NavigationIntent::advance("b")));
        let result = analyze_flow("cfg", "a", &demo_screens(), &flow);

        assert_eq!(result.error_count(), 0);
        // 重复规则 + b 没有出口
        assert_eq!(result.warn_count(), 2);
    }

    #[test]
    fn test_layer_checks() {
        let mut screens = demo_screens();
        screens.insert(
            "b".to_string(),
            LayerNode::new("1")
                .with_layout_id("card")
                .with_child(LayerNode::new("1").with_layout_id("card"))
                .with_child(LayerNode::new("3").with_layout_id("lonely")),
        );
        let result = analyze_flow("cfg", "a", &screens, &NavigationFlow::demo());

        assert_eq!(result.error_count(), 1);
        assert_eq!(result.warn_count(), 1);
        let infos = result.filter_by_level(DiagnosticLevel::Info);
        // a 上的 container 与 b 上的 lonely 都无法匹配
        assert_eq!(
            infos.iter().filter(|d| d.level == DiagnosticLevel::Info).count(),
            2
        );
    }

    #[test]
    fn test_display() {
        let diag = Diagnostic::warn("config.json", "屏幕没有任何出口规则").with_screen("b");
        assert_eq!(diag.to_string(), "[WARN] config.json <b>: 屏幕没有任何出口规则");
    }
}
