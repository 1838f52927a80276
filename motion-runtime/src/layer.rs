//! # Layer 模块
//!
//! 图层读取所在屏幕的 [`ElementContext`]，决定自身如何参与共享布局动画。
//!
//! ## 规则
//!
//! - 仅当 `is_valid_anchor` 为真时保留 `layout_id`，否则清除，动画引擎按普通元素处理
//! - 参与动画时采用 `layout_order` 作为排序提示
//! - `presence` 为 `Suppressed` 时显式标记为不存在，引擎执行退出动画

use serde::{Deserialize, Serialize};

use crate::context::{ElementContext, Presence};

/// 图层树节点
///
/// 屏幕内容由宿主以图层树描述；协调器本身不解读它。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerNode {
    /// 图层标识符（屏幕内唯一）
    pub id: String,
    /// 共享布局标识符：两个相邻屏幕上相同的 `layout_id` 会被匹配并执行形变动画
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_id: Option<String>,
    /// 子图层
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayerNode>,
}

/// 图层解析后交给动画引擎的属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerProps {
    /// 图层标识符
    pub layer_id: String,
    /// 生效的共享布局标识符
    pub layout_id: Option<String>,
    /// 动画排序提示
    pub layout_order: Option<u32>,
    /// 存在状态
    pub presence: Presence,
    /// 所属屏幕是否为当前屏幕
    pub is_current: bool,
    /// 在图层树中的深度（根为 0）
    pub depth: usize,
}

impl LayerProps {
    /// 是否参与共享布局动画
    pub fn participates(&self) -> bool {
        self.layout_id.is_some()
    }
}

impl LayerNode {
    /// 创建叶子图层
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layout_id: None,
            children: Vec::new(),
        }
    }

    /// 设置共享布局标识符
    pub fn with_layout_id(mut self, layout_id: impl Into<String>) -> Self {
        self.layout_id = Some(layout_id.into());
        self
    }

    /// 添加子图层
    pub fn with_child(mut self, child: LayerNode) -> Self {
        self.children.push(child);
        self
    }

    /// 按上下文解析单个图层
    pub fn resolve(&self, ctx: &ElementContext) -> LayerProps {
        self.resolve_at(ctx, 0)
    }

    fn resolve_at(&self, ctx: &ElementContext, depth: usize) -> LayerProps {
        let (layout_id, layout_order) = if ctx.is_valid_anchor {
            (self.layout_id.clone(), Some(ctx.layout_order))
        } else {
            (None, None)
        };

        LayerProps {
            layer_id: self.id.clone(),
            layout_id,
            layout_order,
            presence: ctx.presence,
            is_current: ctx.is_current,
            depth,
        }
    }

    /// 解析整棵图层树（先序遍历），上下文显式逐层传递
    pub fn resolve_tree(&self, ctx: &ElementContext) -> Vec<LayerProps> {
        let mut out = Vec::new();
        self.collect(ctx, 0, &mut out);
        out
    }

    fn collect(&self, ctx: &ElementContext, depth: usize, out: &mut Vec<LayerProps>) {
        out.push(self.resolve_at(ctx, depth));
        for child in &self.children {
            child.collect(ctx, depth + 1, out);
        }
    }

    /// 先序遍历所有图层
    pub fn walk(&self) -> Vec<&LayerNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }

    /// 树中声明的全部共享布局标识符（先序，可能重复）
    pub fn layout_ids(&self) -> Vec<&str> {
        self.walk()
            .into_iter()
            .filter_map(|node| node.layout_id.as_deref())
            .collect()
    }
}
