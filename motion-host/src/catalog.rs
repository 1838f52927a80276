//! # Catalog 模块
//!
//! 内容目录：宿主持有的内容句柄到图层树的映射。
//!
//! 协调器只转交 [`ContentHandle`]，从不解读它；宿主在渲染时查目录得到图层树。

use std::collections::{BTreeMap, HashMap};

use motion_runtime::{ContentHandle, LayerNode, ScreenId};

use crate::config::AppConfig;

/// 内容目录
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    /// 内容句柄 -> 图层树
    trees: HashMap<ContentHandle, LayerNode>,
    /// 屏幕 ID -> 内容句柄
    handles: BTreeMap<ScreenId, ContentHandle>,
    /// 屏幕 ID -> 能否作为共享布局锚点
    anchors: BTreeMap<ScreenId, bool>,
}

impl ContentCatalog {
    /// 从配置构建目录
    pub fn from_config(config: &AppConfig) -> Self {
        let mut catalog = Self::default();
        for (id, screen) in &config.screens {
            catalog.insert(
                id.clone(),
                screen.content_handle(id),
                screen.layers.clone(),
                screen.layout_anchor,
            );
        }
        catalog
    }

    /// 注册屏幕内容
    pub fn insert(
        &mut self,
        screen_id: impl Into<ScreenId>,
        handle: ContentHandle,
        layers: LayerNode,
        layout_anchor: bool,
    ) {
        let screen_id = screen_id.into();
        self.trees.insert(handle.clone(), layers);
        self.handles.insert(screen_id.clone(), handle);
        self.anchors.insert(screen_id, layout_anchor);
    }

    /// 屏幕对应的内容句柄
    pub fn content_for(&self, screen_id: &str) -> Option<&ContentHandle> {
        self.handles.get(screen_id)
    }

    /// 内容句柄对应的图层树
    pub fn layers(&self, handle: &ContentHandle) -> Option<&LayerNode> {
        self.trees.get(handle)
    }

    /// 屏幕能否作为共享布局锚点（未登记的屏幕视为可以）
    pub fn layout_anchor(&self, screen_id: &str) -> bool {
        self.anchors.get(screen_id).copied().unwrap_or(true)
    }

    /// 已登记的屏幕数量
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
