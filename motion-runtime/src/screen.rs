//! # Screen 模块
//!
//! 屏幕及屏幕注册表。
//!
//! ## 设计原则
//!
//! - `ScreenRegistry` 是**值类型**：所有 `with_*` 操作都返回新的注册表，不修改原值
//! - 逻辑索引与视觉层级都从同一个单调递增的槽位计数器分配
//! - 协调器从不解读屏幕内容，只原样保留 [`ContentHandle`]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 屏幕标识符
pub type ScreenId = String;

/// 屏幕内容句柄
///
/// 指向宿主持有的元素树。协调器只负责在每个快照中原样携带它。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHandle(String);

impl ContentHandle {
    /// 创建内容句柄
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// 获取句柄字符串
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 句柄是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentHandle {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// 已挂载的屏幕
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    /// 屏幕标识符
    pub id: ScreenId,
    /// 内容句柄
    pub content: ContentHandle,
    /// 逻辑索引，仅用于判断当前/上一个屏幕
    pub logical_index: u32,
    /// 视觉层级（z-order），同时作为共享布局动画的排序提示
    pub visual_order: u32,
    /// 是否已被导航离开、等待退出动画完成
    pub removed: bool,
    /// 该屏幕的图层能否作为共享布局动画的锚点
    pub can_provide_layout_anchor: bool,
}

/// 屏幕注册表
///
/// 按屏幕 ID 排序存储，迭代顺序确定。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRegistry {
    screens: BTreeMap<ScreenId, Screen>,
    /// 下一个可用槽位
    next_slot: u32,
}

impl ScreenRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册新屏幕，占用下一个槽位
    ///
    /// 如果 `id` 已存在，原样返回（调用方应先检查）。
    pub fn with_added(&self, id: impl Into<ScreenId>, content: ContentHandle) -> Self {
        let id = id.into();
        if self.screens.contains_key(&id) {
            return self.clone();
        }

        let mut next = self.clone();
        let Some(slot) = next.take_slot() else {
            return self.clone();
        };
        next.screens.insert(
            id.clone(),
            Screen {
                id,
                content,
                logical_index: slot,
                visual_order: slot,
                removed: false,
                can_provide_layout_anchor: true,
            },
        );
        next
    }

    /// 把已注册的屏幕提升到新的槽位（逻辑索引和视觉层级都更新）
    ///
    /// 用于向前导航到一个先前注册过、但已不是当前屏幕的屏幕。
    pub fn with_advanced(&self, id: &str) -> Self {
        self.with_slot(id, true)
    }

    /// 重新进入已注册的屏幕：只更新逻辑索引，保留原视觉层级
    ///
    /// 用于返回型导航，返回的屏幕保持原来的堆叠位置。
    pub fn with_reentered(&self, id: &str) -> Self {
        self.with_slot(id, false)
    }

    fn with_slot(&self, id: &str, restack: bool) -> Self {
        if !self.screens.contains_key(id) {
            return self.clone();
        }

        let mut next = self.clone();
        let Some(slot) = next.take_slot() else {
            return self.clone();
        };
        if let Some(screen) = next.screens.get_mut(id) {
            screen.logical_index = slot;
            if restack {
                screen.visual_order = slot;
            }
            screen.removed = false;
        }
        next
    }

    /// 标记屏幕为已移除（等待退出动画），锚点资格保持不变
    pub fn with_marked_removed(&self, id: &str) -> Self {
        self.with_screen(id, |screen| screen.removed = true)
    }

    /// 彻底删除屏幕（收到外部卸载确认时调用）
    pub fn with_removed_purged(&self, id: &str) -> Self {
        if !self.screens.contains_key(id) {
            return self.clone();
        }

        let mut next = self.clone();
        next.screens.remove(id);
        next
    }

    /// 设置屏幕的锚点资格
    pub fn with_anchor_eligibility(&self, id: &str, eligible: bool) -> Self {
        self.with_screen(id, |screen| screen.can_provide_layout_anchor = eligible)
    }

    fn with_screen(&self, id: &str, update: impl FnOnce(&mut Screen)) -> Self {
        let mut next = self.clone();
        if let Some(screen) = next.screens.get_mut(id) {
            update(screen);
        }
        next
    }

    /// 分配下一个槽位；计数器用尽时返回 `None`
    fn take_slot(&mut self) -> Option<u32> {
        let slot = self.next_slot;
        self.next_slot = slot.checked_add(1)?;
        Some(slot)
    }

    /// 是否还能分配槽位
    pub fn has_free_slot(&self) -> bool {
        self.next_slot.checked_add(1).is_some()
    }

    /// 获取屏幕
    pub fn get(&self, id: &str) -> Option<&Screen> {
        self.screens.get(id)
    }

    /// 是否包含屏幕
    pub fn contains(&self, id: &str) -> bool {
        self.screens.contains_key(id)
    }

    /// 按逻辑索引查找屏幕
    pub fn by_logical_index(&self, index: u32) -> Option<&Screen> {
        self.screens.values().find(|s| s.logical_index == index)
    }

    /// 遍历所有屏幕（按 ID 排序）
    pub fn iter(&self) -> impl Iterator<Item = &Screen> {
        self.screens.values()
    }

    /// 所有处于移除状态的屏幕 ID
    pub fn removed_ids(&self) -> Vec<&ScreenId> {
        self.screens
            .values()
            .filter(|s| s.removed)
            .map(|s| &s.id)
            .collect()
    }

    /// 下一个将被分配的槽位
    pub fn next_slot(&self) -> u32 {
        self.next_slot
    }

    /// 屏幕数量
    pub fn len(&self) -> usize {
        self.screens.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_ab() -> ScreenRegistry {
        ScreenRegistry::new()
            .with_added("a", ContentHandle::new("a"))
            .with_added("b", ContentHandle::new("b"))
    }

    #[test]
    fn test_with_added_assigns_slots() {
        let registry = registry_ab();
        assert_eq!(registry.len(), 2);

        let a = registry.get("a").unwrap();
        assert_eq!((a.logical_index, a.visual_order), (0, 0));
        assert!(!a.removed);
        assert!(a.can_provide_layout_anchor);

        let b = registry.get("b").unwrap();
        assert_eq!((b.logical_index, b.visual_order), (1, 1));
        assert_eq!(registry.next_slot(), 2);
    }

    #[test]
    fn test_with_added_duplicate_is_noop() {
        let registry = registry_ab();
        let again = registry.with_added("a", ContentHandle::new("other"));
        assert_eq!(again, registry);
        assert_eq!(again.get("a").unwrap().content.as_str(), "a");
    }

    #[test]
    fn test_operations_leave_input_untouched() {
        let registry = registry_ab();
        let snapshot = registry.clone();

        let _ = registry.with_marked_removed("b");
        let _ = registry.with_advanced("a");
        let _ = registry.with_removed_purged("a");

        assert_eq!(registry, snapshot);
    }

    #[test]
    fn test_with_advanced_restacks_and_clears_removed() {
        let registry = registry_ab().with_marked_removed("b").with_advanced("b");
        let b = registry.get("b").unwrap();
        assert_eq!((b.logical_index, b.visual_order), (2, 2));
        assert!(!b.removed);
        assert_eq!(b.content.as_str(), "b");
    }

    #[test]
    fn test_exhausted_slots_are_noop() {
        let json = format!(r#"{{"screens":{{}},"next_slot":{}}}"#, u32::MAX);
        let registry: ScreenRegistry = serde_json::from_str(&json).unwrap();
        assert!(!registry.has_free_slot());

        let again = registry.with_added("a", ContentHandle::new("a"));
        assert_eq!(again, registry);
        assert!(registry_ab().has_free_slot());
    }

    #[test]
    fn test_with_reentered_keeps_visual_order() {
        let registry = registry_ab().with_reentered("a");
        let a = registry.get("a").unwrap();
        assert_eq!(a.logical_index, 2);
        assert_eq!(a.visual_order, 0);
    }

    #[test]
    fn test_marked_removed_keeps_anchor() {
        let registry = registry_ab().with_marked_removed("b");
        let b = registry.get("b").unwrap();
        assert!(b.removed);
        assert!(b.can_provide_layout_anchor);
        assert_eq!(registry.removed_ids(), vec!["b"]);
    }

    #[test]
    fn test_purge() {
        let registry = registry_ab().with_removed_purged("b");
        assert!(!registry.contains("b"));
        assert_eq!(registry.len(), 1);

        // 重复删除为空操作
        assert_eq!(registry.with_removed_purged("b"), registry);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let registry = registry_ab();
        assert_eq!(registry.with_advanced("x"), registry);
        assert_eq!(registry.with_reentered("x"), registry);
        assert_eq!(registry.with_marked_removed("x"), registry);
        assert_eq!(registry.with_anchor_eligibility("x", false), registry);
    }

    #[test]
    fn test_by_logical_index() {
        let registry = registry_ab().with_reentered("a");
        assert_eq!(registry.by_logical_index(2).unwrap().id, "a");
        assert_eq!(registry.by_logical_index(1).unwrap().id, "b");
        assert!(registry.by_logical_index(0).is_none());
    }
}
