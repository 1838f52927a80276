//! # Coordinator 模块
//!
//! 过渡协调器，负责导航状态的推进。
//!
//! ## 模块结构
//!
//! - [`engine`]：持有当前快照的协调器
//! - [`policy`]：快照到快照的纯过渡函数

pub mod engine;
pub mod policy;

pub use engine::TransitionCoordinator;
pub use policy::{Transition, TransitionKind, TransitionOutcome};
