//! # Motion Host
//!
//! 共享布局过渡的无界面演示宿主。
//!
//! 宿主负责协调器之外的一切：屏幕内容目录、流程表、动画引擎替身和帧输出。
//!
//! ## 模块结构
//!
//! - [`config`]：配置加载与验证
//! - [`catalog`]：内容句柄到图层树的目录
//! - [`animator`]：检测令牌变化、匹配共享布局元素
//! - [`surface`]：帧输出（JSON Lines / 文本）
//! - [`app`]：驱动协调器的会话循环

pub mod animator;
pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod surface;

pub use animator::{AnimationPass, Animator, ScreenLayers, SharedLayoutAnimator};
pub use app::{HostApp, HostFrame};
pub use catalog::ContentCatalog;
pub use config::{AppConfig, ConfigError, DebugConfig, OutputFormat, ScreenConfig, SessionConfig};
pub use error::{HostError, HostResult};
pub use surface::{JsonLinesSurface, RenderSurface, TextSurface};
