//! # Config 模块
//!
//! 演示宿主的配置管理，集中管理屏幕目录、导航流程和会话参数。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use motion_runtime::{
    ADVANCE_TRIGGER, ContentHandle, DiagnosticLevel, DiagnosticResult, LayerNode, NavigationFlow,
    ScreenId, TriggerId, analyze_flow,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// 输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 每帧一行 JSON
    #[default]
    Json,
    /// 人类可读的文本
    Text,
}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 初始屏幕
    #[serde(default = "default_initial_screen")]
    pub initial_screen: ScreenId,

    /// 屏幕目录：屏幕 ID 到内容描述
    #[serde(default = "default_screens")]
    pub screens: BTreeMap<ScreenId, ScreenConfig>,

    /// 导航流程表
    #[serde(default = "NavigationFlow::demo")]
    pub flow: NavigationFlow,

    /// 会话配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 调试配置
    #[serde(default)]
    pub debug: DebugConfig,
}

/// 单个屏幕的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// 内容句柄（未配置时使用屏幕 ID）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentHandle>,

    /// 能否作为共享布局动画的锚点
    #[serde(default = "default_layout_anchor")]
    pub layout_anchor: bool,

    /// 图层树
    pub layers: LayerNode,
}

impl ScreenConfig {
    /// 创建使用屏幕 ID 作为内容句柄的屏幕
    pub fn new(layers: LayerNode) -> Self {
        Self {
            content: None,
            layout_anchor: default_layout_anchor(),
            layers,
        }
    }

    /// 生效的内容句柄
    pub fn content_handle(&self, screen_id: &str) -> ContentHandle {
        self.content
            .clone()
            .unwrap_or_else(|| ContentHandle::new(screen_id))
    }
}

/// 会话配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 触发次数
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// 每一步使用的触发器
    #[serde(default = "default_trigger")]
    pub trigger: TriggerId,

    /// 呈现后自动确认退出屏幕已卸载
    #[serde(default)]
    pub auto_unmount: bool,

    /// 输出格式
    #[serde(default)]
    pub format: OutputFormat,
}

/// 调试配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// 每一步后检查导航不变量
    ///
    /// - debug build 默认开启（见 `default_check_invariants()`）
    /// - release build 默认关闭，可在 `config.json` 显式设置
    /// - 检查结果只输出日志，不中断会话
    #[serde(default = "default_check_invariants")]
    pub check_invariants: bool,
}

fn default_initial_screen() -> ScreenId {
    "a".to_string()
}

/// 演示屏幕：两个屏幕各有一个 container 和一个 card 图层
fn default_screens() -> BTreeMap<ScreenId, ScreenConfig> {
    let card_screen = |prefix: &str| {
        LayerNode::new(format!("{prefix}-container"))
            .with_layout_id("container")
            .with_child(LayerNode::new(format!("{prefix}-card")).with_layout_id("card"))
    };

    let mut screens = BTreeMap::new();
    screens.insert("a".to_string(), ScreenConfig::new(card_screen("a")));
    screens.insert("b".to_string(), ScreenConfig::new(card_screen("b")));
    screens
}

fn default_layout_anchor() -> bool {
    true
}

fn default_steps() -> usize {
    4
}

fn default_trigger() -> TriggerId {
    ADVANCE_TRIGGER.to_string()
}

fn default_check_invariants() -> bool {
    cfg!(debug_assertions)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_screen: default_initial_screen(),
            screens: default_screens(),
            flow: NavigationFlow::demo(),
            session: SessionConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            trigger: default_trigger(),
            auto_unmount: false,
            format: OutputFormat::default(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            check_invariants: default_check_invariants(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => {
                info!(path = %path.display(), "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(error = %e, "配置文件加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 严格读取配置文件，不做回退
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 屏幕 ID 到图层树的目录
    pub fn layer_catalog(&self) -> BTreeMap<ScreenId, LayerNode> {
        self.screens
            .iter()
            .map(|(id, screen)| (id.clone(), screen.layers.clone()))
            .collect()
    }

    /// 对流程表和屏幕目录做静态检查
    pub fn diagnose(&self, source: &str) -> DiagnosticResult {
        analyze_flow(source, &self.initial_screen, &self.layer_catalog(), &self.flow)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screens.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "屏幕目录不能为空".to_string(),
            ));
        }

        for (id, screen) in &self.screens {
            if id.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "屏幕 ID 不能为空".to_string(),
                ));
            }
            if screen.content_handle(id).is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "屏幕 '{}' 的内容句柄为空",
                    id
                )));
            }
        }

        if self.session.trigger.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "触发器不能为空".to_string(),
            ));
        }

        // 引用错误（未知屏幕、重复图层）视为配置错误；警告只在 --check 时展示
        let diagnostics = self.diagnose("config");
        if let Some(first) = diagnostics
            .diagnostics
            .iter()
            .find(|d| d.level == DiagnosticLevel::Error)
        {
            return Err(ConfigError::ValidationFailed(first.to_string()));
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    #[error("配置解析失败: {0}")]
    ParseFailed(String),
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
