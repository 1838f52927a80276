//! # 会话集成测试
//!
//! 测试 配置文件 → HostApp → RenderSurface 的完整链路。
//! 这些测试不依赖真实的渲染设备或动画引擎。

use std::fs;

use motion_host::{AppConfig, HostApp, JsonLinesSurface, OutputFormat, TextSurface};
use serde_json::Value;

const THREE_SCREEN_CONFIG: &str = r#"{
    "initial_screen": "list",
    "screens": {
        "list": {
            "layers": {"id": "list-root", "layout_id": "hero", "children": [{"id": "list-title"}]}
        },
        "detail": {
            "content": "detail-view",
            "layers": {"id": "detail-root", "layout_id": "hero"}
        },
        "settings": {
            "layout_anchor": false,
            "layers": {"id": "settings-root", "layout_id": "hero"}
        }
    },
    "flow": [
        {"from": "list", "intent": {"kind": "advance", "target": "detail"}},
        {"from": "detail", "intent": {"kind": "advance", "target": "settings"}},
        {"from": "settings", "intent": {"kind": "return", "target": {"screen": "list"}}}
    ],
    "session": {"steps": 4, "auto_unmount": true}
}"#;

/// 把配置写入临时目录并严格读取
fn load_config(json: &str) -> AppConfig {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, json).unwrap();

    let config = AppConfig::from_file(&path).unwrap();
    config.validate().unwrap();
    config
}

/// 运行会话并按行解析 JSON 输出
fn run_json(config: &AppConfig) -> Vec<Value> {
    let mut app = HostApp::new(config).unwrap();
    let mut surface = JsonLinesSurface::new(Vec::new());
    let steps = app.run(&mut surface).unwrap();
    assert_eq!(steps, config.session.steps);

    String::from_utf8(surface.into_inner())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// 默认配置：两屏演示交替执行即时更新和共享布局动画
#[test]
fn test_default_demo_session() {
    let frames = run_json(&AppConfig::default());

    // 初始帧 + 4 步
    assert_eq!(frames.len(), 5);

    let passes: Vec<&str> = frames
        .iter()
        .map(|f| f["animation"]["pass"].as_str().unwrap())
        .collect();
    assert_eq!(
        passes,
        vec!["instant", "instant", "shared_layout", "instant", "shared_layout"]
    );

    let outcomes: Vec<&str> = frames[1..]
        .iter()
        .map(|f| f["outcome"]["outcome"].as_str().unwrap())
        .collect();
    assert_eq!(outcomes, vec!["added", "returned", "advanced", "returned"]);

    // 令牌只在返回时变化
    let tokens: Vec<u64> = frames
        .iter()
        .map(|f| f["frame"]["token"].as_u64().unwrap())
        .collect();
    assert_eq!(tokens, vec![0, 0, 1, 1, 2]);
}

/// 三屏流程：不可作锚点的屏幕只做退出动画，卸载确认后被删除
#[test]
fn test_three_screen_session() {
    let config = load_config(THREE_SCREEN_CONFIG);
    let frames = run_json(&config);
    assert_eq!(frames.len(), 5);

    // 1. 新屏幕使用配置的内容句柄
    let detail = &frames[1]["frame"]["screens"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["screen_id"] == "detail")
        .cloned()
        .unwrap();
    assert_eq!(detail["content"], "detail-view");

    // 2. settings 不提供锚点
    let settings_layers = frames[2]["layers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["screen_id"] == "settings")
        .cloned()
        .unwrap();
    assert!(settings_layers["layers"][0]["layout_id"].is_null());

    // 3. 返回 list：settings 退出，但它没有可匹配的元素
    let returned = &frames[3];
    assert_eq!(returned["outcome"]["outcome"], "returned");
    assert_eq!(returned["outcome"]["departing"], "settings");
    assert_eq!(returned["animation"]["pass"], "shared_layout");
    assert_eq!(returned["animation"]["matched"].as_array().unwrap().len(), 0);
    assert_eq!(returned["animation"]["exiting"][0], "settings-root");

    // 4. 下一步之前确认卸载，settings 被删除
    let last = &frames[4];
    assert_eq!(last["unmounted"][0], "settings");
    assert_eq!(last["outcome"]["outcome"], "advanced");
    assert_eq!(last["animation"]["pass"], "instant");
    assert_eq!(last["frame"]["screens"].as_array().unwrap().len(), 2);
}

/// 文本输出
#[test]
fn test_text_output() {
    let mut config = AppConfig::default();
    config.session.steps = 2;
    config.session.format = OutputFormat::Text;

    let mut app = HostApp::new(&config).unwrap();
    let mut surface = TextSurface::new(Vec::new());
    app.run(&mut surface).unwrap();

    let output = String::from_utf8(surface.into_inner()).unwrap();
    assert_eq!(output.matches("step ").count(), 3);
    assert!(output.contains("returned to a (departing b)"));
}

/// 保存后的配置可以被重新加载并驱动相同的会话
#[test]
fn test_saved_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let config = load_config(THREE_SCREEN_CONFIG);
    config.save(&path).unwrap();
    let reloaded = AppConfig::load(&path);

    assert_eq!(reloaded, config);
    assert_eq!(run_json(&reloaded), run_json(&config));
}

/// 没有匹配规则的触发器被拒绝，会话继续
#[test]
fn test_unmatched_trigger_keeps_state() {
    let mut config = AppConfig::default();
    config.session.trigger = "back".to_string();

    let frames = run_json(&config);
    for frame in &frames[1..] {
        assert_eq!(frame["outcome"]["outcome"], "rejected");
        assert_eq!(frame["outcome"]["reason"]["kind"], "no_rule");
        assert_eq!(frame["outcome"]["reason"]["trigger"], "back");
        assert_eq!(frame["frame"]["screens"].as_array().unwrap().len(), 1);
    }
}
