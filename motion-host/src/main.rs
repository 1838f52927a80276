//! Motion Host - 共享布局过渡演示宿主
//!
//! 按配置文件驱动导航会话，把每一帧输出到 stdout，日志输出到 stderr。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use motion_host::{AppConfig, HostApp, JsonLinesSurface, OutputFormat, RenderSurface, TextSurface};
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "motion-host")]
#[command(about = "共享布局过渡演示宿主 - 无界面驱动导航并输出渲染帧")]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// 触发次数（覆盖配置）
    #[arg(short, long)]
    steps: Option<usize>,

    /// 每一步使用的触发器（覆盖配置）
    #[arg(short, long)]
    trigger: Option<String>,

    /// 呈现后自动确认退出屏幕已卸载
    #[arg(long)]
    auto_unmount: bool,

    /// 输出格式（覆盖配置）
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// 只检查配置与流程表，不运行会话
    #[arg(long)]
    check: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load(&cli.config);
    if let Some(steps) = cli.steps {
        config.session.steps = steps;
    }
    if let Some(trigger) = cli.trigger {
        config.session.trigger = trigger;
    }
    if cli.auto_unmount {
        config.session.auto_unmount = true;
    }
    if let Some(format) = cli.format {
        config.session.format = format;
    }

    if cli.check {
        return check(&config, &cli.config.display().to_string());
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "配置无效");
        return ExitCode::from(1);
    }

    match run(&config) {
        Ok(steps) => {
            info!(steps, "完成");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "会话失败");
            ExitCode::from(1)
        }
    }
}

fn run(config: &AppConfig) -> motion_host::HostResult<usize> {
    let mut app = HostApp::new(config)?;
    let stdout = std::io::stdout().lock();
    let mut surface: Box<dyn RenderSurface> = match config.session.format {
        OutputFormat::Json => Box::new(JsonLinesSurface::new(stdout)),
        OutputFormat::Text => Box::new(TextSurface::new(stdout)),
    };
    app.run(surface.as_mut())
}

fn check(config: &AppConfig, source: &str) -> ExitCode {
    let result = config.diagnose(source);
    for diag in &result.diagnostics {
        eprintln!("{}", diag);
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "配置无效");
        return ExitCode::from(1);
    }

    info!(
        warnings = result.warn_count(),
        diagnostics = result.diagnostics.len(),
        "配置检查通过"
    );
    ExitCode::SUCCESS
}
