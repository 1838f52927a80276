//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 motion-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `flow-check`: 检查配置文件（屏幕目录、流程表、图层树）

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use motion_host::AppConfig;
use motion_runtime::DiagnosticResult;
use walkdir::WalkDir;
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "开发辅助工具")]
#[command(after_help = "ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-runtime   -> cargo xtask cov-runtime
  cargo cov-workspace -> cargo xtask cov-workspace
  cargo flow-check    -> cargo xtask flow-check")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,

    /// 运行 motion-runtime 覆盖率报告
    CovRuntime,

    /// 运行 workspace 覆盖率报告
    CovWorkspace,

    /// 检查配置文件
    ///
    /// 不带参数：检查 workspace 根目录下的 config.json；
    /// 带路径参数：检查指定文件，或目录下所有 .json 文件。
    ///
    /// 检查内容：
    ///   - 配置文件能否解析
    ///   - 流程规则引用的屏幕是否存在
    ///   - 重复规则、没有出口的屏幕
    ///   - 图层 ID 重复、无法匹配的共享布局 ID
    FlowCheck {
        /// 配置文件或目录
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    match cli.command {
        Commands::CheckAll => {
            eprintln!("\n==> cargo fmt --all -- --check");
            cmd!(sh, "cargo fmt --all -- --check").run()?;

            eprintln!("\n==> cargo clippy --workspace --all-targets");
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

            eprintln!("\n==> cargo test --workspace");
            cmd!(sh, "cargo test --workspace").run()?;
        }
        Commands::CovRuntime => {
            ensure_cargo_llvm_cov_available(&sh)?;

            eprintln!("\n==> cargo llvm-cov -p motion-runtime --all-features --html");
            cmd!(sh, "cargo llvm-cov -p motion-runtime --all-features --html").run()?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Commands::CovWorkspace => {
            ensure_cargo_llvm_cov_available(&sh)?;

            // workspace 覆盖率主要用于趋势观察，排除 xtask 以免稀释信号
            eprintln!("\n==> cargo llvm-cov --workspace --exclude xtask --all-features --html");
            cmd!(
                sh,
                "cargo llvm-cov --workspace --exclude xtask --all-features --html"
            )
            .run()?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Commands::FlowCheck { path } => {
            flow_check(path.as_deref())?;
        }
    }

    Ok(())
}

fn ensure_cargo_llvm_cov_available(sh: &Shell) -> anyhow::Result<()> {
    match cmd!(sh, "cargo llvm-cov --version")
        .quiet()
        .ignore_stdout()
        .run()
    {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

//=============================================================================
// flow-check 命令实现
//=============================================================================

/// 默认配置文件（相对于 workspace root）
const DEFAULT_CONFIG: &str = "config.json";

/// 配置检查结果
struct FlowCheckResult {
    /// 检查的配置数量
    configs_checked: usize,
    /// 解析错误数量
    parse_errors: usize,
    /// 诊断结果
    diagnostics: DiagnosticResult,
}

/// 执行配置检查
fn flow_check(path: Option<&Path>) -> anyhow::Result<()> {
    let files = match path {
        Some(p) if p.is_file() => vec![p.to_path_buf()],
        Some(p) if p.is_dir() => collect_config_files(p),
        Some(p) => anyhow::bail!("路径不存在: {}", p.display()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG);
            if !default.exists() {
                anyhow::bail!(
                    "默认配置文件不存在: {}\n请在 workspace 根目录运行，或指定配置路径",
                    default.display()
                );
            }
            vec![default]
        }
    };

    if files.is_empty() {
        eprintln!("未找到配置文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个配置文件...\n", files.len());

    let mut result = FlowCheckResult {
        configs_checked: 0,
        parse_errors: 0,
        diagnostics: DiagnosticResult::new(),
    };

    for file in &files {
        check_config_file(file, &mut result);
    }

    print_check_result(&result);

    if result.parse_errors > 0 || result.diagnostics.has_errors() {
        anyhow::bail!("配置检查发现错误");
    }

    Ok(())
}

/// 收集目录下的所有配置文件
fn collect_config_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个配置文件
fn check_config_file(file: &Path, result: &mut FlowCheckResult) {
    let source = file.display().to_string();
    result.configs_checked += 1;

    let config = match AppConfig::from_file(file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[ERROR] {}: {}", source, e);
            result.parse_errors += 1;
            return;
        }
    };

    result.diagnostics.merge(config.diagnose(&source));
}

/// 输出检查结果
fn print_check_result(result: &FlowCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个配置", result.configs_checked);
    eprintln!();

    for diag in &result.diagnostics.diagnostics {
        eprintln!("{}", diag);
    }

    let error_count = result.parse_errors + result.diagnostics.error_count();
    let warn_count = result.diagnostics.warn_count();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {} 个错误, {} 个警告", error_count, warn_count);
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {} 个警告", warn_count);
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
