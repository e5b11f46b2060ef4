use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod build;
mod check;
mod config;
mod content;
mod error;
mod init;
mod plugin;
mod site;
mod source;
mod template;

#[cfg(test)]
mod test_helpers;

#[derive(Parser)]
#[command(name = "cpress", about = "静态博客站点生成器", version = long_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 构建静态站点
    Build {
        /// 站点目录（默认当前目录）
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// 同时输出草稿（覆盖 show_drafts）
        #[arg(long)]
        drafts: bool,

        /// 输出目录（覆盖 destination）
        #[arg(short, long)]
        dest: Option<PathBuf>,
    },

    /// 检查站点完整性
    Check {
        /// 站点目录（默认当前目录）
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// 创建站点骨架
    Init {
        /// 站点目录（默认当前目录）
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 使用配置中的日志级别作为默认值，RUST_LOG 优先
    let root = match &cli.command {
        Commands::Build { root, .. } | Commands::Check { root } | Commands::Init { root } => root,
    };
    let default_level = config::SiteConfig::load(root)
        .ok()
        .map(|c| c.log_level)
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_level)),
        )
        .init();

    match cli.command {
        Commands::Build { root, drafts, dest } => {
            let root = root.canonicalize()?;
            build::run(
                &root,
                build::BuildOptions {
                    show_drafts: drafts.then_some(true),
                    destination: dest,
                },
            )?;
        }
        Commands::Check { root } => {
            let root = root.canonicalize()?;
            let result = check::run(&root)?;

            for w in &result.warnings {
                tracing::warn!("{w}");
            }
            for e in &result.errors {
                tracing::error!("{e}");
            }

            if result.errors.is_empty() {
                tracing::info!("检查通过（{} 个警告）", result.warnings.len());
            } else {
                anyhow::bail!(
                    "检查未通过：{} 个错误，{} 个警告",
                    result.errors.len(),
                    result.warnings.len()
                );
            }
        }
        Commands::Init { root } => {
            if init::init_site(&root)? {
                tracing::info!("已创建站点骨架：{}", root.display());
            } else {
                tracing::warn!("{} 已存在，未做改动", root.join(config::CONFIG_FILE).display());
            }
        }
    }

    Ok(())
}

const fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\ncommit:  ",
        env!("CPRESS_GIT_COMMIT"),
        "\nbuild:   ",
        env!("CPRESS_BUILD_TIME"),
        "\ntarget:  ",
        env!("CPRESS_BUILD_TARGET"),
        "\nprofile: ",
        env!("CPRESS_BUILD_PROFILE"),
    )
}
