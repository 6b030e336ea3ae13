//! # xpost-extract 命令行入口
//!
//! 解析单个 X/Twitter 帖子链接，并以 JSON 形式输出规范化记录。
//!
//! ## 用法
//! ```text
//! xpost-extract [--config FILE] [--api] <URL>
//! ```
//!
//! ## 环境变量
//! - `RUST_LOG`: 日志过滤（未设置时使用配置中的 `log_level`）
//! - `XPOST_*`: 未指定 `--config` 时的配置来源，例如 `XPOST_CHROME_PATH`、`XPOST_HEADLESS`

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use xpost_extract::{config::Config, is_post_url, TwitterParserPlugin};

#[derive(Parser, Debug)]
#[command(name = "xpost-extract", version, about = "Extract one X/Twitter post as JSON")]
struct Args {
    /// Path to a config TOML file (defaults to XPOST_* environment variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Try the fxtwitter API before the browser
    #[arg(long)]
    api: bool,

    /// Post URL, e.g. https://x.com/jack/status/20
    url: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::from_env().context("loading configuration from environment")?,
    };
    if args.api {
        config.api_enabled = true;
    }

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("xpost-extract v{}", xpost_extract::VERSION);

    if !is_post_url(&args.url) {
        bail!("not an X/Twitter post URL: {}", args.url);
    }

    let plugin = TwitterParserPlugin::new(&config)?;
    plugin.on_load();
    plugin.on_enable();

    let result = plugin.parse(&args.url);
    plugin.on_unload();

    match result {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_with_options() {
        let args = Args::try_parse_from([
            "xpost-extract",
            "--api",
            "--config",
            "xpost.toml",
            "https://x.com/jack/status/20",
        ])
        .unwrap();

        assert!(args.api);
        assert_eq!(args.config, Some(PathBuf::from("xpost.toml")));
        assert_eq!(args.url, "https://x.com/jack/status/20");
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["xpost-extract", "https://x.com/jack/status/20"]).unwrap();

        assert!(!args.api);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_args_require_url() {
        assert!(Args::try_parse_from(["xpost-extract", "--api"]).is_err());
        assert!(Args::try_parse_from(["xpost-extract", "--verbose", "https://x.com/jack/status/20"]).is_err());
    }
}
