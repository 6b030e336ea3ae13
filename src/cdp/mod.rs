//! # Chrome DevTools Protocol (CDP) 层
//!
//! 通过 WebSocket 与 Chrome/Chromium 通信，为提取引擎提供浏览器自动化能力。
//!
//! ## 主要功能
//! - **进程启动**: 以一次性配置目录启动浏览器，并从 stderr 读取 DevTools 地址
//! - **WebSocket 连接管理**: 每个 target 一条连接，按请求 ID 分发响应
//! - **浏览上下文**: 创建和销毁隔离的 browser context 及其页面
//! - **导航控制**: 页面导航，并报告网络层错误
//! - **脚本执行**: 在页面上下文中执行 JavaScript
//!
//! ## 模块结构
//! - `traits`: CDP 操作的核心 trait 定义
//! - `types`: CDP 协议相关的数据类型
//! - `connection`: WebSocket 连接实现
//! - `client`: 页面级 CDP 客户端
//! - `browser`: 浏览器级别的操作
//! - `launcher`: Chrome 进程启动器
//! - `mock`: 用于测试的 Mock 实现
//!
//! ## 使用示例
//! ```rust,no_run
//! use xpost_extract::cdp::{BrowserLauncher, ChromeLauncher, LaunchOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let launcher = ChromeLauncher::new(Duration::from_secs(60));
//! let browser = launcher.launch(&LaunchOptions::default()).await?;
//!
//! let context_id = browser.create_browser_context().await?;
//! let target = browser.create_target(&context_id, "about:blank").await?;
//! let client = browser.create_client(&target).await?;
//!
//! client.navigate("https://example.com").await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod types;
pub mod connection;
pub mod client;
pub mod browser;
pub mod launcher;
pub mod mock;

#[cfg(test)]
mod tests;

pub use traits::{
    BrowserLauncher, BrowserVersion, CdpBrowser, CdpClient, CdpConnection, CdpError, CdpResponse,
    EvaluationResult, LaunchOptions, NavigationResult,
};

// Re-export implementation structs
pub use browser::CdpBrowserImpl;
pub use client::CdpClientImpl;
pub use connection::CdpWebSocketConnection;
pub use launcher::ChromeLauncher;

// Re-export mock for development/testing
pub use mock::{MockCdpBrowser, MockCdpClient, MockDocument, MockLauncher};
