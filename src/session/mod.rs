//! # 会话管理层
//!
//! 管理浏览器会话与页面的生命周期：一个浏览器进程、一个持久的浏览上下文，以及每次提取专用的一次性页面。
//!
//! ## 主要功能
//! - **延迟初始化**: 首次提取时才启动浏览器并创建浏览上下文，重复调用幂等
//! - **页面管理**: 为每次调用创建独立页面，并在所有退出路径上关闭
//! - **会话清理**: 按顺序关闭上下文、浏览器和自动化引擎，单步失败只记录日志
//! - **并发安全**: 初始化与清理由同一把异步锁串行化
//!
//! ## 核心概念
//! - **BrowserSession**: 浏览器进程与浏览上下文
//! - **ExtractionPage**: 单次调用独占的页面
//!
//! ## 模块结构
//! - `traits`: 会话管理的核心 trait 定义
//! - `manager`: 会话管理器实现
//! - `browser`: 浏览器会话实现
//! - `page`: 提取页面实现
//!
//! ## 使用示例
//! ```rust,no_run
//! use xpost_extract::session::{SessionManager, SessionManagerImpl};
//! use xpost_extract::config::Config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = SessionManagerImpl::from_config(&Config::default());
//!
//! let session = manager.ensure_ready().await?;
//! let page = session.open_page().await?;
//! page.navigate("https://x.com/jack/status/20").await?;
//! page.close().await?;
//!
//! manager.teardown().await;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod manager;
pub mod browser;
pub mod page;


pub use traits::SessionManager;

// Re-export implementation structs
pub use browser::BrowserSession;
pub use manager::SessionManagerImpl;
pub use page::ExtractionPage;
