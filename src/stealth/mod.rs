//! # 隐身配置
//!
//! 为浏览上下文中的每个页面设置统一的浏览器指纹，降低被识别为自动化流量的概率。
//!
//! ## 主要功能
//! - **上下文配置**: 视口、User-Agent、语言区域与时区
//! - **脚本注入**: 在页面脚本之前执行的初始化脚本（隐藏 `navigator.webdriver`）
//!
//! ## 模块结构
//! - `profile`: 上下文配置与默认值
//! - `injector`: 通过 CDP 将配置应用到新页面
//!
//! ## 使用示例
//! ```rust,no_run
//! use xpost_extract::stealth::{apply_profile, ContextProfile};
//! use xpost_extract::cdp::CdpClient;
//!
//! # async fn example(client: &dyn CdpClient) -> Result<(), Box<dyn std::error::Error>> {
//! let applied = apply_profile(client, &ContextProfile::default()).await?;
//! println!("Applied {} features", applied.features.len());
//! # Ok(())
//! # }
//! ```

pub mod profile;
pub mod injector;


pub use injector::{apply_profile, AppliedFeatures};
pub use profile::{ContextProfile, Viewport, DESKTOP_USER_AGENT, WEBDRIVER_MASK_SCRIPT};
