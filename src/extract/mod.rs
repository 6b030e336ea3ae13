//! # 提取引擎
//!
//! 在浏览器会话中打开页面、等待动态内容渲染、执行页面内提取脚本，并将结果规范化为统一的帖子记录。
//!
//! ## 主要功能
//! - **导航与等待**: 仅等待 DOM 就绪，再按数据驱动的等待计划依次尝试选择器，最后固定延时
//! - **页面脚本**: 从渲染后的 DOM 读取正文、作者、媒体与时间戳
//! - **结果分类**: 区分找到、未找到与部分字段异常三种结果
//! - **规范化**: 媒体地址原图化、时间戳转毫秒、从 URL 推导帖子 ID
//!
//! ## 模块结构
//! - `scripts`: 页面内执行的 JavaScript
//! - `navigation`: 导航与等待控制器
//! - `raw`: 脚本原始输出与结果分类
//! - `record`: 规范化记录
//! - `normalize`: 规范化函数
//! - `engine`: 串联以上各步骤的提取引擎
//!
//! ## 使用示例
//! ```rust,no_run
//! use xpost_extract::config::Config;
//! use xpost_extract::extract::ExtractionEngine;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = ExtractionEngine::from_config(&Config::default());
//!
//! let record = engine.extract("https://x.com/jack/status/20").await?;
//! println!("{}", record.content);
//!
//! engine.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod scripts;
pub mod navigation;
pub mod raw;
pub mod record;
pub mod normalize;
pub mod engine;

pub use engine::ExtractionEngine;
pub use navigation::{NavigationController, ReadinessTier, WaitPlan};
pub use normalize::{canonicalize_image_url, normalize, parse_post_id, parse_timestamp_ms, resolve};
pub use raw::{ExtractionOutcome, NormalizationWarning, RawAuthor, RawExtraction, RawVideo};
pub use record::{Author, CanonicalRecord, MediaItem, MediaKind, Platform, PARSER_TAG, STATE_SUCCESS};
