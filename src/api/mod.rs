//! HTTP API parsers
//!
//! Lightweight alternatives to driving a browser, tried before the
//! extraction engine when enabled.

pub mod fxtwitter;

pub use fxtwitter::FxTwitterClient;
