//! 客户端：请求队列、配置与批量发送入口。
//!
//! Client surface: configuration, request queue and `send()`.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;

pub use self::builder::ClientBuilder;
pub use self::core::BattleNetClient;
