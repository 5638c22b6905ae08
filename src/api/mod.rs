//! ゲームAPI モジュール
//!
//! ローカルUIからゲームエンジンを操作するためのHTTP APIを提供する。

pub mod dto;
pub mod service;
pub mod handlers;
pub mod routes;
pub mod middleware;

pub use dto::*;
pub use service::*;
pub use routes::*;
