//! Redis操作模組
//!
//! 提供高級的Redis操作功能，封裝常見Redis使用方案。
//! 包含快取鍵值操作與基於Redis列表的FIFO佇列操作。

// 已實現的子模組
pub mod cache;
pub mod queue;

pub use cache::*;
pub use queue::*;
