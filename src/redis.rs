//! Redis存儲模組
//!
//! 此模組提供Redis數據存取功能。包括連接池管理，以及快取鍵值操作和
//! FIFO佇列操作的實現。所有持久性與原子性保證均由Redis伺服器本身提供。

pub mod operations;
pub mod pool;

#[cfg(test)]
pub mod test_config;

pub use operations::cache::*;
pub use operations::queue::*;
pub use pool::*;
