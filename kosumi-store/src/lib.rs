//! 围棋棋谱存储
//!
//! 棋谱记录和格式化规则的本地持久化

pub mod storage;

pub use storage::{SessionInfo, StorageManager};
