//! 围棋棋谱树核心库
//!
//! 包含:
//! - 坐标表示法与压缩坐标展开
//! - 棋盘、棋子等核心数据结构
//! - 棋谱树（节点数组 + 下标引用）
//! - 棋谱树格式化与属性校验
//! - 棋谱浏览器（按手数、父子、兄弟、分支末端移动）
//! - 棋谱格式 (JSON)

mod board;
mod constants;
mod coord;
mod error;
mod formatter;
mod node;
mod properties;
mod record;
mod stone;
mod tree;
mod walker;

pub use board::Goban;
pub use constants::*;
pub use coord::{Coord, Point};
pub use error::{BoardError, CodecError, Result, TreeError};
pub use formatter::{FormatReport, FormatterConfig, RootPropertyDefect, TreeFormatter};
pub use node::{GameNode, NodeId, Properties};
pub use properties::PropertyRules;
pub use record::{GameRecord, NodeRecord, SessionMetadata};
pub use stone::{Color, Stone};
pub use tree::GameTree;
pub use walker::{SearchScope, StoneWalker, WalkerConfig};
