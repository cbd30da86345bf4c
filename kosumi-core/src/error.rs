//! 错误类型定义

use thiserror::Error;

use crate::node::NodeId;

/// 坐标编解码错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// 坐标不是两个字母表符号
    #[error("Invalid coordinate token: {token:?}")]
    InvalidToken { token: String },

    /// 压缩范围格式错误（空角点或多个分隔符）
    #[error("Malformed range: {token:?}")]
    MalformedRange { token: String },
}

/// 棋盘操作错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// 坐标超出棋盘
    #[error("Point ({x}, {y}) outside {columns}x{rows} board")]
    OutOfRange {
        x: usize,
        y: usize,
        columns: usize,
        rows: usize,
    },

    /// 起点没有棋子
    #[error("No stone at ({x}, {y})")]
    Unoccupied { x: usize, y: usize },

    /// 终点已有棋子
    #[error("Intersection ({x}, {y}) is already occupied")]
    Occupied { x: usize, y: usize },

    /// 棋盘行包含无效字符
    #[error("Invalid character {ch:?} in row {row}")]
    InvalidRow { row: usize, ch: char },

    /// 棋盘尺寸无效
    #[error("Invalid board size {columns}x{rows} (max {max})")]
    InvalidSize {
        columns: usize,
        rows: usize,
        max: usize,
    },

    /// 各行长度不一致
    #[error("Row {row} has {len} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// 多个“最新一手”标记
    #[error("More than one most-recent stone marker")]
    MultipleLatest,
}

/// 棋谱树错误
#[derive(Error, Debug)]
pub enum TreeError {
    /// 节点不存在
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    /// 子节点手数小于父节点
    #[error("Move number {child} at child is below parent move number {parent}")]
    MoveNumberRegression { parent: u32, child: u32 },

    /// 子节点棋盘尺寸与根节点不一致
    #[error("Board size {actual:?} does not match tree board size {expected:?}")]
    BoardSizeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// 棋谱记录没有节点
    #[error("Record contains no nodes")]
    EmptyRecord,

    /// 棋谱记录中的父节点引用无效
    #[error("Record node {index} references invalid parent {parent}")]
    InvalidParent { index: usize, parent: usize },

    /// 棋谱记录中出现了第二个根节点
    #[error("Record node {index} has no parent but is not the first node")]
    ExtraRoot { index: usize },

    /// 格式化时展开压缩坐标失败
    #[error("Property {key} at node {node}: {source}")]
    Codec {
        node: NodeId,
        key: String,
        #[source]
        source: CodecError,
    },

    /// 棋盘错误
    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    /// JSON 序列化错误
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 棋谱操作结果类型
pub type Result<T> = std::result::Result<T, TreeError>;
