//! 常量定义

/// 坐标字母表：列、行都用其中的一个符号表示
pub const COORDINATE_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 支持的最大棋盘边长（由字母表长度决定）
pub const MAX_BOARD_SIZE: usize = 52;

/// 默认棋盘边长
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// 压缩坐标分隔符（`"aa:cc"`）
pub const RANGE_SEPARATOR: char = ':';

/// 应用标识属性键
pub const IDENTITY_KEY: &str = "AP";

/// 写入根节点的默认应用标识
pub const APP_IDENTITY: &str = "Kosumi:0.1.0";

/// 棋谱文件格式版本
pub const RECORD_VERSION: &str = "1.0";

/// 可压缩属性（值可以是矩形坐标范围）
pub const COMPRESSIBLE_PROPERTIES: [&str; 12] = [
    "AB", "AE", "AW", "CR", "DD", "MA", "SL", "SQ", "TB", "TR", "TW", "VW",
];

/// 仅允许出现在根节点的属性
pub const ROOT_PROPERTIES: [&str; 6] = ["AP", "CA", "FF", "GM", "ST", "SZ"];
