//! 坐标表示法
//!
//! 每个坐标由两个字母表符号组成：第一个是列，第二个是行，
//! 符号在 `a..z A..Z` 中的序号即为下标（`"dd"` 即第 4 列第 4 行）。
//!
//! 压缩格式：`<角点1>:<角点2>` 表示以两个角点围成的矩形内全部坐标。

use serde::{Deserialize, Serialize};

use crate::constants::{COORDINATE_ALPHABET, RANGE_SEPARATOR};
use crate::error::CodecError;

/// 棋盘交叉点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    /// 列
    pub x: u8,
    /// 行
    pub y: u8,
}

impl Point {
    /// 创建新交叉点（不检查棋盘边界）
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// 从两符号坐标解析
    pub fn from_token(token: &str) -> Result<Self, CodecError> {
        let invalid = || CodecError::InvalidToken {
            token: token.to_string(),
        };

        let mut chars = token.chars();
        let (Some(col), Some(row), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };

        let x = Coord::symbol_index(col).ok_or_else(invalid)?;
        let y = Coord::symbol_index(row).ok_or_else(invalid)?;
        Ok(Self { x, y })
    }

    /// 转换为两符号坐标；超出字母表时返回 None
    pub fn to_token(&self) -> Option<String> {
        let col = Coord::symbol(self.x)?;
        let row = Coord::symbol(self.y)?;
        Some([col, row].iter().collect())
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(u8, u8)> for Point {
    fn from((x, y): (u8, u8)) -> Self {
        Self { x, y }
    }
}

/// 坐标编解码
pub struct Coord;

impl Coord {
    /// 符号在字母表中的序号
    pub fn symbol_index(c: char) -> Option<u8> {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        COORDINATE_ALPHABET.find(c).map(|i| i as u8)
    }

    /// 序号对应的符号
    pub fn symbol(index: u8) -> Option<char> {
        COORDINATE_ALPHABET.as_bytes().get(index as usize).map(|&b| b as char)
    }

    /// 值是否使用了压缩格式
    pub fn is_compressed(value: &str) -> bool {
        value.contains(RANGE_SEPARATOR)
    }

    /// 展开压缩坐标
    ///
    /// 按行优先顺序（先行后列，均从小到大）列出矩形内所有坐标，
    /// 角点顺序不影响结果。不含分隔符的值原样返回。
    pub fn decompress(token: &str) -> Result<Vec<String>, CodecError> {
        let Some((first, second)) = token.split_once(RANGE_SEPARATOR) else {
            return Ok(vec![token.to_string()]);
        };

        if first.is_empty() || second.is_empty() || second.contains(RANGE_SEPARATOR) {
            return Err(CodecError::MalformedRange {
                token: token.to_string(),
            });
        }

        let a = Point::from_token(first)?;
        let b = Point::from_token(second)?;
        let (x_min, x_max) = (a.x.min(b.x), a.x.max(b.x));
        let (y_min, y_max) = (a.y.min(b.y), a.y.max(b.y));

        let width = (x_max - x_min) as usize + 1;
        let height = (y_max - y_min) as usize + 1;
        let mut points = Vec::with_capacity(width * height);

        for y in y_min..=y_max {
            for x in x_min..=x_max {
                points.push(Self::token_unchecked(x, y));
            }
        }

        Ok(points)
    }

    /// 拼接坐标（调用方保证序号来自字母表）
    fn token_unchecked(x: u8, y: u8) -> String {
        let alphabet = COORDINATE_ALPHABET.as_bytes();
        let mut token = String::with_capacity(2);
        token.push(alphabet[x as usize] as char);
        token.push(alphabet[y as usize] as char);
        token
    }
}
