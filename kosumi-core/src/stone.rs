//! 棋子定义

use serde::{Deserialize, Serialize};

/// 棋子颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// 黑方（先手）
    Black,
    /// 白方（后手）
    White,
}

impl Color {
    /// 落子属性键（`B` / `W`）
    pub fn move_key(&self) -> &'static str {
        match self {
            Color::Black => "B",
            Color::White => "W",
        }
    }
}

/// 棋盘上的一颗棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stone {
    pub color: Color,
    /// 是否为最新一手
    pub latest: bool,
}

impl Stone {
    /// 创建普通棋子
    pub fn new(color: Color) -> Self {
        Self {
            color,
            latest: false,
        }
    }

    /// 创建带最新一手标记的棋子
    pub fn latest(color: Color) -> Self {
        Self {
            color,
            latest: true,
        }
    }

    /// 行文本字符：`B`/`W`，最新一手为小写
    pub fn to_char(&self) -> char {
        let c = match self.color {
            Color::Black => 'B',
            Color::White => 'W',
        };
        if self.latest {
            c.to_ascii_lowercase()
        } else {
            c
        }
    }

    /// 从行文本字符解析
    pub fn from_char(c: char) -> Option<Stone> {
        let color = match c.to_ascii_uppercase() {
            'B' => Color::Black,
            'W' => Color::White,
            _ => return None,
        };
        Some(Stone {
            color,
            latest: c.is_ascii_lowercase(),
        })
    }

    /// 棋盘显示字符（`X` 黑 / `O` 白，最新一手小写）
    pub fn display_char(&self) -> char {
        match (self.color, self.latest) {
            (Color::Black, false) => 'X',
            (Color::Black, true) => 'x',
            (Color::White, false) => 'O',
            (Color::White, true) => 'o',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stone_char() {
        assert_eq!(Stone::new(Color::Black).to_char(), 'B');
        assert_eq!(Stone::latest(Color::White).to_char(), 'w');

        assert_eq!(Stone::from_char('W'), Some(Stone::new(Color::White)));
        assert_eq!(Stone::from_char('b'), Some(Stone::latest(Color::Black)));
        assert_eq!(Stone::from_char('.'), None);
    }

    #[test]
    fn test_display_char() {
        assert_eq!(Stone::new(Color::Black).display_char(), 'X');
        assert_eq!(Stone::latest(Color::White).display_char(), 'o');
    }

    #[test]
    fn test_move_key() {
        assert_eq!(Color::Black.move_key(), "B");
        assert_eq!(Color::White.move_key(), "W");
    }
}
