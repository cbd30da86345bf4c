//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE};
use crate::coord::{Coord, Point};
use crate::error::BoardError;
use crate::stone::Stone;

/// 棋盘
///
/// 序列化为行文本列表：`.` 空点，`B`/`W` 棋子，小写为最新一手。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Goban {
    columns: usize,
    rows: usize,
    /// 索引为 y * columns + x
    squares: Vec<Option<Stone>>,
}

impl Goban {
    /// 创建空棋盘
    pub fn empty(columns: usize, rows: usize) -> Result<Self, BoardError> {
        if columns == 0 || rows == 0 || columns > MAX_BOARD_SIZE || rows > MAX_BOARD_SIZE {
            return Err(BoardError::InvalidSize {
                columns,
                rows,
                max: MAX_BOARD_SIZE,
            });
        }
        Ok(Self {
            columns,
            rows,
            squares: vec![None; columns * rows],
        })
    }

    /// 创建正方形空棋盘
    pub fn square(size: usize) -> Result<Self, BoardError> {
        Self::empty(size, size)
    }

    /// 从行文本创建
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, BoardError> {
        let columns = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        let mut board = Self::empty(columns, rows.len())?;
        let mut latest_seen = false;

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let len = row.chars().count();
            if len != columns {
                return Err(BoardError::RaggedRow {
                    row: y,
                    len,
                    expected: columns,
                });
            }

            for (x, c) in row.chars().enumerate() {
                let stone = match c {
                    '.' => None,
                    c => Some(Stone::from_char(c).ok_or(BoardError::InvalidRow { row: y, ch: c })?),
                };
                if let Some(stone) = stone {
                    if stone.latest {
                        if latest_seen {
                            return Err(BoardError::MultipleLatest);
                        }
                        latest_seen = true;
                    }
                }
                board.squares[y * columns + x] = stone;
            }
        }

        Ok(board)
    }

    /// 转换为行文本
    pub fn to_rows(&self) -> Vec<String> {
        self.squares
            .chunks(self.columns)
            .map(|row| {
                row.iter()
                    .map(|square| square.map(|s| s.to_char()).unwrap_or('.'))
                    .collect()
            })
            .collect()
    }

    /// 列数
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// 行数
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// (列数, 行数)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    /// 检查交叉点是否在棋盘内
    pub fn contains(&self, point: Point) -> bool {
        (point.x as usize) < self.columns && (point.y as usize) < self.rows
    }

    fn index(&self, point: Point) -> Result<usize, BoardError> {
        if self.contains(point) {
            Ok(point.y as usize * self.columns + point.x as usize)
        } else {
            Err(BoardError::OutOfRange {
                x: point.x as usize,
                y: point.y as usize,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    /// 获取指定交叉点的棋子
    pub fn get(&self, point: Point) -> Result<Option<Stone>, BoardError> {
        let index = self.index(point)?;
        Ok(self.squares[index])
    }

    /// 只供 `relocate` 使用，保证最新一手标记唯一
    fn set(&mut self, point: Point, stone: Option<Stone>) -> Result<(), BoardError> {
        let index = self.index(point)?;
        self.squares[index] = stone;
        Ok(())
    }

    /// 交叉点上是否有棋子
    pub fn is_occupied(&self, point: Point) -> Result<bool, BoardError> {
        Ok(self.get(point)?.is_some())
    }

    /// 检查能否把 `from` 的棋子移到 `to`，返回要移动的棋子
    pub fn check_relocation(&self, from: Point, to: Point) -> Result<Stone, BoardError> {
        let stone = self.get(from)?.ok_or(BoardError::Unoccupied {
            x: from.x as usize,
            y: from.y as usize,
        })?;
        if self.is_occupied(to)? {
            return Err(BoardError::Occupied {
                x: to.x as usize,
                y: to.y as usize,
            });
        }
        Ok(stone)
    }

    /// 移动棋子（不检查规则），失败时棋盘不变
    pub fn relocate(&mut self, from: Point, to: Point) -> Result<Stone, BoardError> {
        let stone = self.check_relocation(from, to)?;
        self.set(from, None)?;
        self.set(to, Some(stone))?;
        Ok(stone)
    }

    /// 获取所有棋子
    pub fn stones(&self) -> Vec<(Point, Stone)> {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(index, square)| {
                square.map(|stone| {
                    let point = Point::new((index % self.columns) as u8, (index / self.columns) as u8);
                    (point, stone)
                })
            })
            .collect()
    }

    /// 最新一手的位置
    pub fn latest(&self) -> Option<Point> {
        self.stones()
            .into_iter()
            .find(|(_, stone)| stone.latest)
            .map(|(point, _)| point)
    }

    /// 星位
    pub fn star_points(&self) -> Vec<Point> {
        fn grid(lines: &[u8]) -> Vec<Point> {
            let mut points = Vec::with_capacity(lines.len() * lines.len());
            for &x in lines {
                for &y in lines {
                    points.push(Point::new(x, y));
                }
            }
            points
        }

        match (self.columns, self.rows) {
            (19, 19) => grid(&[3, 9, 15]),
            (13, 13) => grid(&[3, 6, 9]),
            (9, 9) => vec![
                Point::new(2, 2),
                Point::new(2, 6),
                Point::new(4, 4),
                Point::new(6, 2),
                Point::new(6, 6),
            ],
            (c, r) if c % 2 == 1 && r % 2 == 1 => {
                vec![Point::new((c / 2) as u8, (r / 2) as u8)]
            }
            _ => Vec::new(),
        }
    }

    /// 生成带坐标的文本棋盘
    pub fn to_text(&self) -> String {
        let stars = self.star_points();
        let label = |i: usize| Coord::symbol(i as u8).unwrap_or('?');

        let header: String = (0..self.columns).flat_map(|x| [' ', label(x)]).collect();
        let mut output = String::new();
        output.push(' ');
        output.push_str(&header);
        output.push('\n');

        for y in 0..self.rows {
            output.push(label(y));
            for x in 0..self.columns {
                let point = Point::new(x as u8, y as u8);
                let c = match self.squares[y * self.columns + x] {
                    Some(stone) => stone.display_char(),
                    None if stars.contains(&point) => '+',
                    None => '.',
                };
                output.push(' ');
                output.push(c);
            }
            output.push(' ');
            output.push(label(y));
            output.push('\n');
        }

        output.push(' ');
        output.push_str(&header);
        output.push('\n');
        output
    }
}

impl Default for Goban {
    fn default() -> Self {
        Self {
            columns: DEFAULT_BOARD_SIZE,
            rows: DEFAULT_BOARD_SIZE,
            squares: vec![None; DEFAULT_BOARD_SIZE * DEFAULT_BOARD_SIZE],
        }
    }
}

impl TryFrom<Vec<String>> for Goban {
    type Error = BoardError;

    fn try_from(rows: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_rows(rows.as_slice())
    }
}

impl From<Goban> for Vec<String> {
    fn from(board: Goban) -> Self {
        board.to_rows()
    }
}
