//! 棋谱记录格式
//!
//! 棋谱树以 JSON 保存。节点按先序展平，子节点通过 `parent` 下标指向
//! 前面的父节点，因此很深的棋谱也不会触发 JSON 的嵌套层数限制。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::Goban;
use crate::constants::RECORD_VERSION;
use crate::error::{Result, TreeError};
use crate::node::{NodeId, Properties};
use crate::stone::Color;
use crate::tree::GameTree;

/// 对局元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// 棋谱名称
    pub name: String,
    /// 黑方玩家名（PB）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_player: Option<String>,
    /// 白方玩家名（PW）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_player: Option<String>,
    /// 对局日期
    pub date: String,
    /// 保存时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

/// 节点记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    /// 父节点在记录中的下标，根节点为空
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    pub move_number: u32,
    #[serde(default)]
    pub props: Properties,
    pub state: Goban,
}

/// 完整的棋谱记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    /// 版本号
    pub version: String,
    /// 元数据
    pub metadata: SessionMetadata,
    /// 节点列表（父节点总在子节点之前）
    pub nodes: Vec<NodeRecord>,
}

impl GameRecord {
    /// 从棋谱树创建记录
    pub fn from_tree(name: impl Into<String>, tree: &GameTree) -> Self {
        let root = &tree[tree.root()];
        let first_value = |key: &str| root.property(key).and_then(|v| v.first()).cloned();

        let order = tree.preorder(tree.root());
        let mut positions = vec![0usize; tree.len()];
        for (index, id) in order.iter().enumerate() {
            positions[id.index()] = index;
        }

        let nodes = order
            .iter()
            .map(|&id| {
                let node = &tree[id];
                NodeRecord {
                    parent: node.parent().map(|p| positions[p.index()]),
                    move_number: node.move_number(),
                    props: node.props().clone(),
                    state: node.state().clone(),
                }
            })
            .collect();

        Self {
            version: RECORD_VERSION.to_string(),
            metadata: SessionMetadata {
                name: name.into(),
                black_player: first_value("PB"),
                white_player: first_value("PW"),
                date: first_value("DT").unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
                saved_at: None,
            },
            nodes,
        }
    }

    /// 重建棋谱树
    ///
    /// 通过 [`GameTree::add_child`] 逐个添加节点，树的结构约束会被重新检查。
    pub fn into_tree(self) -> Result<GameTree> {
        let mut records = self.nodes.into_iter().enumerate();
        let Some((_, root)) = records.next() else {
            return Err(TreeError::EmptyRecord);
        };
        if let Some(parent) = root.parent {
            return Err(TreeError::InvalidParent { index: 0, parent });
        }

        let mut tree = GameTree::with_root(root.move_number, root.props, root.state);
        let mut ids: Vec<NodeId> = vec![tree.root()];

        for (index, record) in records {
            let parent = record.parent.ok_or(TreeError::ExtraRoot { index })?;
            let parent_id = *ids
                .get(parent)
                .ok_or(TreeError::InvalidParent { index, parent })?;
            let id = tree.add_child(parent_id, record.move_number, record.props, record.state)?;
            ids.push(id);
        }

        Ok(tree)
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 主分支的文本摘要
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("棋谱: {}\n", self.metadata.name));
        if let Some(ref black) = self.metadata.black_player {
            output.push_str(&format!("黑方: {}\n", black));
        }
        if let Some(ref white) = self.metadata.white_player {
            output.push_str(&format!("白方: {}\n", white));
        }
        output.push_str(&format!("日期: {}\n", self.metadata.date));

        // 父节点必须在子节点之前，否则忽略该链接
        let mut first_child: Vec<Option<usize>> = vec![None; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent.filter(|&p| p < index) {
                first_child[parent].get_or_insert(index);
            }
        }

        let mut moves = Vec::new();
        let mut next = (!self.nodes.is_empty()).then_some(0);
        while let Some(index) = next {
            let node = &self.nodes[index];
            for key in [Color::Black, Color::White].map(|c| c.move_key()) {
                if let Some(point) = node.props.get(key).and_then(|v| v.first()) {
                    let point = if point.is_empty() { "pass" } else { point.as_str() };
                    moves.push(format!("{}. {}[{}]", node.move_number, key, point));
                }
            }
            next = first_child[index];
        }

        if !moves.is_empty() {
            output.push_str("\n主分支：\n");
            for line in moves.chunks(2) {
                output.push_str(&line.join("  "));
                output.push('\n');
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Point;
    use crate::formatter::TreeFormatter;
    use crate::stone::Stone;

    fn props(entries: &[(&str, &str)]) -> Properties {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
            .collect()
    }

    fn sample() -> GameTree {
        let mut tree = GameTree::new(
            props(&[("PB", "黑方棋手"), ("PW", "白方棋手"), ("DT", "2026-10-17"), ("SZ", "5")]),
            Goban::square(5).unwrap(),
        );
        let root = tree.root();
        let b = Goban::from_rows(&["..b..", ".....", ".....", ".....", "....."]).unwrap();
        let w = Goban::from_rows(&["..B..", "...w.", ".....", ".....", "....."]).unwrap();
        let alt = Goban::from_rows(&["..B..", ".....", "....w", ".....", "....."]).unwrap();
        let n1 = tree.add_child(root, 1, props(&[("B", "ca")]), b).unwrap();
        tree.add_child(n1, 2, props(&[("W", "db")]), w).unwrap();
        tree.add_child(n1, 2, props(&[("W", "ec")]), alt).unwrap();
        tree
    }

    #[test]
    fn test_record_json() {
        let tree = sample();
        let record = GameRecord::from_tree("测试棋谱", &tree);
        assert_eq!(record.metadata.black_player.as_deref(), Some("黑方棋手"));
        assert_eq!(record.metadata.date, "2026-10-17");
        assert_eq!(record.nodes.len(), 4);
        assert_eq!(record.nodes[3].parent, Some(1));

        let json = record.to_json().unwrap();
        let parsed = GameRecord::from_json(&json).unwrap();
        let rebuilt = parsed.into_tree().unwrap();
        assert_eq!(rebuilt, tree);
        assert_eq!(
            rebuilt[NodeId(2)].state().get(Point::new(3, 1)).unwrap(),
            Some(Stone::latest(Color::White))
        );
    }

    #[test]
    fn test_invalid_records() {
        let tree = sample();

        let mut record = GameRecord::from_tree("x", &tree);
        record.nodes.clear();
        assert!(matches!(record.into_tree(), Err(TreeError::EmptyRecord)));

        let mut record = GameRecord::from_tree("x", &tree);
        record.nodes[2].parent = None;
        assert!(matches!(record.into_tree(), Err(TreeError::ExtraRoot { index: 2 })));

        // 父节点必须出现在子节点之前
        let mut record = GameRecord::from_tree("x", &tree);
        record.nodes[1].parent = Some(3);
        assert!(matches!(
            record.into_tree(),
            Err(TreeError::InvalidParent { index: 1, parent: 3 })
        ));

        let mut record = GameRecord::from_tree("x", &tree);
        record.nodes[2].move_number = 0;
        assert!(matches!(
            record.into_tree(),
            Err(TreeError::MoveNumberRegression { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(GameRecord::from_json("{"), Err(TreeError::Json(_))));

        // 棋盘行长度不一致
        let json = r#"{
            "version": "1.0",
            "metadata": { "name": "x", "date": "2026-01-01" },
            "nodes": [ { "move_number": 0, "state": ["..", "."] } ]
        }"#;
        assert!(GameRecord::from_json(json).is_err());
    }

    #[test]
    fn test_text_summary_ignores_bad_parents() {
        // 根节点指向自己，第二个节点指向后面的节点
        let json = r#"{
            "version": "1.0",
            "metadata": { "name": "坏链接", "date": "2026-01-01" },
            "nodes": [
                { "parent": 0, "move_number": 0, "props": { "B": ["aa"] }, "state": ["."] },
                { "parent": 2, "move_number": 1, "props": { "W": ["aa"] }, "state": ["."] },
                { "parent": 1, "move_number": 2, "props": { "B": ["aa"] }, "state": ["."] }
            ]
        }"#;
        let record = GameRecord::from_json(json).unwrap();
        let text = record.to_text();

        assert!(text.contains("0. B[aa]"));
        assert!(!text.contains("W[aa]"));
        assert!(matches!(record.into_tree(), Err(TreeError::InvalidParent { index: 0, parent: 0 })));
    }

    #[test]
    fn test_record_then_format() {
        let json = r#"{
            "version": "1.0",
            "metadata": { "name": "让子棋", "date": "2026-01-01" },
            "nodes": [
                { "move_number": 0, "props": { "AB": ["aa:bb"], "SZ": ["3"] }, "state": ["BB.", "BB.", "..."] },
                { "parent": 0, "move_number": 1, "props": { "W": ["cc"] }, "state": ["BB.", "BB.", "..w"] }
            ]
        }"#;
        let mut tree = GameRecord::from_json(json).unwrap().into_tree().unwrap();
        let report = TreeFormatter::default().format(&mut tree).unwrap();

        assert_eq!(report.expanded, 1);
        assert_eq!(tree[tree.root()].property("AB").unwrap().len(), 4);
    }

    #[test]
    fn test_text_summary() {
        let record = GameRecord::from_tree("测试棋谱", &sample());
        let text = record.to_text();

        assert!(text.contains("棋谱: 测试棋谱"));
        assert!(text.contains("黑方: 黑方棋手"));
        assert!(text.contains("1. B[ca]  2. W[db]"));
        // 变化分支不出现在摘要中
        assert!(!text.contains("W[ec]"));
    }
}
