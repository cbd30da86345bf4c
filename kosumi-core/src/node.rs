//! 棋谱树节点

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::Goban;

/// 节点属性表：属性键 -> 有序值列表
pub type Properties = BTreeMap<String, Vec<String>>;

/// 节点 ID（树内唯一，即节点在树中的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// 根节点 ID
    pub const ROOT: NodeId = NodeId(0);

    /// 节点下标
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 棋谱树节点
///
/// 父子关系只能通过 [`GameTree`](crate::GameTree) 建立：
/// 只有根节点没有父节点，只有叶子节点没有子节点。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameNode {
    pub(crate) id: NodeId,
    pub(crate) move_number: u32,
    pub(crate) props: Properties,
    pub(crate) state: Goban,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl GameNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// 手数
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// 属性表
    pub fn props(&self) -> &Properties {
        &self.props
    }

    /// 可变属性表
    pub fn props_mut(&mut self) -> &mut Properties {
        &mut self.props
    }

    /// 获取属性值
    pub fn property(&self, key: &str) -> Option<&[String]> {
        self.props.get(key).map(Vec::as_slice)
    }

    /// 设置属性值（覆盖原值）
    pub fn set_property(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.props.insert(key.into(), values);
    }

    /// 该节点的棋盘快照
    pub fn state(&self) -> &Goban {
        &self.state
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// 主分支上的下一个节点（第一个子节点）
    pub fn main_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
