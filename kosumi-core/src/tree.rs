//! 棋谱树
//!
//! 所有节点存放在一个数组中，父子关系用 [`NodeId`] 下标表示：
//! 父节点拥有子节点，子节点到父节点的引用只是一个下标。
//! 所有遍历都用循环或显式栈实现，树的深度不受调用栈限制。

use std::ops::Index;

use crate::board::Goban;
use crate::error::{Result, TreeError};
use crate::node::{GameNode, NodeId, Properties};

/// 棋谱树
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTree {
    nodes: Vec<GameNode>,
}

impl GameTree {
    /// 创建只有根节点的树（根节点手数为 0）
    pub fn new(props: Properties, state: Goban) -> Self {
        Self::with_root(0, props, state)
    }

    /// 以指定手数创建根节点
    pub fn with_root(move_number: u32, props: Properties, state: Goban) -> Self {
        Self {
            nodes: vec![GameNode {
                id: NodeId::ROOT,
                move_number,
                props,
                state,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// 添加子节点，追加到父节点子节点列表末尾
    ///
    /// 子节点手数不能小于父节点，棋盘尺寸必须与根节点一致。
    pub fn add_child(
        &mut self,
        parent: NodeId,
        move_number: u32,
        props: Properties,
        state: Goban,
    ) -> Result<NodeId> {
        let parent_move = self.node(parent).ok_or(TreeError::UnknownNode(parent))?.move_number;
        if move_number < parent_move {
            return Err(TreeError::MoveNumberRegression {
                parent: parent_move,
                child: move_number,
            });
        }

        let expected = self.nodes[NodeId::ROOT.0].state.dimensions();
        if state.dimensions() != expected {
            return Err(TreeError::BoardSizeMismatch {
                expected,
                actual: state.dimensions(),
            });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(GameNode {
            id,
            move_number,
            props,
            state,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// 根节点
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// 按 ID 查找节点
    pub fn node(&self, id: NodeId) -> Option<&GameNode> {
        self.nodes.get(id.0)
    }

    /// 按 ID 查找可变节点
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut GameNode> {
        self.nodes.get_mut(id.0)
    }

    /// 节点数量
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// 按创建顺序遍历所有节点
    pub fn iter(&self) -> impl Iterator<Item = &GameNode> {
        self.nodes.iter()
    }

    /// 根节点的棋盘尺寸
    pub fn board_dimensions(&self) -> (usize, usize) {
        self.nodes[NodeId::ROOT.0].state.dimensions()
    }

    pub(crate) fn state_mut(&mut self, id: NodeId) -> Option<&mut Goban> {
        self.nodes.get_mut(id.0).map(|node| &mut node.state)
    }

    /// 沿主分支（第一个子节点）一直向下，返回叶子节点
    pub fn terminal_of(&self, from: NodeId) -> Option<NodeId> {
        let mut current = self.node(from)?;
        while let Some(next) = current.main_child() {
            current = &self[next];
        }
        Some(current.id)
    }

    /// 从 `from` 出发查找手数为 `target` 的节点
    ///
    /// 目标手数更小时只沿父节点向上，更大时只沿主分支向下；
    /// 到达根/叶子或越过目标手数仍未命中则返回 None。
    pub fn node_at_move(&self, from: NodeId, target: u32) -> Option<NodeId> {
        let mut current = self.node(from)?;

        if target < current.move_number {
            while current.move_number > target {
                current = &self[current.parent?];
            }
        } else {
            while current.move_number < target {
                current = &self[current.main_child()?];
            }
        }

        (current.move_number == target).then_some(current.id)
    }

    /// 从 `from` 开始的主分支（含 `from`）
    pub fn main_branch(&self, from: NodeId) -> Vec<NodeId> {
        let mut branch = Vec::new();
        let mut next = self.node(from).map(|node| node.id);
        while let Some(id) = next {
            branch.push(id);
            next = self[id].main_child();
        }
        branch
    }

    /// 从根节点到 `to` 的路径（含两端）
    pub fn path_to(&self, to: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut next = self.node(to).map(|node| node.id);
        while let Some(id) = next {
            path.push(id);
            next = self[id].parent;
        }
        path.reverse();
        path
    }

    /// 以 `from` 为根的子树先序遍历（父节点在前，子节点按顺序）
    pub fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = Vec::new();
        if self.contains(from) {
            stack.push(from);
        }
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self[id].children.iter().rev().copied());
        }
        order
    }
}

impl Index<NodeId> for GameTree {
    type Output = GameNode;

    /// ID 只能由本树生成，越界说明使用了别的树的 ID
    fn index(&self, id: NodeId) -> &GameNode {
        &self.nodes[id.0]
    }
}
