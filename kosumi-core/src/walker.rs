//! 棋谱浏览器
//!
//! 持有一棵棋谱树和一个游标（当前节点），提供相对移动、按手数查找、
//! 以及按棋盘坐标定位和修改的操作。
//!
//! 所有移动操作成功时返回新的当前节点，找不到目标时返回 None，
//! 游标保持不动。

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coord::Point;
use crate::error::{BoardError, Result, TreeError};
use crate::node::{GameNode, NodeId};
use crate::stone::Stone;
use crate::tree::GameTree;

/// 按坐标查找落子节点时向下搜索的范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchScope {
    /// 只沿主分支（第一个子节点）向下
    #[default]
    MainBranch,
    /// 先序遍历整个子树
    Subtree,
}

/// 浏览器配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerConfig {
    pub origin_scope: SearchScope,
}

/// 棋谱浏览器
pub struct StoneWalker {
    tree: GameTree,
    current: NodeId,
    config: WalkerConfig,
}

impl StoneWalker {
    /// 创建浏览器，游标位于根节点
    pub fn new(tree: GameTree) -> Self {
        Self::with_config(tree, WalkerConfig::default())
    }

    pub fn with_config(tree: GameTree, config: WalkerConfig) -> Self {
        let current = tree.root();
        Self {
            tree,
            current,
            config,
        }
    }

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    pub fn into_tree(self) -> GameTree {
        self.tree
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// 当前节点 ID
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// 当前节点
    pub fn current_node(&self) -> &GameNode {
        &self.tree[self.current]
    }

    /// 直接跳到指定节点
    pub fn jump_to(&mut self, id: NodeId) -> Option<NodeId> {
        let target = self.tree.node(id).map(GameNode::id);
        self.go(target)
    }

    fn go(&mut self, target: Option<NodeId>) -> Option<NodeId> {
        let id = target?;
        self.current = id;
        Some(id)
    }

    /// 移动到当前分支上指定手数的节点
    ///
    /// 已经在该手数时返回 None。
    pub fn move_to(&mut self, move_number: u32) -> Option<NodeId> {
        if self.current_node().move_number() == move_number {
            return None;
        }
        let target = self.tree.node_at_move(self.current, move_number);
        self.go(target)
    }

    /// 移动到父节点
    pub fn parent_node(&mut self) -> Option<NodeId> {
        let target = self.current_node().parent();
        self.go(target)
    }

    /// 移动到第一个子节点
    pub fn first_child(&mut self) -> Option<NodeId> {
        let target = self.current_node().children().first().copied();
        self.go(target)
    }

    /// 移动到最后一个子节点
    pub fn last_child(&mut self) -> Option<NodeId> {
        let target = self.current_node().children().last().copied();
        self.go(target)
    }

    /// 移动到前一个兄弟节点
    pub fn previous_sibling(&mut self) -> Option<NodeId> {
        let target = self.sibling_offset(-1);
        self.go(target)
    }

    /// 移动到后一个兄弟节点
    pub fn next_sibling(&mut self) -> Option<NodeId> {
        let target = self.sibling_offset(1);
        self.go(target)
    }

    /// 兄弟节点只按在父节点子节点列表中的位置排序
    fn sibling_offset(&self, offset: isize) -> Option<NodeId> {
        let parent = self.current_node().parent()?;
        let siblings = self.tree[parent].children();
        let index = siblings.iter().position(|&id| id == self.current)?;
        let target = index.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }

    /// 沿主分支移动到最后一个节点，当前节点是叶子时返回 None
    pub fn terminal_node(&mut self) -> Option<NodeId> {
        if self.current_node().is_leaf() {
            return None;
        }
        let target = self.tree.terminal_of(self.current);
        self.go(target)
    }

    /// 当前棋盘上某交叉点的值
    pub fn value_at_intersection(&self, point: Point) -> std::result::Result<Option<Stone>, BoardError> {
        self.current_node().state().get(point)
    }

    /// 当前棋盘上某交叉点是否有棋子
    pub fn intersection_is_occupied(&self, point: Point) -> std::result::Result<bool, BoardError> {
        self.current_node().state().is_occupied(point)
    }

    /// 找到当前分支上在 `point` 落子的节点，并把游标移过去
    pub fn get_node_at_coordinate(&mut self, point: Point) -> Option<NodeId> {
        let target = self.origin_of(self.current, point);
        self.go(target)
    }

    /// 从 `start` 开始查找在 `point` 落子的节点，游标不动
    pub fn reference_node_at_coordinate(&self, start: NodeId, point: Point) -> Option<NodeId> {
        self.origin_of(start, point)
    }

    /// 查找棋子的起源节点
    ///
    /// `start` 上有棋子时，沿父节点向上直到该点不再是同色棋子；
    /// 否则向下查找第一个在该点有棋子的节点。
    fn origin_of(&self, start: NodeId, point: Point) -> Option<NodeId> {
        let node = self.tree.node(start)?;

        if let Some(stone) = node.state().get(point).ok()? {
            let mut origin = node;
            while let Some(parent) = origin.parent() {
                let parent = &self.tree[parent];
                match parent.state().get(point) {
                    Ok(Some(s)) if s.color == stone.color => origin = parent,
                    _ => break,
                }
            }
            return Some(origin.id());
        }

        let candidates = match self.config.origin_scope {
            SearchScope::MainBranch => self.tree.main_branch(start),
            SearchScope::Subtree => self.tree.preorder(start),
        };
        candidates
            .into_iter()
            .skip(1)
            .find(|&id| matches!(self.tree[id].state().get(point), Ok(Some(_))))
    }

    /// 把 `origin` 上 `from` 的棋子移到 `to`
    ///
    /// 同一颗棋子仍留在 `from` 且 `to` 为空的后代节点一并修改。
    /// 不新建节点也不改变手数；前置条件不满足时不做任何修改。
    /// 返回被修改的节点数。
    pub fn edit_coordinate(&mut self, origin: NodeId, from: Point, to: Point) -> Result<usize> {
        let node = self.tree.node(origin).ok_or(TreeError::UnknownNode(origin))?;
        let stone = node.state().check_relocation(from, to)?;

        let mut targets = vec![origin];
        let mut stack = node.children().to_vec();
        while let Some(id) = stack.pop() {
            let child = &self.tree[id];
            let same_stone = matches!(child.state().get(from), Ok(Some(s)) if s.color == stone.color);
            if same_stone && matches!(child.state().get(to), Ok(None)) {
                targets.push(id);
                stack.extend(child.children().iter().copied());
            }
        }

        for &id in &targets {
            if let Some(state) = self.tree.state_mut(id) {
                state.relocate(from, to)?;
            }
        }

        debug!("棋子 {} -> {} 已修改, 起始节点 {}, 共 {} 个节点", from, to, origin, targets.len());
        Ok(targets.len())
    }
}
