//! 棋谱树格式化
//!
//! 加载后对整棵树做一次先序遍历：
//! - 根节点写入应用标识
//! - 非根节点出现根属性时记录诊断（不中断）
//! - 展开所有可压缩属性中的坐标范围

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{APP_IDENTITY, IDENTITY_KEY};
use crate::coord::Coord;
use crate::error::{Result, TreeError};
use crate::node::{GameNode, NodeId};
use crate::properties::PropertyRules;
use crate::tree::GameTree;

/// 格式化配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// 应用标识属性键
    pub identity_key: String,
    /// 写入根节点的应用标识
    pub app_identity: String,
    pub rules: PropertyRules,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            identity_key: IDENTITY_KEY.to_string(),
            app_identity: APP_IDENTITY.to_string(),
            rules: PropertyRules::default(),
        }
    }
}

/// 非根节点上的根属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPropertyDefect {
    pub node: NodeId,
    pub key: String,
}

/// 格式化结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatReport {
    /// 访问的节点数
    pub nodes_visited: usize,
    /// 被展开的压缩值数量
    pub expanded: usize,
    /// 根属性诊断
    pub defects: Vec<RootPropertyDefect>,
}

/// 棋谱树格式化器
pub struct TreeFormatter {
    config: FormatterConfig,
}

impl TreeFormatter {
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// 格式化整棵树
    ///
    /// 坐标范围格式错误时立即返回错误；已处理的节点保持展开后的状态，
    /// 出错节点的属性不变。
    pub fn format(&self, tree: &mut GameTree) -> Result<FormatReport> {
        let mut report = FormatReport::default();

        for id in tree.preorder(tree.root()) {
            let Some(node) = tree.node_mut(id) else {
                continue;
            };
            report.nodes_visited += 1;

            if node.is_root() {
                node.set_property(
                    self.config.identity_key.clone(),
                    vec![self.config.app_identity.clone()],
                );
            } else {
                for key in node.props().keys() {
                    if self.config.rules.is_root_only(key) {
                        warn!("根属性 {} 出现在非根节点 {}", key, id);
                        report.defects.push(RootPropertyDefect {
                            node: id,
                            key: key.clone(),
                        });
                    }
                }
            }

            report.expanded += self.decompress(node)?;
        }

        debug!(
            "棋谱格式化完成: {} 个节点, 展开 {} 个压缩值, {} 个根属性错误",
            report.nodes_visited,
            report.expanded,
            report.defects.len()
        );
        Ok(report)
    }

    /// 展开单个节点的所有可压缩属性，返回被展开的值数量
    pub fn decompress(&self, node: &mut GameNode) -> Result<usize> {
        let mut expanded = 0;
        let mut updates = Vec::new();

        for (key, values) in node.props() {
            if !self.config.rules.is_compressible(key) || !values.iter().any(|v| Coord::is_compressed(v)) {
                continue;
            }

            let mut flattened = Vec::with_capacity(values.len());
            for value in values {
                if Coord::is_compressed(value) {
                    let points = Coord::decompress(value).map_err(|source| TreeError::Codec {
                        node: node.id(),
                        key: key.clone(),
                        source,
                    })?;
                    flattened.extend(points);
                    expanded += 1;
                } else {
                    flattened.push(value.clone());
                }
            }
            updates.push((key.clone(), flattened));
        }

        for (key, values) in updates {
            node.set_property(key, values);
        }
        Ok(expanded)
    }
}

impl Default for TreeFormatter {
    fn default() -> Self {
        Self::new(FormatterConfig::default())
    }
}
