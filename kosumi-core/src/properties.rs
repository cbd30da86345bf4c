//! 属性分类
//!
//! 两类固定属性集合：
//! - 可压缩属性：值可以用 `aa:cc` 表示一个矩形范围
//! - 根属性：只能出现在根节点

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::{COMPRESSIBLE_PROPERTIES, ROOT_PROPERTIES};

/// 属性分类规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRules {
    pub compressible: BTreeSet<String>,
    pub root_only: BTreeSet<String>,
}

impl PropertyRules {
    /// 空规则（不压缩、不限制）
    pub fn empty() -> Self {
        Self {
            compressible: BTreeSet::new(),
            root_only: BTreeSet::new(),
        }
    }

    /// 追加可压缩属性
    pub fn with_compressible<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compressible.extend(keys.into_iter().map(Into::into));
        self
    }

    /// 追加根属性
    pub fn with_root_only<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.root_only.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn is_compressible(&self, key: &str) -> bool {
        self.compressible.contains(key)
    }

    pub fn is_root_only(&self, key: &str) -> bool {
        self.root_only.contains(key)
    }
}

impl Default for PropertyRules {
    fn default() -> Self {
        Self::empty()
            .with_compressible(COMPRESSIBLE_PROPERTIES)
            .with_root_only(ROOT_PROPERTIES)
    }
}
