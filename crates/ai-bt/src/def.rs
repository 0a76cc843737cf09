//! Declarative tree definitions.
//!
//! A [`BehaviorNodeDef`] is pure data: a node type, its parameters, string keys into a
//! [`BehaviorRegistry`](crate::BehaviorRegistry), and an ordered child list. The manager walks it
//! recursively to allocate a live tree.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::BehaviorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodeType {
    /// Composite: runs the highest priority child.
    Priority,
    /// Composite: alias for [`NodeType::Random`].
    Selector,
    /// Composite: picks a child at random, uniformly or weighted by priority.
    Random,
    /// Decorator: `1 - child priority`.
    Inverter,
    /// Decorator: foreground wind-up or background cooldown.
    Timer,
    #[default]
    Leaf,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Priority => "priority",
            NodeType::Selector => "selector",
            NodeType::Random => "random",
            NodeType::Inverter => "inverter",
            NodeType::Timer => "timer",
            NodeType::Leaf => "leaf",
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(self, NodeType::Priority | NodeType::Selector | NodeType::Random)
    }

    pub fn is_decorator(self) -> bool {
        matches!(self, NodeType::Inverter | NodeType::Timer)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = BehaviorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "priority" => Ok(NodeType::Priority),
            "selector" => Ok(NodeType::Selector),
            "random" => Ok(NodeType::Random),
            "inverter" => Ok(NodeType::Inverter),
            "timer" => Ok(NodeType::Timer),
            "leaf" => Ok(NodeType::Leaf),
            other => Err(BehaviorError::UnknownNodeType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BehaviorNodeDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub node_type: NodeType,
    /// Key into the registry's prioritizers. Mandatory for leaves.
    pub prioritizer: Option<String>,
    /// Composites only: re-select every tick, preempting the running child.
    pub preemptive: bool,
    /// Timers only: cooldown after losing selection instead of wind-up before running.
    pub background: bool,
    /// Random nodes only: ignore child priorities when drawing.
    pub uniform: bool,
    /// Timers only, in seconds.
    pub delay: f32,
    /// Key into the registry's actions. Leaves only.
    pub action: Option<String>,
    pub children: Vec<BehaviorNodeDef>,
}

impl Default for BehaviorNodeDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            node_type: NodeType::Leaf,
            prioritizer: None,
            preemptive: false,
            background: false,
            uniform: true,
            delay: 1.0,
            action: None,
            children: Vec::new(),
        }
    }
}

impl BehaviorNodeDef {
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            ..Self::default()
        }
    }

    pub fn leaf(
        name: impl Into<String>,
        prioritizer: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self::new(name, NodeType::Leaf)
            .with_prioritizer(prioritizer)
            .with_action(action)
    }

    pub fn priority(name: impl Into<String>, children: Vec<BehaviorNodeDef>) -> Self {
        Self::new(name, NodeType::Priority).with_children(children)
    }

    pub fn random(name: impl Into<String>, uniform: bool, children: Vec<BehaviorNodeDef>) -> Self {
        let mut def = Self::new(name, NodeType::Random).with_children(children);
        def.uniform = uniform;
        def
    }

    pub fn inverter(name: impl Into<String>, child: BehaviorNodeDef) -> Self {
        Self::new(name, NodeType::Inverter).with_children(vec![child])
    }

    pub fn timer(
        name: impl Into<String>,
        delay: f32,
        background: bool,
        child: BehaviorNodeDef,
    ) -> Self {
        let mut def = Self::new(name, NodeType::Timer).with_children(vec![child]);
        def.delay = delay;
        def.background = background;
        def
    }

    pub fn with_prioritizer(mut self, key: impl Into<String>) -> Self {
        self.prioritizer = Some(key.into());
        self
    }

    pub fn with_action(mut self, key: impl Into<String>) -> Self {
        self.action = Some(key.into());
        self
    }

    pub fn with_children(mut self, children: Vec<BehaviorNodeDef>) -> Self {
        self.children = children;
        self
    }

    pub fn preemptive(mut self, preemptive: bool) -> Self {
        self.preemptive = preemptive;
        self
    }

    /// Depth-first search for the first definition named `name`, this one included.
    pub fn node_by_name(&self, name: &str) -> Option<&BehaviorNodeDef> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.node_by_name(name))
    }

    /// Number of definitions in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_types_parse_from_their_keys() {
        for ty in [
            NodeType::Priority,
            NodeType::Selector,
            NodeType::Random,
            NodeType::Inverter,
            NodeType::Timer,
            NodeType::Leaf,
        ] {
            assert_eq!(ty.as_str().parse::<NodeType>(), Ok(ty));
        }
        assert_eq!(
            "sequence".parse::<NodeType>(),
            Err(BehaviorError::UnknownNodeType("sequence".into()))
        );
    }

    #[test]
    fn defaults_match_the_schema() {
        let def = BehaviorNodeDef::default();
        assert!(!def.preemptive);
        assert!(!def.background);
        assert!(def.uniform);
        assert_eq!(def.delay, 1.0);
    }

    #[test]
    fn node_by_name_searches_depth_first() {
        let tree = BehaviorNodeDef::priority(
            "root",
            vec![
                BehaviorNodeDef::inverter("inv", BehaviorNodeDef::leaf("deep", "p", "a")),
                BehaviorNodeDef::leaf("shallow", "p", "a"),
            ],
        );
        assert_eq!(tree.node_by_name("deep").map(|d| d.node_type), Some(NodeType::Leaf));
        assert_eq!(tree.node_by_name("root").map(|d| d.children.len()), Some(2));
        assert!(tree.node_by_name("missing").is_none());
        assert_eq!(tree.node_count(), 4);
    }
}
