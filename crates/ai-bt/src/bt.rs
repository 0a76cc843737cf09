use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle state shared by every node kind.
///
/// ```text
/// Inactive --start/selection--> Running --pause--> Paused --resume--> Running
/// Running --work completes--> Finished --reset--> Inactive
/// Running --preempt--> Inactive
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeState {
    #[default]
    Inactive,
    Running,
    Paused,
    Finished,
}

impl NodeState {
    pub fn is_running(self) -> bool {
        matches!(self, NodeState::Running)
    }

    /// Running or paused: the node currently sits on an active path.
    pub fn is_live(self) -> bool {
        matches!(self, NodeState::Running | NodeState::Paused)
    }
}

/// Generational index of a node inside a [`NodeArena`](crate::NodeArena).
///
/// Parent links and child lists store these plain indices; ownership lives with the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Handle to a tree owned by a [`BehaviorManager`](crate::BehaviorManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeHandle(pub(crate) NodeId);

impl TreeHandle {
    pub fn root(self) -> NodeId {
        self.0
    }
}

/// Debug class tag for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Priority,
    Random,
    Inverter,
    Timer,
    Leaf,
}

impl NodeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeClass::Priority => "PriorityNode",
            NodeClass::Random => "RandomNode",
            NodeClass::Inverter => "InverterNode",
            NodeClass::Timer => "TimerNode",
            NodeClass::Leaf => "LeafNode",
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(self, NodeClass::Priority | NodeClass::Random)
    }

    pub fn is_decorator(self) -> bool {
        matches!(self, NodeClass::Inverter | NodeClass::Timer)
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
