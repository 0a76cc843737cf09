use std::fmt;

use ai_core::ActionState;

use crate::arena::NodeArena;
use crate::bt::{NodeClass, NodeId, NodeState};
use crate::nodes::{Decorator, Node, NodeKind};
use crate::timer::TimerGate;

/// Read-only view of a live node, borrowed from its manager.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    arena: &'a NodeArena,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(arena: &'a NodeArena, id: NodeId) -> Self {
        Self { arena, id }
    }

    fn raw(&self) -> &'a Node {
        self.arena.node(self.id)
    }

    fn at(&self, id: NodeId) -> NodeRef<'a> {
        NodeRef::new(self.arena, id)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.raw().name
    }

    pub fn class(&self) -> NodeClass {
        self.raw().class()
    }

    pub fn state(&self) -> NodeState {
        self.raw().state
    }

    pub fn priority(&self) -> f32 {
        self.raw().priority
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.raw().parent.map(|id| self.at(id))
    }

    /// Index of this node within its parent's child list; 0 for a root.
    pub fn offset(&self) -> usize {
        self.raw().offset
    }

    pub fn child_count(&self) -> usize {
        self.raw().children.len()
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'a>> {
        self.raw().children.get(index).map(|&id| self.at(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let arena = self.arena;
        self.raw()
            .children
            .iter()
            .map(move |&id| NodeRef::new(arena, id))
    }

    /// The child on the active path, if one has been selected.
    pub fn active_child(&self) -> Option<NodeRef<'a>> {
        self.raw().active_child_id().map(|id| self.at(id))
    }

    /// The child with the `index`-th highest priority; ties keep declaration order.
    ///
    /// # Panics
    ///
    /// If `index` is not below [`child_count`](Self::child_count).
    pub fn child_by_priority_index(&self, index: usize) -> NodeRef<'a> {
        self.at(self.arena.child_by_priority_index(self.id, index))
    }

    /// Depth-first search of this subtree, this node included.
    pub fn node_by_name(&self, name: &str) -> Option<NodeRef<'a>> {
        if self.name() == name {
            return Some(*self);
        }
        self.children().find_map(|child| child.node_by_name(name))
    }

    /// Timer bookkeeping for timer decorators.
    pub fn timer(&self) -> Option<&'a TimerGate> {
        match &self.raw().kind {
            NodeKind::Decorator(Decorator::Timer(gate)) => Some(gate),
            _ => None,
        }
    }

    /// Name and state of the bound action, for leaves.
    pub fn action(&self) -> Option<(&'a str, ActionState)> {
        match &self.raw().kind {
            NodeKind::Leaf(action) => Some((action.name(), action.state())),
            _ => None,
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("class", &self.class())
            .field("state", &self.state())
            .field("priority", &self.priority())
            .finish()
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(name:{}, priority:{}",
            self.class(),
            self.name(),
            self.priority()
        )?;
        if let Some((action, _)) = self.action() {
            write!(f, ", action:{action}")?;
        }
        if let Some(gate) = self.timer() {
            write!(
                f,
                ", delay:{}, background:{}",
                gate.delay(),
                gate.is_background()
            )?;
        }
        if self.child_count() > 0 {
            f.write_str(", children[")?;
            for child in self.children() {
                write!(f, "{},", child.name())?;
            }
            f.write_str("]")?;
        }
        f.write_str(")")
    }
}
