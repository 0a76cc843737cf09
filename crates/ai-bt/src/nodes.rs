//! Node payloads and the shared query/update/lifecycle dispatch.
//!
//! Every node kind shares the fields of [`Node`]; kind-specific data lives in [`NodeKind`].
//! Algorithms are methods on [`NodeArena`] so recursion can walk child indices without holding
//! borrows across calls. Composite selection lives in `composite.rs`, timer gating in `timer.rs`.

use ai_core::{ActionState, BehaviorAction};

use crate::arena::NodeArena;
use crate::bt::{NodeClass, NodeId, NodeState};
use crate::registry::Prioritizer;
use crate::tick::TickContext;
use crate::timer::TimerGate;

pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) state: NodeState,
    pub(crate) priority: f32,
    pub(crate) prioritizer: Option<Prioritizer>,
    pub(crate) parent: Option<NodeId>,
    /// Index within the parent's child list.
    pub(crate) offset: usize,
    pub(crate) children: Vec<NodeId>,
    pub(crate) active_child: Option<usize>,
}

pub(crate) enum NodeKind {
    Leaf(BehaviorAction),
    Decorator(Decorator),
    Composite(Composite),
}

pub(crate) enum Decorator {
    Inverter,
    Timer(TimerGate),
}

pub(crate) struct Composite {
    pub(crate) preemptive: bool,
    pub(crate) rule: SelectRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectRule {
    /// Highest priority, earliest declaration on ties.
    Priority,
    /// Random draw, weighted by priority unless `uniform`.
    Random { uniform: bool },
}

impl Node {
    pub(crate) fn new(
        name: impl Into<String>,
        kind: NodeKind,
        prioritizer: Option<Prioritizer>,
        children: Vec<NodeId>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            state: NodeState::Inactive,
            priority: 0.0,
            prioritizer,
            parent: None,
            offset: 0,
            children,
            active_child: None,
        }
    }

    pub(crate) fn class(&self) -> NodeClass {
        match &self.kind {
            NodeKind::Leaf(_) => NodeClass::Leaf,
            NodeKind::Decorator(Decorator::Inverter) => NodeClass::Inverter,
            NodeKind::Decorator(Decorator::Timer(_)) => NodeClass::Timer,
            NodeKind::Composite(Composite {
                rule: SelectRule::Priority,
                ..
            }) => NodeClass::Priority,
            NodeKind::Composite(Composite {
                rule: SelectRule::Random { .. },
                ..
            }) => NodeClass::Random,
        }
    }

    pub(crate) fn set_priority(&mut self, priority: f32) {
        debug_assert!(
            (0.0..=1.0).contains(&priority),
            "priority {priority} of node '{}' is out of range",
            self.name
        );
        self.priority = priority;
    }

    /// The user prioritizer when present, else `default`. Leaves and priority composites only;
    /// decorators and random composites always derive their priority from their children.
    pub(crate) fn prioritized(&self, default: f32) -> f32 {
        self.prioritizer.as_ref().map_or(default, |p| p())
    }

    pub(crate) fn active_child_id(&self) -> Option<NodeId> {
        self.active_child.map(|i| self.children[i])
    }
}

/// Brings a bound action back to `Inactive` from whatever state it is in. Running work is
/// terminated rather than finished.
fn halt_action(action: &mut BehaviorAction) {
    match action.state() {
        ActionState::Inactive => {}
        ActionState::Running => action.terminate(),
        ActionState::Paused => {
            action.resume();
            action.terminate();
        }
        ActionState::Finished => action.reset(),
    }
}

impl NodeArena {
    /// Refreshes the priority of `id` and its descendants and lets composites pick their next
    /// child. Executes nothing.
    pub(crate) fn query(&mut self, id: NodeId, ctx: &mut TickContext<'_>) {
        match self.node(id).class() {
            NodeClass::Leaf => {
                let node = self.node_mut(id);
                let priority = node.prioritized(0.0);
                node.set_priority(priority);
            }
            NodeClass::Inverter => self.query_inverter(id, ctx),
            NodeClass::Timer => self.query_timer(id, ctx),
            NodeClass::Priority | NodeClass::Random => self.query_composite(id, ctx),
        }
    }

    /// Drives the active path below `id` and returns the resulting state of `id`.
    pub(crate) fn update(&mut self, id: NodeId, ctx: &mut TickContext<'_>) -> NodeState {
        match self.node(id).class() {
            NodeClass::Leaf => self.update_leaf(id, ctx),
            NodeClass::Inverter => self.update_decorator(id, ctx),
            NodeClass::Timer => self.update_timer(id, ctx),
            NodeClass::Priority | NodeClass::Random => self.update_composite(id, ctx),
        }
    }

    pub(crate) fn set_state(&mut self, id: NodeId, state: NodeState) {
        let node = self.node_mut(id);
        if node.state == state {
            return;
        }
        if let NodeKind::Decorator(Decorator::Timer(gate)) = &mut node.kind {
            if state == NodeState::Running {
                debug_assert!(
                    node.priority != 0.0,
                    "timer node '{}' cannot run with priority 0",
                    node.name
                );
                if node.state != NodeState::Paused && !gate.background {
                    gate.delaying = true;
                }
            }
        }
        node.state = state;
    }

    /// Fresh priorities, then `Running`. No action executes until the first update.
    pub(crate) fn start(&mut self, id: NodeId, ctx: &mut TickContext<'_>) {
        let dt = ctx.dt;
        ctx.dt = 0.0;
        self.query(id, ctx);
        ctx.dt = dt;
        self.set_state(id, NodeState::Running);
    }

    pub(crate) fn pause(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        assert!(
            node.state == NodeState::Running,
            "cannot pause node '{}' from {:?}",
            node.name,
            node.state
        );
        if let NodeKind::Leaf(action) = &mut node.kind {
            if action.state() == ActionState::Running {
                action.pause();
            }
        } else if let Some(child) = node.active_child_id() {
            if self.node(child).state == NodeState::Running {
                self.pause(child);
            }
        }
        self.set_state(id, NodeState::Paused);
    }

    pub(crate) fn resume(&mut self, id: NodeId) {
        let node = self.node(id);
        assert!(
            node.state == NodeState::Paused,
            "cannot resume node '{}' from {:?}",
            node.name,
            node.state
        );
        self.set_state(id, NodeState::Running);
        let node = self.node_mut(id);
        if let NodeKind::Leaf(action) = &mut node.kind {
            if action.state() == ActionState::Paused {
                action.resume();
            }
        } else if let Some(child) = node.active_child_id() {
            if self.node(child).state == NodeState::Paused {
                self.resume(child);
            }
        }
    }

    /// Cancels `id` after it lost selection. Running actions are terminated, never finished, and
    /// the node ends `Inactive`.
    pub(crate) fn preempt(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        match &mut node.kind {
            NodeKind::Leaf(action) => halt_action(action),
            NodeKind::Decorator(Decorator::Timer(gate)) if gate.background => {
                gate.delaying = true;
                node.priority = 0.0;
            }
            _ => {}
        }
        if let Some(child) = node.active_child.take().map(|i| node.children[i]) {
            if self.node(child).state != NodeState::Inactive {
                self.preempt(child);
            }
        }
        self.set_state(id, NodeState::Inactive);
    }

    /// Returns `id` and its subtree to `Inactive` with zero priority so it can run again.
    pub(crate) fn reset(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        match &mut node.kind {
            NodeKind::Leaf(action) => halt_action(action),
            NodeKind::Decorator(Decorator::Timer(gate)) => {
                gate.delaying = false;
                gate.timer = 0.0;
            }
            _ => {}
        }
        node.state = NodeState::Inactive;
        node.priority = 0.0;
        node.active_child = None;
        for i in 0..self.node(id).children.len() {
            let child = self.node(id).children[i];
            self.reset(child);
        }
    }

    fn update_leaf(&mut self, id: NodeId, ctx: &mut TickContext<'_>) -> NodeState {
        let node = self.node_mut(id);
        if node.state != NodeState::Running {
            return node.state;
        }
        let NodeKind::Leaf(action) = &mut node.kind else {
            unreachable!("update_leaf on a non-leaf node");
        };
        if action.state() == ActionState::Inactive {
            action.start();
            ctx.emit("bt.leaf.start", id.index as u64, 0);
        }
        match action.update(ctx.dt) {
            ActionState::Running => node.state = NodeState::Running,
            ActionState::Finished => {
                node.state = NodeState::Finished;
                ctx.emit("bt.leaf.finish", id.index as u64, 0);
                tracing::trace!(node = %node.name, "leaf finished");
            }
            _ => {}
        }
        node.state
    }

    fn query_inverter(&mut self, id: NodeId, ctx: &mut TickContext<'_>) {
        let child = self.node(id).children[0];
        self.query(child, ctx);
        let inverted = 1.0 - self.node(child).priority;
        self.node_mut(id).set_priority(inverted);
        self.activate_decorated(id);
    }

    /// A running decorator always forwards to its single child.
    pub(crate) fn activate_decorated(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        if node.state != NodeState::Running {
            return;
        }
        node.active_child = Some(0);
        let child = node.children[0];
        self.set_state(child, NodeState::Running);
    }

    fn update_decorator(&mut self, id: NodeId, ctx: &mut TickContext<'_>) -> NodeState {
        if self.node(id).state == NodeState::Running {
            self.activate_decorated(id);
            let child = self.node(id).children[0];
            let state = self.update(child, ctx);
            self.set_state(id, state);
        }
        self.node(id).state
    }
}
