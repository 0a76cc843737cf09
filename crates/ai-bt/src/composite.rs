//! Composite selection: priority and random choice among N children, with preemption.

use std::cmp::Ordering;

use ai_core::DeterministicRng;

use crate::arena::NodeArena;
use crate::bt::{NodeId, NodeState};
use crate::nodes::{Composite, NodeKind, SelectRule};
use crate::tick::TickContext;

/// Highest priority wins; the earliest declared child wins ties.
pub(crate) fn select_highest(priorities: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in priorities.iter().enumerate() {
        match best {
            Some((_, top)) if p <= top => {}
            _ => best = Some((i, p)),
        }
    }
    best.map(|(i, _)| i)
}

/// Priority-weighted draw. Zero-priority children are never chosen while any child is positive.
///
/// Falls back to a uniform draw when the weights sum to zero. If rounding lets the draw walk off
/// the end, the last positive child is chosen.
pub(crate) fn select_weighted(priorities: &[f32], rng: &mut dyn DeterministicRng) -> Option<usize> {
    if priorities.is_empty() {
        return None;
    }
    let sum: f32 = priorities.iter().sum();
    if sum <= 0.0 {
        return select_uniform(priorities.len(), rng);
    }
    let mut r = rng.next_f32_unit() * sum;
    for (i, &p) in priorities.iter().enumerate() {
        if r < p {
            return Some(i);
        }
        r -= p;
    }
    priorities.iter().rposition(|&p| p > 0.0)
}

pub(crate) fn select_uniform(len: usize, rng: &mut dyn DeterministicRng) -> Option<usize> {
    (len > 0).then(|| rng.next_index(len))
}

impl NodeArena {
    fn composite(&self, id: NodeId) -> &Composite {
        match &self.node(id).kind {
            NodeKind::Composite(composite) => composite,
            _ => unreachable!("node '{}' is not a composite", self.node(id).name),
        }
    }

    fn child_priorities(&self, id: NodeId) -> Vec<f32> {
        self.node(id)
            .children
            .iter()
            .map(|&child| self.node(child).priority)
            .collect()
    }

    /// Applies the composite's rule to the children's current priorities and returns the
    /// parental offset of the winner, or `None` for a childless composite.
    pub(crate) fn select_child(
        &self,
        id: NodeId,
        rng: &mut dyn DeterministicRng,
    ) -> Option<usize> {
        let priorities = self.child_priorities(id);
        let index = match self.composite(id).rule {
            SelectRule::Priority => select_highest(&priorities),
            SelectRule::Random { uniform: true } => select_uniform(priorities.len(), rng),
            SelectRule::Random { uniform: false } => select_weighted(&priorities, rng),
        }?;
        Some(self.node(self.node(id).children[index]).offset)
    }

    /// The child holding the `index`-th highest priority, ties in declaration order.
    pub(crate) fn child_by_priority_index(&self, id: NodeId, index: usize) -> NodeId {
        let node = self.node(id);
        assert!(
            index < node.children.len(),
            "priority index {index} out of bounds for node '{}'",
            node.name
        );
        let mut ordered = node.children.clone();
        ordered.sort_by(|&a, &b| {
            let (a, b) = (self.node(a), self.node(b));
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(Ordering::Equal)
                .then(a.offset.cmp(&b.offset))
        });
        ordered[index]
    }

    pub(crate) fn query_composite(&mut self, id: NodeId, ctx: &mut TickContext<'_>) {
        for i in 0..self.node(id).children.len() {
            let child = self.node(id).children[i];
            self.query(child, ctx);
        }

        let preemptive = self.composite(id).preemptive;
        let previous = self.node(id).active_child;
        if previous.is_none() || preemptive {
            if let Some(candidate) = self.select_child(id, &mut *ctx.rng) {
                if previous != Some(candidate) {
                    if let Some(old) = previous {
                        let old_id = self.node(id).children[old];
                        if self.node(old_id).state.is_live() {
                            tracing::trace!(
                                node = %self.node(id).name,
                                from = old,
                                to = candidate,
                                "preempting active child"
                            );
                            ctx.emit("bt.preempt", old_id.index() as u64, old as u64);
                            self.preempt(old_id);
                        }
                    }
                    ctx.emit("bt.select", id.index() as u64, candidate as u64);
                    self.node_mut(id).active_child = Some(candidate);
                }
            }
        }

        // Random nodes report the children's average even over a user prioritizer.
        let priority = match self.composite(id).rule {
            SelectRule::Priority => {
                let node = self.node(id);
                let active = node
                    .active_child_id()
                    .map_or(node.priority, |child| self.node(child).priority);
                node.prioritized(active)
            }
            SelectRule::Random { .. } => {
                let priorities = self.child_priorities(id);
                if priorities.is_empty() {
                    0.0
                } else {
                    priorities.iter().sum::<f32>() / priorities.len() as f32
                }
            }
        };
        self.node_mut(id).set_priority(priority);
    }

    pub(crate) fn update_composite(
        &mut self,
        id: NodeId,
        ctx: &mut TickContext<'_>,
    ) -> NodeState {
        let node = self.node(id);
        if node.state == NodeState::Running {
            if let Some(child) = node.active_child_id() {
                self.set_state(child, NodeState::Running);
                let state = self.update(child, ctx);
                self.set_state(id, state);
            }
        }
        self.node(id).state
    }
}
