use crate::arena::NodeArena;
use crate::bt::{NodeId, NodeState};
use crate::nodes::{Decorator, NodeKind};
use crate::tick::TickContext;

/// Countdown state of a timer decorator.
///
/// In the foreground the wind-up runs each time the node enters `Running` and the child is held
/// back until it elapses. In the background the countdown is a cooldown armed by preemption, during
/// which the node reports priority 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerGate {
    pub(crate) delay: f32,
    pub(crate) timer: f32,
    pub(crate) delaying: bool,
    pub(crate) background: bool,
}

impl TimerGate {
    pub fn new(delay: f32, background: bool) -> Self {
        Self {
            delay,
            timer: 0.0,
            delaying: false,
            background,
        }
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Seconds accumulated toward the current delay.
    pub fn elapsed(&self) -> f32 {
        self.timer
    }

    pub fn is_delaying(&self) -> bool {
        self.delaying
    }

    pub fn is_background(&self) -> bool {
        self.background
    }

    /// Accumulates `dt`; once the delay is reached the countdown ends and the timer rewinds.
    pub(crate) fn advance(&mut self, dt: f32) {
        self.timer += dt;
        if self.timer >= self.delay {
            self.delaying = false;
            self.timer = 0.0;
        }
    }
}

impl NodeArena {
    fn gate_mut(&mut self, id: NodeId) -> &mut TimerGate {
        match &mut self.node_mut(id).kind {
            NodeKind::Decorator(Decorator::Timer(gate)) => gate,
            _ => unreachable!("node {id} is not a timer"),
        }
    }

    pub(crate) fn query_timer(&mut self, id: NodeId, ctx: &mut TickContext<'_>) {
        let gate = self.gate_mut(id);
        if gate.background && gate.delaying {
            gate.advance(ctx.dt);
            self.node_mut(id).priority = 0.0;
            return;
        }
        let child = self.node(id).children[0];
        self.query(child, ctx);
        let priority = self.node(child).priority;
        self.node_mut(id).set_priority(priority);
    }

    pub(crate) fn update_timer(&mut self, id: NodeId, ctx: &mut TickContext<'_>) -> NodeState {
        let gate = self.gate_mut(id);
        if !gate.background && gate.delaying {
            gate.advance(ctx.dt);
        }
        let delaying = self.gate_mut(id).delaying;
        if self.node(id).state == NodeState::Running && !delaying {
            self.activate_decorated(id);
            let child = self.node(id).children[0];
            let state = self.update(child, ctx);
            self.set_state(id, state);
        }
        self.node(id).state
    }
}
