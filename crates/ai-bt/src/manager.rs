//! Tree ownership and the per-tick driver.

use std::time::{SystemTime, UNIX_EPOCH};

use ai_core::{BehaviorAction, DeterministicRng, SplitMix64};
use ai_tools::{TraceEvent, TraceLog, TraceSink, Tracer};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arena::NodeArena;
use crate::bt::{NodeId, NodeState, TreeHandle};
use crate::def::{BehaviorNodeDef, NodeType};
use crate::error::{BehaviorError, Result};
use crate::nodes::{Composite, Decorator, Node, NodeKind, SelectRule};
use crate::registry::{BehaviorRegistry, Prioritizer};
use crate::tick::TickContext;
use crate::timer::TimerGate;
use crate::view::NodeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManagerConfig {
    /// Seed for the random source shared by every random composite.
    pub seed: u64,
    /// Keep every trace event in an in-memory [`TraceLog`].
    pub record_trace: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED_B7EE,
            record_trace: false,
        }
    }
}

impl ManagerConfig {
    /// Seeds from the wall clock. Runs are not reproducible.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn recording(mut self, record_trace: bool) -> Self {
        self.record_trace = record_trace;
        self
    }
}

struct TreeEntry {
    handle: TreeHandle,
    name: Option<String>,
    /// Started and not yet finished or stopped.
    active: bool,
}

/// Owns every node and action, builds trees from definitions, and drives the active ones.
///
/// Trees are kept in creation order and [`update`](Self::update) visits them in that order, so a
/// fixed seed replays identically.
pub struct BehaviorManager {
    config: ManagerConfig,
    arena: NodeArena,
    trees: Vec<TreeEntry>,
    rng: Box<dyn DeterministicRng>,
    tracer: Tracer,
    tick: u64,
}

impl Default for BehaviorManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorManager {
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self::with_rng(config, Box::new(SplitMix64::new(config.seed)))
    }

    /// Uses `rng` in place of a `SplitMix64` seeded from `config.seed`.
    pub fn with_rng(config: ManagerConfig, rng: Box<dyn DeterministicRng>) -> Self {
        Self {
            config,
            arena: NodeArena::new(),
            trees: Vec::new(),
            rng,
            tracer: Tracer::new(config.record_trace),
            tick: 0,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Number of manager updates so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Live nodes across all trees.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn trace_log(&self) -> Option<&TraceLog> {
        self.tracer.log()
    }

    pub fn clear_trace(&mut self) {
        if let Some(log) = self.tracer.log_mut() {
            log.clear();
        }
    }

    /// Streams trace events into `sink` as well as the log. Returns the previous sink.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) -> Option<Box<dyn TraceSink>> {
        self.tracer.set_sink(sink)
    }

    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.tracer.take_sink()
    }

    // ------------------------------------------------------------------------------------------
    // Construction

    /// Allocates an anonymous tree for `def`, resolving keys through `registry`.
    ///
    /// On error nothing stays allocated.
    pub fn create_tree(
        &mut self,
        def: &BehaviorNodeDef,
        registry: &BehaviorRegistry,
    ) -> Result<TreeHandle> {
        let handle = self.build_tree(def, registry)?;
        self.trees.push(TreeEntry {
            handle,
            name: None,
            active: false,
        });
        Ok(handle)
    }

    /// Like [`create_tree`](Self::create_tree), registering the tree under a unique `name`.
    pub fn add_tree(
        &mut self,
        name: impl Into<String>,
        def: &BehaviorNodeDef,
        registry: &BehaviorRegistry,
    ) -> Result<TreeHandle> {
        let name = name.into();
        if self.contains_tree(&name) {
            tracing::warn!(tree = %name, "tree name already in use");
            return Err(BehaviorError::DuplicateTree(name));
        }
        let handle = self.build_tree(def, registry)?;
        self.trees.push(TreeEntry {
            handle,
            name: Some(name),
            active: false,
        });
        Ok(handle)
    }

    pub fn contains_tree(&self, name: &str) -> bool {
        self.tree(name).is_some()
    }

    pub fn tree(&self, name: &str) -> Option<TreeHandle> {
        self.trees
            .iter()
            .find(|entry| entry.name.as_deref() == Some(name))
            .map(|entry| entry.handle)
    }

    pub fn handles(&self) -> impl Iterator<Item = TreeHandle> + '_ {
        self.trees.iter().map(|entry| entry.handle)
    }

    fn build_tree(&mut self, def: &BehaviorNodeDef, registry: &BehaviorRegistry) -> Result<TreeHandle> {
        match self.build_node(def, registry) {
            Ok(root) => {
                tracing::debug!(
                    root = %def.name,
                    nodes = def.node_count(),
                    "behavior tree created"
                );
                Ok(TreeHandle(root))
            }
            Err(err) => {
                tracing::warn!(root = %def.name, error = %err, "behavior tree rejected");
                Err(err)
            }
        }
    }

    /// Children first, then the parent. Already built siblings are released on failure.
    fn build_node(&mut self, def: &BehaviorNodeDef, registry: &BehaviorRegistry) -> Result<NodeId> {
        let found = def.children.len();
        let expected = match def.node_type {
            NodeType::Leaf if found != 0 => Some("no"),
            NodeType::Inverter | NodeType::Timer if found != 1 => Some("exactly 1"),
            _ => None,
        };
        if let Some(expected) = expected {
            return Err(BehaviorError::ChildCount {
                node: def.name.clone(),
                kind: def.node_type,
                expected,
                found,
            });
        }

        let prioritizer = match &def.prioritizer {
            Some(key) => Some(resolve_prioritizer(registry, def, key)?),
            None if def.node_type == NodeType::Leaf => {
                return Err(BehaviorError::MissingPrioritizer(def.name.clone()));
            }
            None => None,
        };

        let kind = match def.node_type {
            NodeType::Leaf => {
                let key = def
                    .action
                    .as_deref()
                    .ok_or_else(|| BehaviorError::MissingAction(def.name.clone()))?;
                let action = registry.action(key).ok_or_else(|| BehaviorError::UnknownAction {
                    node: def.name.clone(),
                    key: key.to_string(),
                })?;
                NodeKind::Leaf(BehaviorAction::new(action))
            }
            NodeType::Inverter => NodeKind::Decorator(Decorator::Inverter),
            NodeType::Timer => NodeKind::Decorator(Decorator::Timer(TimerGate::new(
                def.delay,
                def.background,
            ))),
            NodeType::Priority => NodeKind::Composite(Composite {
                preemptive: def.preemptive,
                rule: SelectRule::Priority,
            }),
            NodeType::Selector | NodeType::Random => NodeKind::Composite(Composite {
                preemptive: def.preemptive,
                rule: SelectRule::Random {
                    uniform: def.uniform,
                },
            }),
        };

        let mut children = Vec::with_capacity(def.children.len());
        for child in &def.children {
            match self.build_node(child, registry) {
                Ok(id) => children.push(id),
                Err(err) => {
                    for id in children {
                        self.arena.remove_subtree(id);
                    }
                    return Err(err);
                }
            }
        }

        let id = self
            .arena
            .insert(Node::new(def.name.clone(), kind, prioritizer, children));
        for offset in 0..self.arena.node(id).children.len() {
            let child = self.arena.node(id).children[offset];
            let node = self.arena.node_mut(child);
            node.parent = Some(id);
            node.offset = offset;
        }
        Ok(id)
    }

    // ------------------------------------------------------------------------------------------
    // Lifecycle

    fn entry(&self, handle: TreeHandle) -> &TreeEntry {
        self.trees
            .iter()
            .find(|entry| entry.handle == handle)
            .unwrap_or_else(|| panic!("unknown behavior tree {handle:?}"))
    }

    fn entry_mut(&mut self, handle: TreeHandle) -> &mut TreeEntry {
        self.trees
            .iter_mut()
            .find(|entry| entry.handle == handle)
            .unwrap_or_else(|| panic!("unknown behavior tree {handle:?}"))
    }

    fn emit(&mut self, tag: &'static str, root: NodeId) {
        self.tracer
            .emit(TraceEvent::new(self.tick, tag).with_a(root.index() as u64));
    }

    /// Starts an inactive tree and adds it to the set [`update`](Self::update) drives.
    ///
    /// # Panics
    ///
    /// If the tree is not `Inactive`.
    pub fn start_tree(&mut self, handle: TreeHandle) {
        let root = self.entry(handle).handle.root();
        let node = self.arena.node(root);
        assert!(
            node.state == NodeState::Inactive,
            "cannot start tree '{}' from {:?}",
            node.name,
            node.state
        );
        let mut ctx = TickContext::new(self.tick, 0.0, &mut *self.rng, &mut self.tracer);
        self.arena.start(root, &mut ctx);
        self.entry_mut(handle).active = true;
        self.emit("bt.tree.start", root);
        tracing::debug!(tree = %self.arena.node(root).name, "behavior tree started");
    }

    /// Pauses a running tree. Other states are left alone.
    pub fn pause_tree(&mut self, handle: TreeHandle) {
        let root = self.entry(handle).handle.root();
        if self.arena.node(root).state == NodeState::Running {
            self.arena.pause(root);
        }
    }

    /// Resumes a paused tree. Other states are left alone.
    pub fn resume_tree(&mut self, handle: TreeHandle) {
        let root = self.entry(handle).handle.root();
        if self.arena.node(root).state == NodeState::Paused {
            self.arena.resume(root);
        }
    }

    /// Preempts a running or paused tree and drops it from the active set.
    pub fn stop_tree(&mut self, handle: TreeHandle) {
        let root = self.entry(handle).handle.root();
        if self.arena.node(root).state.is_live() {
            self.arena.preempt(root);
            tracing::debug!(tree = %self.arena.node(root).name, "behavior tree stopped");
        }
        self.entry_mut(handle).active = false;
    }

    /// Returns a finished tree to `Inactive` so it can be started again.
    pub fn reset_tree(&mut self, handle: TreeHandle) {
        let root = self.entry(handle).handle.root();
        if self.arena.node(root).state == NodeState::Finished {
            self.arena.reset(root);
            tracing::debug!(tree = %self.arena.node(root).name, "behavior tree reset");
        }
    }

    /// Releases the tree and every node and action it owns. A live tree is preempted first so
    /// running actions see `terminate`.
    pub fn remove_tree(&mut self, handle: TreeHandle) {
        let root = self.entry(handle).handle.root();
        if self.arena.node(root).state.is_live() {
            self.arena.preempt(root);
        }
        self.trees.retain(|entry| entry.handle != handle);
        let released = self.arena.remove_subtree(root);
        tracing::debug!(root = %root, nodes = released, "behavior tree removed");
    }

    // ------------------------------------------------------------------------------------------
    // Ticking

    /// Queries then updates every active running tree, in creation order. Trees that finish
    /// leave the active set and must be reset before they run again.
    pub fn update(&mut self, dt: f32) {
        self.tick += 1;
        for i in 0..self.trees.len() {
            let entry = &self.trees[i];
            let root = entry.handle.root();
            if !entry.active || self.arena.node(root).state != NodeState::Running {
                continue;
            }
            let mut ctx = TickContext::new(self.tick, dt, &mut *self.rng, &mut self.tracer);
            self.arena.query(root, &mut ctx);
            if self.arena.update(root, &mut ctx) == NodeState::Finished {
                self.trees[i].active = false;
                self.emit("bt.tree.finish", root);
                tracing::debug!(tree = %self.arena.node(root).name, "behavior tree finished");
            }
        }
    }

    /// Runs only the query phase on one tree.
    pub fn query_tree(&mut self, handle: TreeHandle, dt: f32) {
        let root = self.entry(handle).handle.root();
        let mut ctx = TickContext::new(self.tick, dt, &mut *self.rng, &mut self.tracer);
        self.arena.query(root, &mut ctx);
    }

    /// Runs only the update phase on one tree and returns the root state.
    pub fn update_tree(&mut self, handle: TreeHandle, dt: f32) -> NodeState {
        let root = self.entry(handle).handle.root();
        let mut ctx = TickContext::new(self.tick, dt, &mut *self.rng, &mut self.tracer);
        self.arena.update(root, &mut ctx)
    }

    // ------------------------------------------------------------------------------------------
    // Inspection

    pub fn is_active(&self, handle: TreeHandle) -> bool {
        self.entry(handle).active
    }

    pub fn state(&self, handle: TreeHandle) -> NodeState {
        self.arena.node(self.entry(handle).handle.root()).state
    }

    pub fn priority(&self, handle: TreeHandle) -> f32 {
        self.arena.node(self.entry(handle).handle.root()).priority
    }

    pub fn root(&self, handle: TreeHandle) -> NodeRef<'_> {
        NodeRef::new(&self.arena, self.entry(handle).handle.root())
    }

    /// Any live node, or `None` once its tree was removed.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.arena.contains(id).then(|| NodeRef::new(&self.arena, id))
    }

    /// Applies a composite's selection rule to its current child priorities without changing
    /// its active child. `None` for childless composites and other node kinds.
    ///
    /// Random composites draw from the shared random source.
    pub fn select_child(&mut self, id: NodeId) -> Option<usize> {
        if !self.arena.node(id).class().is_composite() {
            return None;
        }
        self.arena.select_child(id, &mut *self.rng)
    }
}

fn resolve_prioritizer(
    registry: &BehaviorRegistry,
    def: &BehaviorNodeDef,
    key: &str,
) -> Result<Prioritizer> {
    registry
        .prioritizer(key)
        .ok_or_else(|| BehaviorError::UnknownPrioritizer {
            node: def.name.clone(),
            key: key.to_string(),
        })
}

impl std::fmt::Debug for BehaviorManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorManager")
            .field("config", &self.config)
            .field("trees", &self.trees.len())
            .field("nodes", &self.arena.len())
            .field("tick", &self.tick)
            .field("tracer", &self.tracer)
            .finish_non_exhaustive()
    }
}
