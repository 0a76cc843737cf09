//! Priority-driven behavior trees built on `ai-core`.
//!
//! Every tick the [`BehaviorManager`] runs two phases on each active tree: `query` refreshes
//! priorities bottom-up and lets composites (re)select a child, then `update` drives the single
//! active path down to one leaf, whose action executes.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

mod arena;
pub mod bt;
mod composite;
pub mod def;
pub mod error;
pub mod manager;
mod nodes;
pub mod registry;
pub mod tick;
pub mod timer;
pub mod view;

pub use arena::NodeArena;
pub use bt::{NodeClass, NodeId, NodeState, TreeHandle};
pub use def::{BehaviorNodeDef, NodeType};
pub use error::{BehaviorError, Result};
pub use manager::{BehaviorManager, ManagerConfig};
pub use registry::{BehaviorRegistry, Prioritizer};
pub use tick::TickContext;
pub use timer::TimerGate;
pub use view::NodeRef;

pub use ai_core::{ActionDef, ActionState, DeterministicRng, SplitMix64};
