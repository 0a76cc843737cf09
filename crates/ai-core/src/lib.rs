//! Deterministic, engine-agnostic primitives for priority behavior trees.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod rng;

pub use action::{ActionDef, ActionState, BehaviorAction, StartFn, TerminateFn, UpdateFn};
pub use rng::{DeterministicRng, SplitMix64};
