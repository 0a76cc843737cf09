use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use ai_core::ActionDef;

use crate::error::{BehaviorError, Result};

/// Computes a node's priority in `[0, 1]`.
pub type Prioritizer = Rc<dyn Fn() -> f32>;

/// Name tables resolved by [`BehaviorManager::create_tree`](crate::BehaviorManager::create_tree).
///
/// Definitions refer to prioritizers and actions by string key; this is where those keys are
/// bound to code.
#[derive(Default)]
pub struct BehaviorRegistry {
    prioritizers: BTreeMap<String, Prioritizer>,
    actions: BTreeMap<String, ActionDef>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_prioritizer(
        &mut self,
        name: impl Into<String>,
        prioritizer: impl Fn() -> f32 + 'static,
    ) -> Result<()> {
        let name = name.into();
        if self.prioritizers.contains_key(&name) {
            return Err(BehaviorError::DuplicateKey(name));
        }
        self.prioritizers.insert(name, Rc::new(prioritizer));
        Ok(())
    }

    /// Registers a prioritizer that always returns `value`.
    pub fn add_constant(&mut self, name: impl Into<String>, value: f32) -> Result<()> {
        self.add_prioritizer(name, move || value)
    }

    pub fn prioritizer(&self, name: &str) -> Option<Prioritizer> {
        self.prioritizers.get(name).cloned()
    }

    pub fn remove_prioritizer(&mut self, name: &str) -> Option<Prioritizer> {
        self.prioritizers.remove(name)
    }

    /// Registers `action` under its own name.
    pub fn add_action(&mut self, action: ActionDef) -> Result<()> {
        if self.actions.contains_key(&action.name) {
            return Err(BehaviorError::DuplicateKey(action.name));
        }
        self.actions.insert(action.name.clone(), action);
        Ok(())
    }

    pub fn action(&self, name: &str) -> Option<&ActionDef> {
        self.actions.get(name)
    }

    pub fn remove_action(&mut self, name: &str) -> Option<ActionDef> {
        self.actions.remove(name)
    }
}

impl fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorRegistry")
            .field("prioritizers", &self.prioritizers.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}
