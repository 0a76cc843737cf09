use std::fmt;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Called once when an action begins running.
pub type StartFn = Rc<dyn Fn()>;
/// Called every tick while running; returns `true` once the work is finished.
pub type UpdateFn = Rc<dyn Fn(f32) -> bool>;
/// Called when a running action is cut short.
pub type TerminateFn = Rc<dyn Fn()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActionState {
    Inactive,
    Running,
    Paused,
    Finished,
}

/// Declarative description of an action: a name plus up to three callbacks.
///
/// Callbacks are reference counted so one definition can be bound to several leaves. Each leaf
/// gets its own [`BehaviorAction`] instance and therefore its own state machine.
#[derive(Clone, Default)]
pub struct ActionDef {
    pub name: String,
    pub start: Option<StartFn>,
    pub update: Option<UpdateFn>,
    pub terminate: Option<TerminateFn>,
}

impl ActionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_start(mut self, start: impl Fn() + 'static) -> Self {
        self.start = Some(Rc::new(start));
        self
    }

    pub fn with_update(mut self, update: impl Fn(f32) -> bool + 'static) -> Self {
        self.update = Some(Rc::new(update));
        self
    }

    pub fn with_terminate(mut self, terminate: impl Fn() + 'static) -> Self {
        self.terminate = Some(Rc::new(terminate));
        self
    }
}

impl fmt::Debug for ActionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDef")
            .field("name", &self.name)
            .field("start", &self.start.is_some())
            .field("update", &self.update.is_some())
            .field("terminate", &self.terminate.is_some())
            .finish()
    }
}

/// A live, steppable unit of work bound to a behavior tree leaf.
///
/// State machine:
///
/// ```text
/// Inactive --start--> Running --pause--> Paused --resume--> Running
/// Running --update returns true--> Finished --reset--> Inactive
/// Running --terminate--> Inactive
/// ```
///
/// Every transition except `update` asserts its predecessor state. Driving an action from the
/// wrong state is a bug in the caller and panics.
pub struct BehaviorAction {
    name: String,
    state: ActionState,
    start: Option<StartFn>,
    update: Option<UpdateFn>,
    terminate: Option<TerminateFn>,
}

impl BehaviorAction {
    /// Instantiates an action from its definition. Normally done by the behavior manager when it
    /// allocates a leaf.
    pub fn new(def: &ActionDef) -> Self {
        Self {
            name: def.name.clone(),
            state: ActionState::Inactive,
            start: def.start.clone(),
            update: def.update.clone(),
            terminate: def.terminate.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn start(&mut self) {
        assert!(
            self.state == ActionState::Inactive,
            "cannot start action '{}' from {:?}",
            self.name,
            self.state
        );
        if let Some(start) = self.start.as_ref() {
            start();
        }
        self.state = ActionState::Running;
    }

    /// Steps the action. Without an update callback the action never finishes.
    pub fn update(&mut self, dt: f32) -> ActionState {
        if self.state != ActionState::Running {
            return self.state;
        }
        if let Some(update) = self.update.as_ref() {
            if update(dt) {
                self.state = ActionState::Finished;
            }
        }
        self.state
    }

    pub fn pause(&mut self) {
        assert!(
            self.state == ActionState::Running,
            "cannot pause action '{}' from {:?}",
            self.name,
            self.state
        );
        self.state = ActionState::Paused;
    }

    pub fn resume(&mut self) {
        assert!(
            self.state == ActionState::Paused,
            "cannot resume action '{}' from {:?}",
            self.name,
            self.state
        );
        self.state = ActionState::Running;
    }

    /// Cuts a running action short. Unlike finishing, this ends in `Inactive`.
    pub fn terminate(&mut self) {
        assert!(
            self.state == ActionState::Running,
            "cannot terminate action '{}' from {:?}",
            self.name,
            self.state
        );
        if let Some(terminate) = self.terminate.as_ref() {
            terminate();
        }
        self.state = ActionState::Inactive;
    }

    pub fn reset(&mut self) {
        assert!(
            self.state == ActionState::Finished,
            "cannot reset action '{}' from {:?}",
            self.name,
            self.state
        );
        self.state = ActionState::Inactive;
    }
}

impl fmt::Debug for BehaviorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorAction")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
