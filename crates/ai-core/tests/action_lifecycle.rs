use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ai_core::{ActionDef, ActionState, BehaviorAction};

#[derive(Clone, Default)]
struct CallLog(Rc<RefCell<Vec<&'static str>>>);

impl CallLog {
    fn push(&self, entry: &'static str) {
        self.0.borrow_mut().push(entry);
    }

    fn entries(&self) -> Vec<&'static str> {
        self.0.borrow().clone()
    }
}

fn recording_def(log: &CallLog, finish_after: u32) -> ActionDef {
    let (start, update, terminate) = (log.clone(), log.clone(), log.clone());
    let ticks = Rc::new(Cell::new(0u32));
    ActionDef::new("record")
        .with_start(move || start.push("start"))
        .with_update(move |_dt| {
            update.push("update");
            ticks.set(ticks.get() + 1);
            ticks.get() >= finish_after
        })
        .with_terminate(move || terminate.push("terminate"))
}

#[test]
fn start_then_finishing_update_reaches_finished() {
    let log = CallLog::default();
    let mut action = BehaviorAction::new(&recording_def(&log, 1));
    assert_eq!(action.state(), ActionState::Inactive);

    action.start();
    assert_eq!(action.state(), ActionState::Running);
    assert_eq!(action.update(0.1), ActionState::Finished);
    assert_eq!(log.entries(), vec!["start", "update"]);

    // Further updates are inert once finished.
    assert_eq!(action.update(0.1), ActionState::Finished);
    assert_eq!(log.entries(), vec!["start", "update"]);
}

#[test]
fn terminate_runs_callback_once_and_never_finishes() {
    let log = CallLog::default();
    let mut action = BehaviorAction::new(&recording_def(&log, 10));

    action.start();
    assert_eq!(action.update(0.1), ActionState::Running);
    action.terminate();

    assert_eq!(action.state(), ActionState::Inactive);
    assert_eq!(
        log.entries().iter().filter(|e| **e == "terminate").count(),
        1
    );
    assert_eq!(action.update(0.1), ActionState::Inactive);
}

#[test]
fn pause_freezes_updates_until_resume() {
    let log = CallLog::default();
    let mut action = BehaviorAction::new(&recording_def(&log, 2));

    action.start();
    action.pause();
    assert_eq!(action.update(0.1), ActionState::Paused);
    assert_eq!(log.entries(), vec!["start"]);

    action.resume();
    assert_eq!(action.update(0.1), ActionState::Running);
    assert_eq!(action.update(0.1), ActionState::Finished);
}

#[test]
fn reset_allows_replay() {
    let log = CallLog::default();
    let mut action = BehaviorAction::new(&recording_def(&log, 1));

    action.start();
    action.update(0.0);
    action.reset();
    assert_eq!(action.state(), ActionState::Inactive);

    action.start();
    assert_eq!(
        log.entries().iter().filter(|e| **e == "start").count(),
        2
    );
}

#[test]
fn action_without_update_runs_forever() {
    let mut action = BehaviorAction::new(&ActionDef::new("idle"));
    action.start();
    for _ in 0..100 {
        assert_eq!(action.update(1.0), ActionState::Running);
    }
}

#[test]
fn definitions_share_callbacks_but_not_state() {
    let log = CallLog::default();
    let def = recording_def(&log, 1);
    let mut first = BehaviorAction::new(&def);
    let second = BehaviorAction::new(&def);

    first.start();
    first.update(0.0);
    assert_eq!(first.state(), ActionState::Finished);
    assert_eq!(second.state(), ActionState::Inactive);
    assert_eq!(second.name(), "record");
}

#[test]
#[should_panic(expected = "cannot pause action")]
fn pausing_an_inactive_action_panics() {
    let mut action = BehaviorAction::new(&ActionDef::new("idle"));
    action.pause();
}

#[test]
#[should_panic(expected = "cannot start action")]
fn starting_a_running_action_panics() {
    let mut action = BehaviorAction::new(&ActionDef::new("idle"));
    action.start();
    action.start();
}

#[test]
#[should_panic(expected = "cannot reset action")]
fn resetting_an_unfinished_action_panics() {
    let mut action = BehaviorAction::new(&ActionDef::new("idle"));
    action.start();
    action.reset();
}

#[test]
#[should_panic(expected = "cannot terminate action")]
fn terminating_a_paused_action_panics() {
    let mut action = BehaviorAction::new(&ActionDef::new("idle"));
    action.start();
    action.pause();
    action.terminate();
}
