use ai_bt::{
    ActionDef, BehaviorManager, BehaviorNodeDef, BehaviorRegistry, ManagerConfig, NodeClass,
    NodeState, NodeType, TreeHandle,
};

fn registry(priorities: &[(&str, f32)]) -> BehaviorRegistry {
    let mut registry = BehaviorRegistry::new();
    for &(key, value) in priorities {
        registry.add_constant(key, value).unwrap();
    }
    registry.add_action(ActionDef::new("idle")).unwrap();
    registry
}

fn random_tree(
    manager: &mut BehaviorManager,
    registry: &BehaviorRegistry,
    uniform: bool,
    keys: &[&str],
) -> TreeHandle {
    let children = keys
        .iter()
        .enumerate()
        .map(|(i, key)| BehaviorNodeDef::leaf(format!("c{i}"), *key, "idle"))
        .collect();
    let def = BehaviorNodeDef::random("dice", uniform, children);
    manager.create_tree(&def, registry).unwrap()
}

fn draws(manager: &mut BehaviorManager, tree: TreeHandle, n: usize) -> Vec<usize> {
    let root = manager.root(tree).id();
    (0..n)
        .map(|_| manager.select_child(root).unwrap())
        .collect()
}

#[test]
fn random_priority_is_the_average_of_its_children() {
    let registry = registry(&[("tenth", 0.1)]);
    let mut manager = BehaviorManager::new();
    let tree = random_tree(&mut manager, &registry, true, &["tenth", "tenth", "tenth"]);

    manager.start_tree(tree);
    manager.query_tree(tree, 0.016);

    assert_eq!(manager.root(tree).class(), NodeClass::Random);
    assert!((manager.priority(tree) - 0.1).abs() < 1e-6);
    assert!(manager.root(tree).active_child().is_some());
}

#[test]
fn random_average_wins_over_a_user_prioritizer() {
    let registry = registry(&[("tenth", 0.1), ("user", 0.9)]);
    let def = BehaviorNodeDef::random(
        "dice",
        true,
        vec![
            BehaviorNodeDef::leaf("a", "tenth", "idle"),
            BehaviorNodeDef::leaf("b", "tenth", "idle"),
        ],
    )
    .with_prioritizer("user");
    let mut manager = BehaviorManager::new();
    let tree = manager.create_tree(&def, &registry).unwrap();

    manager.start_tree(tree);
    manager.query_tree(tree, 0.016);
    assert!((manager.priority(tree) - 0.1).abs() < 1e-6);
}

#[test]
fn average_ignores_which_child_was_drawn() {
    let registry = registry(&[("lo", 0.2), ("hi", 0.8)]);
    let mut manager = BehaviorManager::new();
    let tree = random_tree(&mut manager, &registry, false, &["lo", "hi"]);
    manager.start_tree(tree);

    for _ in 0..20 {
        manager.update(0.1);
        assert!((manager.priority(tree) - 0.5).abs() < 1e-6);
    }
}

#[test]
fn weighted_draws_replay_under_the_same_seed() {
    let registry = registry(&[("lo", 0.2), ("hi", 0.8)]);
    let config = ManagerConfig::default().with_seed(42);

    let mut first = BehaviorManager::with_config(config);
    let mut second = BehaviorManager::with_config(config);
    let a = random_tree(&mut first, &registry, false, &["lo", "hi"]);
    let b = random_tree(&mut second, &registry, false, &["lo", "hi"]);
    first.start_tree(a);
    second.start_tree(b);

    let seq = draws(&mut first, a, 1_000);
    assert_eq!(seq, draws(&mut second, b, 1_000));

    let heavy = seq.iter().filter(|&&i| i == 1).count();
    assert!(heavy > 600 && heavy < 950, "weighted draw picked hi {heavy} times");
}

#[test]
fn preemptive_random_trees_replay_their_selections() {
    let registry = registry(&[("lo", 0.2), ("hi", 0.8)]);
    let config = ManagerConfig::default().with_seed(7).recording(true);

    let run = || {
        let mut manager = BehaviorManager::with_config(config);
        let children = vec![
            BehaviorNodeDef::leaf("lo", "lo", "idle"),
            BehaviorNodeDef::leaf("hi", "hi", "idle"),
        ];
        let def = BehaviorNodeDef::random("dice", false, children).preemptive(true);
        let tree = manager.create_tree(&def, &registry).unwrap();
        manager.start_tree(tree);
        for _ in 0..50 {
            manager.update(0.1);
        }
        manager
            .trace_log()
            .unwrap()
            .with_tag("bt.select")
            .map(|e| (e.tick, e.b))
            .collect::<Vec<_>>()
    };

    let selections = run();
    assert!(!selections.is_empty());
    assert_eq!(selections, run());
}

#[test]
fn zero_weights_fall_back_to_uniform_draws() {
    let registry = registry(&[("none", 0.0)]);
    let mut manager = BehaviorManager::new();
    let tree = random_tree(&mut manager, &registry, false, &["none", "none"]);

    let seq = draws(&mut manager, tree, 200);
    assert!(seq.contains(&0));
    assert!(seq.contains(&1));
}

#[test]
fn zero_priority_children_are_never_weighted_in() {
    let registry = registry(&[("none", 0.0), ("some", 0.6)]);
    let mut manager = BehaviorManager::new();
    let tree = random_tree(&mut manager, &registry, false, &["none", "some", "none"]);
    manager.start_tree(tree);

    assert!(draws(&mut manager, tree, 500).iter().all(|&i| i == 1));
}

#[test]
fn selector_definitions_build_random_nodes() {
    let registry = registry(&[("p", 0.4)]);
    let def = BehaviorNodeDef::new("pick", NodeType::Selector).with_children(vec![
        BehaviorNodeDef::leaf("a", "p", "idle"),
        BehaviorNodeDef::leaf("b", "p", "idle"),
    ]);
    let mut manager = BehaviorManager::new();
    let tree = manager.create_tree(&def, &registry).unwrap();
    assert_eq!(manager.root(tree).class(), NodeClass::Random);
}

#[test]
fn childless_random_nodes_run_nothing() {
    let registry = registry(&[]);
    let mut manager = BehaviorManager::new();
    let tree = random_tree(&mut manager, &registry, true, &[]);
    manager.start_tree(tree);

    for _ in 0..3 {
        manager.update(0.1);
    }
    let root = manager.root(tree);
    assert_eq!(root.state(), NodeState::Running);
    assert_eq!(root.priority(), 0.0);
    assert!(root.active_child().is_none());
    let root = root.id();
    assert_eq!(manager.select_child(root), None);
}
