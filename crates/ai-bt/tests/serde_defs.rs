#![cfg(feature = "serde")]

use ai_bt::{
    ActionDef, BehaviorManager, BehaviorNodeDef, BehaviorRegistry, ManagerConfig, NodeClass,
    NodeType,
};

#[test]
fn definitions_deserialize_with_schema_defaults() {
    let json = r#"{
        "name": "root",
        "type": "priority",
        "preemptive": true,
        "children": [
            { "name": "wait", "type": "timer", "children": [
                { "name": "attack", "type": "leaf", "prioritizer": "p", "action": "attack" }
            ] },
            { "name": "dice", "type": "selector", "uniform": false, "children": [] }
        ]
    }"#;

    let def: BehaviorNodeDef = serde_json::from_str(json).expect("deserialize");
    assert_eq!(def.node_type, NodeType::Priority);
    assert!(def.preemptive);

    let timer = def.node_by_name("wait").unwrap();
    assert_eq!(timer.delay, 1.0);
    assert!(!timer.background);
    assert!(timer.uniform);
    assert!(!def.node_by_name("dice").unwrap().uniform);

    let mut registry = BehaviorRegistry::new();
    registry.add_constant("p", 0.5).unwrap();
    registry.add_action(ActionDef::new("attack")).unwrap();
    let mut manager = BehaviorManager::new();
    let tree = manager.create_tree(&def, &registry).unwrap();
    let root = manager.root(tree);
    assert_eq!(root.child(1).map(|c| c.class()), Some(NodeClass::Random));
    assert_eq!(manager.node_count(), def.node_count());
}

#[test]
fn unknown_node_types_fail_to_deserialize() {
    let json = r#"{ "name": "x", "type": "sequence" }"#;
    assert!(serde_json::from_str::<BehaviorNodeDef>(json).is_err());
}

#[test]
fn manager_config_defaults_fill_missing_fields() {
    let config: ManagerConfig = serde_json::from_str(r#"{ "seed": 9 }"#).expect("deserialize");
    assert_eq!(config, ManagerConfig::default().with_seed(9));
}
