//! Validating nested instances

use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use strata_core::{
    Attributes, Behavior, Error, GroupType, NestedTypes, Node, NodeType, Options, Outcome, Result,
    TypeDescriptor, ValidationError, declare,
};

/// Base behavior that counts validate calls and answers with a fixed outcome.
#[derive(Clone)]
struct Checked {
    calls: Rc<Cell<usize>>,
    seen: Rc<RefCell<Vec<(uuid::Uuid, Options, Option<Attributes>)>>>,
    answer: Option<&'static str>,
}

impl Checked {
    fn answering(answer: Option<&'static str>) -> Self {
        Self {
            calls: Rc::new(Cell::new(0)),
            seen: Rc::new(RefCell::new(Vec::new())),
            answer,
        }
    }

    fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Behavior for Checked {
    fn validate(
        &self,
        node: &Node,
        attrs: Option<&Attributes>,
        options: &Options,
    ) -> Result<Outcome> {
        self.calls.set(self.calls.get() + 1);
        self.seen
            .borrow_mut()
            .push((node.id(), options.clone(), attrs.cloned()));
        Ok(self.answer.map(ValidationError::from))
    }
}

fn holder(base: Checked, types: Vec<(&str, TypeDescriptor)>) -> Rc<NodeType> {
    NodeType::builder("Holder")
        .base(base)
        .layer(NestedTypes)
        .nested(declare(types))
        .build()
}

#[test]
fn test_base_validate_is_called_once_with_the_same_node() {
    let base = Checked::answering(None);
    let kind = holder(base.clone(), vec![]);
    let node = Node::new(&kind, None, &Options::default()).unwrap();
    let options = Options::default().with("strict", true);

    assert_eq!(node.validate(None, &options).unwrap(), None);

    assert_eq!(base.calls(), 1);
    let seen = base.seen.borrow();
    assert_eq!(seen[0].0, node.id());
    assert_eq!(seen[0].1, options);
    assert_eq!(seen[0].2, None);
}

#[test]
fn test_nested_node_is_validated_once() {
    let nested_base = Checked::answering(None);
    let model = NodeType::builder("Model").base(nested_base.clone()).build();
    let kind = holder(Checked::answering(None), vec![("nested", TypeDescriptor::from(&model))]);

    let node = Node::from_json(&kind, json!({"nested": {"foo": "bar"}}), &Options::parsed()).unwrap();
    let outcome = node.validate(None, &Options::default()).unwrap();

    assert_eq!(outcome, None);
    assert_eq!(nested_base.calls(), 1);
    let nested = node.get("nested").unwrap();
    assert_eq!(nested_base.seen.borrow()[0].0, nested.as_node().unwrap().id());
    assert_eq!(nested_base.seen.borrow()[0].2, None);
}

#[test]
fn test_nested_node_without_validator_is_valid() {
    let model = NodeType::plain("Model");
    let kind = holder(Checked::answering(None), vec![("nested", TypeDescriptor::from(&model))]);

    let node = Node::from_json(&kind, json!({"nested": {}}), &Options::parsed()).unwrap();

    assert!(node.is_valid(&Options::default()).unwrap());
}

#[test]
fn test_group_members_are_validated_with_their_own_node() {
    let member_base = Checked::answering(None);
    let model = NodeType::builder("Model").base(member_base.clone()).build();
    let items = GroupType::new("Items", &model);
    let kind = holder(Checked::answering(None), vec![("items", TypeDescriptor::from(&items))]);

    let node = Node::from_json(&kind, json!({"items": [{"a": 1}, {"b": 2}]}), &Options::parsed())
        .unwrap();
    node.validate(None, &Options::default()).unwrap();

    let group = node.get("items").unwrap();
    let ids: Vec<_> = group
        .as_group()
        .unwrap()
        .members()
        .iter()
        .map(|member| member.id())
        .collect();
    let seen: Vec<_> = member_base.seen.borrow().iter().map(|(id, ..)| *id).collect();
    assert_eq!(seen, ids);
}

#[test]
fn test_computed_declaration_is_used_for_validation() {
    let model = NodeType::builder("Model")
        .base(Checked::answering(Some("nested error")))
        .build();
    let declared = Rc::clone(&model);
    let kind = NodeType::builder("Computed")
        .layer(NestedTypes)
        .nested_with(move |_| declare([("nested", &declared)]))
        .build();

    let node = Node::from_json(&kind, json!({"nested": {}}), &Options::parsed()).unwrap();

    assert_eq!(
        node.validate(None, &Options::default()).unwrap(),
        Some(ValidationError::from("nested error"))
    );
}

#[test]
fn test_only_the_first_nested_error_is_returned() {
    let first = NodeType::builder("First")
        .base(Checked::answering(Some("first")))
        .build();
    let second = NodeType::builder("Second")
        .base(Checked::answering(Some("second")))
        .build();
    let kind = holder(
        Checked::answering(None),
        vec![
            ("first", TypeDescriptor::from(&first)),
            ("second", TypeDescriptor::from(&second)),
        ],
    );

    let node = Node::from_json(&kind, json!({"first": {}, "second": {}}), &Options::parsed())
        .unwrap();

    assert_eq!(
        node.validate(None, &Options::default()).unwrap(),
        Some(ValidationError::from("first"))
    );
}

#[test]
fn test_document_order_decides_the_first_error() {
    let zeta = NodeType::builder("Zeta")
        .base(Checked::answering(Some("zeta error")))
        .build();
    let alpha = NodeType::builder("Alpha")
        .base(Checked::answering(Some("alpha error")))
        .build();
    let kind = holder(
        Checked::answering(None),
        vec![
            ("zeta", TypeDescriptor::from(&zeta)),
            ("alpha", TypeDescriptor::from(&alpha)),
        ],
    );

    let node = Node::from_json(&kind, json!({"zeta": {}, "alpha": {}}), &Options::parsed())
        .unwrap();

    let names: Vec<_> = node.attributes().keys().cloned().collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert_eq!(
        node.validate(None, &Options::default()).unwrap(),
        Some(ValidationError::from("zeta error"))
    );
}

#[test]
fn test_first_error_inside_a_group_is_returned() {
    let bad = NodeType::builder("Bad")
        .base(Checked::answering(Some("bad member")))
        .build();
    let items = GroupType::new("Items", &bad);
    let kind = holder(Checked::answering(None), vec![("items", TypeDescriptor::from(&items))]);

    let node = Node::from_json(&kind, json!({"items": [{}, {}]}), &Options::parsed()).unwrap();

    assert_eq!(
        node.validate(None, &Options::default()).unwrap(),
        Some(ValidationError::from("bad member"))
    );
}

#[test]
fn test_explicit_attributes_limit_nested_validation() {
    let checked = Checked::answering(None);
    let bad = NodeType::builder("Bad")
        .base(Checked::answering(Some("stored error")))
        .build();
    let good = NodeType::builder("Good").base(checked.clone()).build();
    let kind = holder(
        Checked::answering(None),
        vec![
            ("stored", TypeDescriptor::from(&bad)),
            ("given", TypeDescriptor::from(&good)),
        ],
    );
    let node = Node::from_json(&kind, json!({"stored": {}}), &Options::parsed()).unwrap();
    let given = Node::new(&good, None, &Options::default()).unwrap();
    let attrs = Attributes::from([("given".to_string(), given.into())]);

    let outcome = node.validate(Some(&attrs), &Options::default()).unwrap();

    assert_eq!(outcome, None);
    assert_eq!(checked.calls(), 1);
}

#[test]
fn test_options_are_forwarded_to_nested_validators() {
    let member_base = Checked::answering(None);
    let model = NodeType::builder("Model").base(member_base.clone()).build();
    let items = GroupType::new("Items", &model);
    let kind = holder(
        Checked::answering(None),
        vec![
            ("one", TypeDescriptor::from(&model)),
            ("many", TypeDescriptor::from(&items)),
        ],
    );
    let node = Node::from_json(&kind, json!({"one": {}, "many": [{}]}), &Options::parsed()).unwrap();
    let options = Options::default().with("locale", "fr");

    node.validate(None, &options).unwrap();

    let seen = member_base.seen.borrow();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|(_, forwarded, _)| *forwarded == options));
}

#[test]
fn test_skip_nested_never_runs_nested_validators() {
    let nested_base = Checked::answering(Some("nested error"));
    let model = NodeType::builder("Model").base(nested_base.clone()).build();
    let base = Checked::answering(None);
    let kind = holder(base.clone(), vec![("nested", TypeDescriptor::from(&model))]);
    let node = Node::from_json(&kind, json!({"nested": {}}), &Options::parsed()).unwrap();

    let outcome = node.validate(None, &Options::default().skip_nested()).unwrap();

    assert_eq!(outcome, None);
    assert_eq!(base.calls(), 1);
    assert_eq!(nested_base.calls(), 0);
}

#[test]
fn test_base_error_takes_priority() {
    let model = NodeType::builder("Model")
        .base(Checked::answering(Some("nested error")))
        .build();
    let kind = holder(
        Checked::answering(Some("own error")),
        vec![("nested", TypeDescriptor::from(&model))],
    );
    let node = Node::from_json(&kind, json!({"nested": {}}), &Options::parsed()).unwrap();

    assert_eq!(
        node.validate(None, &Options::default()).unwrap(),
        Some(ValidationError::from("own error"))
    );
}

#[test]
fn test_structured_error_payload_is_returned_whole() {
    struct Structured;
    impl Behavior for Structured {
        fn validate(
            &self,
            _node: &Node,
            _attrs: Option<&Attributes>,
            _options: &Options,
        ) -> Result<Outcome> {
            Ok(Some(ValidationError::new(json!({"field": "name", "rule": "required"}))))
        }
    }

    let model = NodeType::builder("Model").base(Structured).build();
    let kind = holder(Checked::answering(None), vec![("nested", TypeDescriptor::from(&model))]);
    let node = Node::from_json(&kind, json!({"nested": {}}), &Options::parsed()).unwrap();

    let error = node.validate(None, &Options::default()).unwrap().unwrap();

    assert_eq!(error.payload(), &json!({"field": "name", "rule": "required"}));
}

#[test]
fn test_base_failure_propagates_before_nested_validation() {
    struct Broken;
    impl Behavior for Broken {
        fn validate(
            &self,
            _node: &Node,
            _attrs: Option<&Attributes>,
            _options: &Options,
        ) -> Result<Outcome> {
            Err(Error::Other(anyhow::anyhow!("validator unavailable")))
        }
    }

    let nested_base = Checked::answering(None);
    let model = NodeType::builder("Model").base(nested_base.clone()).build();
    let kind = NodeType::builder("Holder")
        .base(Broken)
        .layer(NestedTypes)
        .nested(declare([("nested", &model)]))
        .build();
    let node = Node::from_json(&kind, json!({"nested": {}}), &Options::parsed()).unwrap();

    let err = node.validate(None, &Options::default()).unwrap_err();

    assert_eq!(err.to_string(), "validator unavailable");
    assert_eq!(nested_base.calls(), 0);
}
