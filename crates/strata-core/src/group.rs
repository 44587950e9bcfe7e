//! Ordered groups of nodes.

use crate::error::{Error, Result};
use crate::node::{Node, NodeRef, NodeType};
use crate::options::Options;
use crate::outcome::Outcome;
use crate::value::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Shared handle to a group.
pub type GroupRef = Rc<Group>;

/// A group type: a name, the node type raw members are built as, and an
/// optional parent group type.
pub struct GroupType {
    name: String,
    member: Rc<NodeType>,
    parent: Option<Rc<GroupType>>,
}

impl GroupType {
    pub fn new(name: impl Into<String>, member: &Rc<NodeType>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            member: Rc::clone(member),
            parent: None,
        })
    }

    /// A subtype of `parent`. `member` defaults to the parent's member type.
    pub fn extending(
        name: impl Into<String>,
        parent: &Rc<GroupType>,
        member: Option<&Rc<NodeType>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            member: Rc::clone(member.unwrap_or(&parent.member)),
            parent: Some(Rc::clone(parent)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self) -> &Rc<NodeType> {
        &self.member
    }

    pub fn parent(&self) -> Option<&Rc<GroupType>> {
        self.parent.as_ref()
    }

    pub fn is_a(&self, ancestor: &GroupType) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if std::ptr::eq(kind, ancestor) {
                return true;
            }
            current = kind.parent.as_deref();
        }
        false
    }

    pub fn create(self: &Rc<Self>, raw: Vec<Value>, options: &Options) -> Result<GroupRef> {
        Group::new(self, raw, options)
    }
}

impl fmt::Debug for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupType")
            .field("name", &self.name)
            .field("member", &self.member.name())
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .finish()
    }
}

pub struct Group {
    id: Uuid,
    kind: Rc<GroupType>,
    members: RefCell<Vec<NodeRef>>,
}

impl Group {
    /// Builds a group from raw elements. Objects become new members of the
    /// group's member type, constructed with `options`; existing nodes are
    /// adopted as they are.
    pub fn new(kind: &Rc<GroupType>, raw: Vec<Value>, options: &Options) -> Result<GroupRef> {
        let members = raw
            .into_iter()
            .enumerate()
            .map(|(index, element)| match element {
                Value::Object(attrs) => Node::new(kind.member(), Some(attrs), options),
                Value::Node(node) => Ok(node),
                other => Err(Error::InvalidMember {
                    group: kind.name().to_string(),
                    index,
                    found: other.describe(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_nodes(kind, members))
    }

    pub fn from_nodes(kind: &Rc<GroupType>, members: Vec<NodeRef>) -> GroupRef {
        Rc::new(Self {
            id: Uuid::new_v4(),
            kind: Rc::clone(kind),
            members: RefCell::new(members),
        })
    }

    /// Constructs a group from a raw value that must be an array or null.
    pub fn from_value(kind: &Rc<GroupType>, raw: Value, options: &Options) -> Result<GroupRef> {
        match raw {
            Value::Array(items) => Group::new(kind, items, options),
            Value::Null => Group::new(kind, Vec::new(), options),
            other => Err(Error::InvalidInput {
                kind: kind.name().to_string(),
                expected: "an array",
                found: other.describe(),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> &Rc<GroupType> {
        &self.kind
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeRef> {
        self.members.borrow().get(index).cloned()
    }

    pub fn first(&self) -> Option<NodeRef> {
        self.get(0)
    }

    /// Snapshot of the members, in order.
    pub fn members(&self) -> Vec<NodeRef> {
        self.members.borrow().clone()
    }

    pub fn push(&self, node: NodeRef) {
        self.members.borrow_mut().push(node);
    }

    /// Calls `f` on every member in order and collects the results.
    ///
    /// Runs over a snapshot, so `f` may touch the group itself.
    pub fn invoke<T>(&self, mut f: impl FnMut(&Node) -> T) -> Vec<T> {
        self.members().iter().map(|member| f(member.as_ref())).collect()
    }

    pub fn serialize(&self, options: &Options) -> Result<Vec<Value>> {
        self.invoke(|member| member.serialize(options).map(Value::Object))
            .into_iter()
            .collect()
    }

    /// Validates every member with no explicit attribute target.
    pub fn validate_members(&self, options: &Options) -> Result<Vec<Outcome>> {
        self.invoke(|member| member.validate(None, options))
            .into_iter()
            .collect()
    }

    pub fn to_json(&self, options: &Options) -> Result<serde_json::Value> {
        self.invoke(|member| member.to_json(options))
            .into_iter()
            .collect::<Result<Vec<_>>>()
            .map(serde_json::Value::Array)
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("id", &self.id)
            .field("kind", &self.kind.name())
            .field("members", &*self.members.borrow())
            .finish()
    }
}
