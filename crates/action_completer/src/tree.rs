//! Arena-backed action tree: groups, actions, handles, and registration.

use std::{fmt, rc::Rc};

use action_completer_contract::{NodeKind, NodePath, ParamValue};
use serde_json::Value;
use tracing::debug;

use crate::{
    display::{display_builders, Completable, DisplayAttributes},
    error::{HandlerError, RegistrationError},
    param::ActionParam,
};

/// Predicate deciding whether a node currently takes part in resolution and completion.
pub type ActivePredicate = Rc<dyn Fn() -> bool>;

/// Action callable receiving the cast positional arguments.
pub type ActionHandler = Rc<dyn Fn(&[ParamValue]) -> Result<Value, HandlerError>>;

/// Index of a node inside one [`ActionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a registered group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub(crate) NodeId);

impl GroupId {
    /// Returns the underlying node id.
    pub fn node(self) -> NodeId {
        self.0
    }
}

/// Handle to a registered action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(pub(crate) NodeId);

impl ActionId {
    /// Returns the underlying node id.
    pub fn node(self) -> NodeId {
        self.0
    }
}

/// Registration options for a group.
#[derive(Clone, Default)]
pub struct GroupOptions {
    /// Activation predicate; `None` means always active.
    pub active: Option<ActivePredicate>,
    /// Presentation attributes used when the group is offered as a candidate.
    pub attributes: DisplayAttributes,
}

impl GroupOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the activation predicate.
    pub fn active<F>(mut self, active: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.active = Some(Rc::new(active));
        self
    }
}

display_builders!(GroupOptions);

/// Registration options for an action.
#[derive(Clone, Default)]
pub struct ActionOptions {
    /// Activation predicate; `None` means always active.
    pub active: Option<ActivePredicate>,
    /// Fold surplus fragments into the final parameter instead of rejecting them.
    pub capture_all: bool,
    /// Presentation attributes used when the action is offered as a candidate.
    pub attributes: DisplayAttributes,
}

impl ActionOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the activation predicate.
    pub fn active<F>(mut self, active: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.active = Some(Rc::new(active));
        self
    }

    /// Sets the capture-all flag.
    pub fn capture_all(mut self, capture_all: bool) -> Self {
        self.capture_all = capture_all;
        self
    }
}

display_builders!(ActionOptions);

/// Container of named child groups and actions.
pub struct GroupNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<(String, NodeId)>,
    active: Option<ActivePredicate>,
    attributes: DisplayAttributes,
}

impl GroupNode {
    /// Returns the group name; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent group, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns every child in registration order, active or not.
    pub fn children(&self) -> &[(String, NodeId)] {
        &self.children
    }

    /// Returns the presentation attributes.
    pub fn attributes(&self) -> &DisplayAttributes {
        &self.attributes
    }

    /// Evaluates the activation predicate.
    pub fn is_active(&self) -> bool {
        self.active.as_ref().map_or(true, |active| active())
    }
}

/// Executable leaf with positional parameters.
pub struct ActionNode {
    name: String,
    parent: NodeId,
    params: Vec<ActionParam>,
    capture_all: bool,
    handler: ActionHandler,
    active: Option<ActivePredicate>,
    attributes: DisplayAttributes,
}

impl ActionNode {
    /// Returns the action name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the owning group.
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    /// Returns the declared parameters in positional order.
    pub fn params(&self) -> &[ActionParam] {
        &self.params
    }

    /// Returns whether surplus fragments fold into the final parameter.
    pub fn capture_all(&self) -> bool {
        self.capture_all
    }

    /// Returns the action callable.
    pub fn handler(&self) -> &ActionHandler {
        &self.handler
    }

    /// Returns the presentation attributes.
    pub fn attributes(&self) -> &DisplayAttributes {
        &self.attributes
    }

    /// Evaluates the activation predicate.
    pub fn is_active(&self) -> bool {
        self.active.as_ref().map_or(true, |active| active())
    }
}

/// One arena slot.
pub enum Node {
    /// Group node.
    Group(GroupNode),
    /// Action node.
    Action(ActionNode),
}

impl Node {
    /// Returns the node name.
    pub fn name(&self) -> &str {
        match self {
            Self::Group(group) => group.name(),
            Self::Action(action) => action.name(),
        }
    }

    /// Returns the node classification.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Group(_) => NodeKind::Group,
            Self::Action(_) => NodeKind::Action,
        }
    }

    /// Returns the parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Self::Group(group) => group.parent(),
            Self::Action(action) => Some(action.parent()),
        }
    }

    /// Evaluates the node's activation predicate.
    pub fn is_active(&self) -> bool {
        match self {
            Self::Group(group) => group.is_active(),
            Self::Action(action) => action.is_active(),
        }
    }

    /// Returns the presentation attributes.
    pub fn attributes(&self) -> &DisplayAttributes {
        match self {
            Self::Group(group) => group.attributes(),
            Self::Action(action) => action.attributes(),
        }
    }

    /// Returns the node as a display source.
    pub fn completable(&self) -> Completable<'_> {
        match self {
            Self::Group(group) => Completable::Group(group),
            Self::Action(action) => Completable::Action(action),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("parent", &self.parent())
            .finish()
    }
}

/// Hierarchy of groups and actions rooted at a single unnamed group.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. Replaced nodes stay in the
/// arena but are no longer reachable from the root.
pub struct ActionTree {
    nodes: Vec<Node>,
}

impl Default for ActionTree {
    fn default() -> Self {
        Self::new(GroupOptions::default())
    }
}

impl ActionTree {
    /// Creates a tree whose root group uses `root` options.
    pub fn new(root: GroupOptions) -> Self {
        Self {
            nodes: vec![Node::Group(GroupNode {
                name: String::new(),
                parent: None,
                children: Vec::new(),
                active: root.active,
                attributes: root.attributes,
            })],
        }
    }

    /// Returns the root group handle.
    pub fn root(&self) -> GroupId {
        GroupId(NodeId(0))
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Looks up a group by handle.
    pub fn group(&self, id: GroupId) -> Option<&GroupNode> {
        match self.node(id.0)? {
            Node::Group(group) => Some(group),
            Node::Action(_) => None,
        }
    }

    /// Looks up an action by handle.
    pub fn action(&self, id: ActionId) -> Option<&ActionNode> {
        match self.node(id.0)? {
            Node::Action(action) => Some(action),
            Node::Group(_) => None,
        }
    }

    /// Returns the node for an id stored by this tree.
    pub(crate) fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Returns the children of `group` whose activation predicate currently holds.
    pub fn active_children<'t>(
        &'t self,
        group: &'t GroupNode,
    ) -> impl Iterator<Item = (&'t str, NodeId)> + 't {
        group
            .children
            .iter()
            .filter(move |(_, id)| self.get(*id).is_active())
            .map(|(name, id)| (name.as_str(), *id))
    }

    /// Reconstructs the full name path of `id` by following parent back-references.
    pub fn path(&self, id: NodeId) -> NodePath {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.node(current) else {
                break;
            };
            if node.parent().is_some() {
                segments.push(node.name().to_string());
            }
            cursor = node.parent();
        }
        segments.reverse();
        NodePath::from_segments(segments)
    }

    /// Registers a group under `parent`.
    pub fn insert_group(
        &mut self,
        parent: GroupId,
        name: &str,
        options: GroupOptions,
    ) -> Result<GroupId, RegistrationError> {
        let node = Node::Group(GroupNode {
            name: name.to_string(),
            parent: Some(parent.0),
            children: Vec::new(),
            active: options.active,
            attributes: options.attributes,
        });
        self.insert(parent, name, node).map(GroupId)
    }

    /// Registers an action under `parent`.
    pub fn insert_action(
        &mut self,
        parent: GroupId,
        name: &str,
        params: Vec<ActionParam>,
        handler: ActionHandler,
        options: ActionOptions,
    ) -> Result<ActionId, RegistrationError> {
        let node = Node::Action(ActionNode {
            name: name.to_string(),
            parent: parent.0,
            params,
            capture_all: options.capture_all,
            handler,
            active: options.active,
            attributes: options.attributes,
        });
        self.insert(parent, name, node).map(ActionId)
    }

    fn insert(&mut self, parent: GroupId, name: &str, node: Node) -> Result<NodeId, RegistrationError> {
        validate_name(name)?;
        let id = NodeId(self.nodes.len());
        let group = match self.nodes.get_mut(parent.0 .0) {
            Some(Node::Group(group)) => group,
            Some(Node::Action(_)) => return Err(RegistrationError::ParentNotGroup(parent.0 .0)),
            None => return Err(RegistrationError::UnknownParent(parent.0 .0)),
        };
        match group.children.iter_mut().find(|(child, _)| child == name) {
            Some(slot) => {
                debug!(
                    node = name,
                    previous = slot.1.index(),
                    replacement = id.index(),
                    "replacing registered node"
                );
                slot.1 = id;
            }
            None => group.children.push((name.to_string(), id)),
        }
        self.nodes.push(node);
        Ok(id)
    }
}

fn validate_name(name: &str) -> Result<(), RegistrationError> {
    if name.is_empty() {
        return Err(RegistrationError::EmptyName);
    }
    if name.chars().any(char::is_whitespace) {
        return Err(RegistrationError::WhitespaceInName(name.to_string()));
    }
    Ok(())
}
