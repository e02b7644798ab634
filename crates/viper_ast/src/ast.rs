use crate::node::{Context, Node, NodeId, NodeKind, ScopeId};
use log::trace;
use std::collections::HashSet;
use std::ops::Index;
use viper_tokens::Token;

/// A node could not be attached where it was asked to be
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("{0} does not exist in this tree")]
    UnknownNode(NodeId),
    #[error("{node} is already owned by {}", .owner.map(|o| o.to_string()).unwrap_or_else(|| "the root list".to_string()))]
    AlreadyOwned {
        node: NodeId,
        owner: Option<NodeId>,
    },
}

/// The abstract syntax tree.
///
/// Owns every node. Nodes live as long as the tree, the only way to remove nodes is to roll back to
/// a [`Checkpoint`] taken before they were added.
#[derive(Debug, Default, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    scopes: Vec<Option<ScopeId>>,
}

impl Ast {
    /// Creates a new, empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with no context or scope. The children named by `kind` become owned by the new
    /// node.
    pub fn add(&mut self, token: Token, kind: NodeKind) -> Result<NodeId, ConstructionError> {
        self.add_with(token, kind, Context::default(), None)
    }

    /// Adds a node. The children named by `kind` become owned by the new node.
    ///
    /// # Error
    /// Fails, leaving the tree untouched, if any child doesn't exist or is already owned.
    pub fn add_with(
        &mut self,
        token: Token,
        kind: NodeKind,
        context: Context,
        scope: Option<ScopeId>,
    ) -> Result<NodeId, ConstructionError> {
        let children = kind.children();
        let mut seen = HashSet::new();
        for &child in &children {
            let node = self.get(child).ok_or(ConstructionError::UnknownNode(child))?;
            if node.is_owned() || !seen.insert(child) {
                return Err(ConstructionError::AlreadyOwned {
                    node: child,
                    owner: node.parent,
                });
            }
        }

        let id = NodeId(self.nodes.len());
        trace!("adding {} {id} from {:?}", kind.kind_name(), token);
        self.nodes.push(Node {
            kind,
            token,
            parent: None,
            is_root: false,
            context,
            scope,
        });
        for child in children {
            self.nodes[child.0].parent = Some(id);
        }
        Ok(id)
    }

    /// Makes a node a top level node of this tree. The first root is the head of the tree.
    pub fn push_root(&mut self, id: NodeId) -> Result<(), ConstructionError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or(ConstructionError::UnknownNode(id))?;
        if node.is_owned() {
            return Err(ConstructionError::AlreadyOwned {
                node: id,
                owner: node.parent,
            });
        }
        node.is_root = true;
        self.roots.push(id);
        Ok(())
    }

    /// Marks the current end of the tree
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.nodes.len())
    }

    /// Removes every node added since `checkpoint` was taken. Nodes from before the checkpoint that
    /// were owned by a removed node become unowned again.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        let len = checkpoint.0;
        if len >= self.nodes.len() {
            return;
        }
        trace!("rolling back {} nodes", self.nodes.len() - len);
        self.nodes.truncate(len);
        self.roots.retain(|root| root.0 < len);
        for node in &mut self.nodes {
            if node.parent.is_some_and(|parent| parent.0 >= len) {
                node.parent = None;
            }
        }
    }

    /// Creates a new scope, nested in `parent`
    pub fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(parent);
        id
    }

    /// Gets the scope a scope is nested in
    pub fn scope_parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(scope.0).copied().flatten()
    }

    /// The entry node of the tree
    pub fn head(&self) -> Option<NodeId> {
        self.roots.first().copied()
    }

    /// The top level nodes, in order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// The children of a node, in traversal order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).map(|n| n.kind.children()).unwrap_or_default()
    }

    /// Every node, in the order they were added
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks every tree of this ast in pre-order
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            ast: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Walks the tree under `id`, including `id`, in pre-order
    pub fn walk_from(&self, id: NodeId) -> Walk<'_> {
        Walk {
            ast: self,
            stack: vec![id],
        }
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index.0]
    }
}

/// The size of an [`Ast`] at some point of its construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// A pre-order traversal over an [`Ast`]
#[derive(Debug)]
pub struct Walk<'a> {
    ast: &'a Ast,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.ast.get(id)?;
        self.stack.extend(node.kind.children().into_iter().rev());
        Some((id, node))
    }
}
