//! Nodes of the syntax tree

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use viper_tokens::{Spanned, Token, TokenKind};
use viper_types::PrimitiveType;

/// Index of a node within its [`Ast`](crate::Ast)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Handle to a lexical scope, owned by the [`Ast`](crate::Ast)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) usize);

/// Where a node was declared
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub module: Option<String>,
}

impl Context {
    pub fn new(module: impl Into<Option<String>>) -> Self {
        Self {
            module: module.into(),
        }
    }
}

/// A reference to a type, as written
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    name: String,
    primitive: Option<PrimitiveType>,
    token: Option<Token>,
}

impl TypeRef {
    /// Creates a reference from the token that names the type
    pub fn new(token: Token) -> Self {
        let name = token.to_string();
        Self {
            primitive: PrimitiveType::from_str(&name).ok(),
            name,
            token: Some(token),
        }
    }

    /// Creates a reference to a type that wasn't written in source
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            primitive: PrimitiveType::from_str(&name).ok(),
            name,
            token: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The primitive type named, if this names one
    pub fn primitive(&self) -> Option<PrimitiveType> {
        self.primitive
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Every kind of node. Child nodes are referred to by id and are owned by the node naming them.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Procedure {
        name: String,
        mangled_name: String,
        lookup_name: String,
        params: Vec<NodeId>,
        return_type: TypeRef,
        body: Vec<NodeId>,
    },
    Parameter {
        name: String,
        data_type: Token,
    },
    VariableDeclaration {
        name: String,
        mangled_name: String,
        type_spec: TypeRef,
        value: NodeId,
    },
    ExpressionStatement {
        expr: NodeId,
    },
    Prefix {
        op: Token,
        rhs: NodeId,
    },
    Binary {
        lhs: NodeId,
        op: Token,
        rhs: NodeId,
    },
    Integer(u64),
    Boolean(bool),
    Float(f64),
    Identifier(String),
    /// An empty statement
    Noop,
    /// Placeholder for something that could not be parsed
    Invalid {
        reason: String,
    },
}

impl NodeKind {
    /// The nodes owned by this kind, in traversal order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Procedure { params, body, .. } => {
                params.iter().chain(body.iter()).copied().collect()
            }
            NodeKind::VariableDeclaration { value, .. } => vec![*value],
            NodeKind::ExpressionStatement { expr } => vec![*expr],
            NodeKind::Prefix { rhs, .. } => vec![*rhs],
            NodeKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::Parameter { .. }
            | NodeKind::Integer(_)
            | NodeKind::Boolean(_)
            | NodeKind::Float(_)
            | NodeKind::Identifier(_)
            | NodeKind::Noop
            | NodeKind::Invalid { .. } => vec![],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Procedure { .. } => "procedure",
            NodeKind::Parameter { .. } => "parameter",
            NodeKind::VariableDeclaration { .. } => "variable declaration",
            NodeKind::ExpressionStatement { .. } => "expression statement",
            NodeKind::Prefix { .. } => "prefix",
            NodeKind::Binary { .. } => "binary",
            NodeKind::Integer(_) => "integer",
            NodeKind::Boolean(_) => "boolean",
            NodeKind::Float(_) => "float",
            NodeKind::Identifier(_) => "identifier",
            NodeKind::Noop => "noop",
            NodeKind::Invalid { .. } => "invalid",
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, NodeKind::Invalid { .. })
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Prefix { .. }
                | NodeKind::Binary { .. }
                | NodeKind::Integer(_)
                | NodeKind::Boolean(_)
                | NodeKind::Float(_)
                | NodeKind::Identifier(_)
        )
    }

    /// Gets the literal kind for a literal token
    pub fn literal(token: &TokenKind) -> Option<Self> {
        match token {
            TokenKind::Integer(i) => Some(NodeKind::Integer(*i)),
            TokenKind::Float(f) => Some(NodeKind::Float(*f)),
            TokenKind::Boolean(b) => Some(NodeKind::Boolean(*b)),
            _ => None,
        }
    }
}

/// A node in the syntax tree
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) token: Token,
    pub(crate) parent: Option<NodeId>,
    pub(crate) is_root: bool,
    pub(crate) context: Context,
    pub(crate) scope: Option<ScopeId>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The token this node was created from
    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    /// Checks if this node is owned by a parent or by the root list
    pub fn is_owned(&self) -> bool {
        self.parent.is_some() || self.is_root
    }
}

impl Spanned for Node {
    fn span(&self) -> viper_tokens::Span {
        self.token.span()
    }
}
