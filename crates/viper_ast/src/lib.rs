#![doc = include_str!("../README.md")]

mod ast;
pub mod mangle;
pub mod node;
pub mod precedence;
mod print;
pub mod visitor;

pub use self::{
    ast::{Ast, Checkpoint, ConstructionError, Walk},
    node::{Context, Node, NodeId, NodeKind, ScopeId, TypeRef},
    precedence::{Associativity, Precedence},
    visitor::Visitor,
};
