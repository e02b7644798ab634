//! Visiting the tree.
//!
//! Every `visit_*` method of [`Visitor`] defaults to walking into the node's children, so an
//! implementation only overrides the nodes it cares about. Call the matching `walk_*` function
//! from an override to keep descending.

use crate::ast::Ast;
use crate::node::{NodeId, NodeKind};

pub trait Visitor {
    fn visit_procedure(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id)
    }

    fn visit_parameter(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_statement(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id)
    }

    fn visit_expression(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id)
    }

    fn visit_literal(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_invalid(&mut self, _ast: &Ast, _id: NodeId) {}
}

/// Visits every root of the tree, in order
pub fn walk_ast<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast) {
    for &root in ast.roots() {
        walk_node(visitor, ast, root);
    }
}

/// Dispatches a node to the visitor method for its kind
pub fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast, id: NodeId) {
    let Some(node) = ast.get(id) else {
        return;
    };
    match node.kind() {
        NodeKind::Procedure { .. } => visitor.visit_procedure(ast, id),
        NodeKind::Parameter { .. } => visitor.visit_parameter(ast, id),
        NodeKind::VariableDeclaration { .. }
        | NodeKind::ExpressionStatement { .. }
        | NodeKind::Noop => visitor.visit_statement(ast, id),
        NodeKind::Prefix { .. } | NodeKind::Binary { .. } | NodeKind::Identifier(_) => {
            visitor.visit_expression(ast, id)
        }
        NodeKind::Integer(_) | NodeKind::Boolean(_) | NodeKind::Float(_) => {
            visitor.visit_literal(ast, id)
        }
        NodeKind::Invalid { .. } => visitor.visit_invalid(ast, id),
    }
}

pub fn walk_children<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast, id: NodeId) {
    for child in ast.children(id) {
        walk_node(visitor, ast, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viper_tokens::{Token, TokenKind};

    #[derive(Default)]
    struct Counter {
        literals: usize,
        expressions: usize,
        invalid: usize,
    }

    impl Visitor for Counter {
        fn visit_expression(&mut self, ast: &Ast, id: NodeId) {
            self.expressions += 1;
            walk_children(self, ast, id)
        }

        fn visit_literal(&mut self, _ast: &Ast, _id: NodeId) {
            self.literals += 1;
        }

        fn visit_invalid(&mut self, _ast: &Ast, _id: NodeId) {
            self.invalid += 1;
        }
    }

    #[test]
    fn test_count_nodes() {
        let mut ast = Ast::new();
        let one = ast
            .add(Token::call_site(TokenKind::Integer(1)), NodeKind::Integer(1))
            .unwrap();
        let two = ast
            .add(Token::call_site(TokenKind::Integer(2)), NodeKind::Integer(2))
            .unwrap();
        let op = Token::call_site(TokenKind::Plus);
        let sum = ast
            .add(op.clone(), NodeKind::Binary { lhs: one, op, rhs: two })
            .unwrap();
        let stmt = ast
            .add(
                Token::call_site(TokenKind::SemiColon),
                NodeKind::ExpressionStatement { expr: sum },
            )
            .unwrap();
        ast.push_root(stmt).unwrap();
        let invalid = ast
            .add(
                Token::call_site(TokenKind::SemiColon),
                NodeKind::Invalid {
                    reason: "test".to_string(),
                },
            )
            .unwrap();
        ast.push_root(invalid).unwrap();

        let mut counter = Counter::default();
        walk_ast(&mut counter, &ast);
        assert_eq!(counter.literals, 2);
        assert_eq!(counter.expressions, 1);
        assert_eq!(counter.invalid, 1);
    }
}
