//! Textual rendering of the tree

use crate::ast::Ast;
use crate::node::{NodeId, NodeKind};
use std::fmt::Write;

impl Ast {
    /// Renders a single node and everything under it
    pub fn print_node(&self, id: NodeId) -> String {
        let mut buffer = String::new();
        // writing into a string never fails
        let _ = self.write_node(&mut buffer, id);
        buffer
    }

    /// Renders every root, each followed by a newline
    pub fn print_tree(&self) -> String {
        let mut buffer = String::new();
        for &root in self.roots() {
            let _ = self.write_node(&mut buffer, root);
            buffer.push('\n');
        }
        buffer
    }

    fn write_node(&self, buffer: &mut String, id: NodeId) -> std::fmt::Result {
        // left-leaning operator chains can be arbitrarily deep, so pending output is kept on a
        // stack instead of recursing
        let mut pending = vec![Piece::Node(id)];
        while let Some(piece) = pending.pop() {
            let id = match piece {
                Piece::Text(text) => {
                    buffer.push_str(text);
                    continue;
                }
                Piece::Node(id) => id,
            };
            let Some(node) = self.get(id) else {
                continue;
            };
            match node.kind() {
                NodeKind::Procedure {
                    name,
                    params,
                    return_type,
                    body,
                    ..
                } => {
                    write!(buffer, "proc <{name}>: <{return_type}> (")?;
                    let mut rest = vec![];
                    for &param in params {
                        rest.extend([Piece::Node(param), Piece::Text(", ")]);
                    }
                    rest.push(Piece::Text(") {\n"));
                    for &statement in body {
                        rest.extend([
                            Piece::Text("    "),
                            Piece::Node(statement),
                            Piece::Text("\n"),
                        ]);
                    }
                    rest.push(Piece::Text("}\n"));
                    pending.extend(rest.into_iter().rev());
                }
                NodeKind::Parameter { name, data_type } => {
                    write!(buffer, "<{name}>: <{data_type}>")?;
                }
                NodeKind::VariableDeclaration {
                    name,
                    type_spec,
                    value,
                    ..
                } => {
                    write!(buffer, "let <{name}>: <{type_spec}> = ")?;
                    pending.push(Piece::Node(*value));
                }
                NodeKind::ExpressionStatement { expr } => pending.push(Piece::Node(*expr)),
                NodeKind::Prefix { op, rhs } => {
                    write!(buffer, "{op}")?;
                    pending.push(Piece::Node(*rhs));
                }
                NodeKind::Binary { lhs, rhs, .. } => {
                    buffer.push('[');
                    pending.extend([
                        Piece::Text("]"),
                        Piece::Node(*lhs),
                        Piece::Text(" "),
                        Piece::Node(*rhs),
                    ]);
                }
                NodeKind::Integer(value) => write!(buffer, "{value}")?,
                NodeKind::Boolean(value) => write!(buffer, "{value}")?,
                NodeKind::Float(value) => write!(buffer, "{value:.6}")?,
                NodeKind::Identifier(name) => buffer.push_str(name),
                NodeKind::Noop => {}
                NodeKind::Invalid { reason } => write!(buffer, "<invalid: {reason}>")?,
            }
        }
        Ok(())
    }
}

/// Output still to be written
enum Piece {
    Node(NodeId),
    Text(&'static str),
}
