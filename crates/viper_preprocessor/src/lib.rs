#![doc = include_str!("../README.md")]

pub mod cursor;
pub mod directive;
pub mod graph;
pub mod macros;
mod preprocessor;
pub mod resolver;

pub use self::{
    macros::{Macro, MacroKind, MacroTable},
    preprocessor::{PreprocessContext, PreprocessOutput, Preprocessor},
    resolver::ModuleResolver,
};
