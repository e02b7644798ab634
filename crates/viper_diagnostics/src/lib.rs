#![doc = include_str!("../README.md")]

mod collection;
mod diagnostic;

pub use self::{
    collection::Diagnostics,
    diagnostic::{Diagnostic, DiagnosticKind, ErrorLevel, Location, SourceLookup},
};
