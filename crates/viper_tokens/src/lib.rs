#![doc = include_str!("../README.md")]

pub mod spanned;
pub mod token;

pub use self::{
    spanned::{Span, Spanned},
    token::{Token, TokenKind, TokenStream},
};
