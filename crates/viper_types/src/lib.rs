#![doc = include_str!("../README.md")]

pub mod primitive;

pub use primitive::PrimitiveType;
