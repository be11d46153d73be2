//! Inline reference syntax for linking notes to notables.
//!
//! # Responsibility
//! - Define the per-kind token grammar (`@`, `:`, `#` triggers).
//! - Scan note content for tokens and check bracket well-formedness.
//!
//! # Invariants
//! - Everything here is pure; no storage access.
//! - Token format is bit-exact: `@[Name](@123)`, `:[Name](:123)`, `#[Name](#123)`.

pub mod grammar;
pub mod scanner;
pub mod validator;
