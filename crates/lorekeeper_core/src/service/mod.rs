//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Turn repository `NotFound` into typed service errors.
//! - Keep transport layers decoupled from storage details.

pub mod link_service;
pub mod notable_service;
pub mod note_service;
pub mod notebook_service;
