//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep CLI layers decoupled from storage details.

pub mod record_service;
pub mod settings_service;
