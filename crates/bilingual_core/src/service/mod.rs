//! Use-case services over the content store.
//!
//! # Responsibility
//! - Keep the link symmetry rule in one place (`link_registry`).
//! - Translate host lifecycle points into explicit calls (`site`).
//! - Keep host adapters decoupled from storage details.

pub mod category;
pub mod link_registry;
pub mod permalink;
pub mod save_guard;
pub mod site;
pub mod template;
