//! HTTP handlers.

pub mod audio;
pub mod chat;
pub mod health;
