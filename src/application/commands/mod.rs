// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between UI and Services
// - Commands return DTOs
// - Commands serialize errors as ErrorResponse JSON
// - Commands NEVER contain business logic

pub mod favorite_commands;
pub mod session_commands;

pub use favorite_commands::*;
pub use session_commands::*;
