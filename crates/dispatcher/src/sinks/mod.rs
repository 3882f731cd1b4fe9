//! Emitter implementations
//!
//! Contains DebugEmitter and FileEmitter.

mod debug;
mod file;

pub use self::debug::DebugEmitter;
pub use self::file::FileEmitter;
