//! Interactive editing for Easel scenes.
//!
//! Raw pointer and wheel input is recognized into typed gestures, routed
//! through one dispatcher to the tools, and the resulting mutations are
//! applied by [`SyncEngine`].

pub mod dispatch;
pub mod engine;
pub mod event;
pub mod input;
pub mod mutation;
pub mod tools;
pub mod upload;

pub use engine::SyncEngine;
pub use event::{EditorEvent, EventKind, Payload};
pub use input::{InputEvent, Modifiers};
pub use mutation::{SceneMutation, apply};
