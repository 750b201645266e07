//! Typed editor events.
//!
//! Raw input is recognized into gestures (drag, click, hover, wheel) and
//! tagged with what was under the pointer when the gesture began. Every
//! event carries both screen and content coordinates so tools never need
//! the view to convert.

use crate::input::Modifiers;
use easel_render::Hit;
use kurbo::{Point, Vec2};

/// The gesture an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    DragStart,
    DragMove,
    DragEnd,
    /// Press and release without travelling past the click tolerance.
    Click,
    /// Pointer moved with no button held.
    Hover,
    Wheel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payload {
    pub screen: Point,
    pub content: Point,
    /// Screen-space movement since the previous event of this gesture.
    pub screen_delta: Vec2,
    /// Content-space movement since the previous event of this gesture.
    pub content_delta: Vec2,
    /// Wheel deltas; zero for pointer events.
    pub wheel: Vec2,
    pub modifiers: Modifiers,
}

impl Payload {
    pub fn at(screen: Point, content: Point, modifiers: Modifiers) -> Self {
        Self {
            screen,
            content,
            screen_delta: Vec2::ZERO,
            content_delta: Vec2::ZERO,
            wheel: Vec2::ZERO,
            modifiers,
        }
    }
}

/// `{ source, kind, payload }`: what, which gesture, and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorEvent {
    pub source: Hit,
    pub kind: EventKind,
    pub payload: Payload,
}

impl EditorEvent {
    pub fn new(source: Hit, kind: EventKind, payload: Payload) -> Self {
        Self {
            source,
            kind,
            payload,
        }
    }
}
