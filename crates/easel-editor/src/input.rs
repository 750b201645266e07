//! Input abstraction layer.
//!
//! Normalizes mouse, touch and wheel events into a unified `InputEvent`.
//! Coordinates are in screen (canvas) pixels.

use kurbo::Point;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }
}

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start).
    PointerDown { x: f64, y: f64, modifiers: Modifiers },

    /// Pointer moved (mouse move, touch move).
    PointerMove { x: f64, y: f64, modifiers: Modifiers },

    /// Pointer released.
    PointerUp { x: f64, y: f64, modifiers: Modifiers },

    /// Pointer lost by the platform (touch interrupted, capture lost).
    /// Ends any drag but never counts as a click.
    PointerCancel { x: f64, y: f64, modifiers: Modifiers },

    /// Wheel / trackpad scroll or pinch at the pointer position.
    Wheel {
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn cancel(x: f64, y: f64) -> Self {
        Self::PointerCancel {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn wheel(x: f64, y: f64, dx: f64, dy: f64, modifiers: Modifiers) -> Self {
        Self::Wheel {
            x,
            y,
            dx,
            dy,
            modifiers,
        }
    }

    /// Screen position of the event.
    pub fn position(&self) -> Point {
        match *self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::PointerCancel { x, y, .. }
            | Self::Wheel { x, y, .. } => Point::new(x, y),
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match *self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::PointerCancel { modifiers, .. }
            | Self::Wheel { modifiers, .. } => modifiers,
        }
    }
}
