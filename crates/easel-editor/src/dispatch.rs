//! The single event dispatcher.
//!
//! Routes each `EditorEvent` to one tool by its source and kind. A drag is
//! captured by the tool that accepted its `DragStart`; every following
//! `DragMove`/`DragEnd` goes to that tool regardless of what the pointer is
//! over by then.

use crate::event::{EditorEvent, EventKind};
use crate::mutation::Mutations;
use crate::tools::{AnchorTool, MoveTool, SelectTool, Tool, ToolKind, TransformTool, ViewTool};
use easel_core::Scene;
use easel_render::Hit;
use smallvec::smallvec;

#[derive(Debug, Default)]
pub struct Dispatcher {
    view: ViewTool,
    anchor: AnchorTool,
    mover: MoveTool,
    transform: TransformTool,
    select: SelectTool,
    captured: Option<ToolKind>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tool owning the drag in progress, if any.
    pub fn captured(&self) -> Option<ToolKind> {
        self.captured
    }

    pub fn dispatch(&mut self, event: &EditorEvent, scene: &Scene) -> Mutations {
        let kind = match event.kind {
            EventKind::DragStart => {
                let kind = Self::drag_owner(event.source);
                self.captured = Some(kind);
                kind
            }
            EventKind::DragMove => match self.captured {
                Some(kind) => kind,
                None => return smallvec![],
            },
            EventKind::DragEnd => match self.captured.take() {
                Some(kind) => kind,
                None => return smallvec![],
            },
            EventKind::Click => ToolKind::Select,
            EventKind::Hover => ToolKind::Anchor,
            EventKind::Wheel => ToolKind::View,
        };
        log::trace!("{:?} {:?} → {kind:?}", event.kind, event.source);
        self.tool(kind).handle(event, scene)
    }

    fn drag_owner(source: Hit) -> ToolKind {
        match source {
            Hit::TransformerHandle(_) => ToolKind::Transform,
            Hit::Anchor(_) => ToolKind::Anchor,
            Hit::Image(_) => ToolKind::Move,
            // Dragging the drawing area itself does nothing; the view tool
            // ignores drags that don't start on the empty stage.
            Hit::DrawingArea | Hit::Stage => ToolKind::View,
        }
    }

    fn tool(&mut self, kind: ToolKind) -> &mut dyn Tool {
        match kind {
            ToolKind::View => &mut self.view,
            ToolKind::Anchor => &mut self.anchor,
            ToolKind::Move => &mut self.mover,
            ToolKind::Transform => &mut self.transform,
            ToolKind::Select => &mut self.select,
        }
    }
}
