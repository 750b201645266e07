//! Core scene-graph data model.
//!
//! The scene is a tree: the stage owns layers, layers own shapes and images.
//! Edges go parent → child and each parent keeps an explicit child order,
//! which is also the paint order (first child is painted first).

use crate::area::AnchorRole;
use crate::id::NodeId;
use kurbo::{Affine, Point, Rect, Vec2};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

// ─── Colors & Paint ──────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
///
/// Serializes as a hex string (`#RRGGBB` or `#RRGGBBAA`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a)
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let pair = |i: usize| -> Option<u8> { Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) };

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])? * 17;
                let g = hex_val(bytes[1])? * 17;
                let b = hex_val(bytes[2])? * 17;
                Some(Self::rgba8(r, g, b, 1.0))
            }
            6 => Some(Self::rgba8(pair(0)?, pair(2)?, pair(4)?, 1.0)),
            8 => Some(Self::rgba8(
                pair(0)?,
                pair(2)?,
                pair(4)?,
                pair(6)? as f32 / 255.0,
            )),
            _ => None,
        }
    }

    /// Quantize to 8-bit straight-alpha channels.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// CSS color string for Canvas2D fill/stroke styles.
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {})", self.a.clamp(0.0, 1.0))
    }

    /// Same color with its alpha multiplied by `opacity`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: self.a * opacity.clamp(0.0, 1.0),
            ..self
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid hex color `{value}`"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Fill paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// The repeating grid tile, anchored at the shape's top-left corner.
    GridPattern,
}

// ─── Styling ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub opacity: f32,
}

/// Visual attributes of a shape node.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Option<Paint>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub corner_radius: f64,
    pub opacity: f32,
    pub shadow: Option<Shadow>,
    /// Dash pattern for strokes. Empty = solid.
    pub dash: SmallVec<[f64; 2]>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 0.0,
            opacity: 1.0,
            shadow: None,
            dash: SmallVec::new(),
        }
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Axis-aligned box in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.right(), self.bottom())
    }

    pub fn approx_eq(&self, other: &Bounds, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.width - other.width).abs() <= eps
            && (self.height - other.height).abs() <= eps
    }
}

// ─── Bitmaps ─────────────────────────────────────────────────────────────

/// Handle into the scene's bitmap store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitmapId(pub u32);

/// A decoded image: straight-alpha RGBA8, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<Vec<u8>>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels: Arc::new(pixels),
        }
    }

    /// Solid-color bitmap, handy for placeholders and tests.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, pixels)
    }
}

// ─── Scene Graph Nodes ───────────────────────────────────────────────────

/// The node kinds in the scene tree.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Root of the tree; spans the whole canvas surface.
    Stage,

    /// A render layer. `clip` restricts painting (and hit testing) of its
    /// children to a content-space box.
    Layer { clip: Option<Bounds> },

    Rect { width: f64, height: f64 },

    /// An uploaded image, drawn stretched to `width × height`.
    Image {
        width: f64,
        height: f64,
        bitmap: BitmapId,
    },

    /// One of the four drawing-area resize handles.
    Anchor {
        role: AnchorRole,
        width: f64,
        height: f64,
    },

    /// The resize/rotate overlay. Its geometry is derived from its target.
    Transformer,
}

/// A single node in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in degrees, clockwise, around the node origin.
    pub rotation: f64,
    pub style: Style,
    pub draggable: bool,
    pub visible: bool,
    /// Whether hit testing considers this node.
    pub listening: bool,
    pub name: Option<String>,
}

impl SceneNode {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            style: Style::default(),
            draggable: false,
            visible: true,
            listening: true,
            name: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Unscaled size, for kinds that have one.
    pub fn size(&self) -> Option<(f64, f64)> {
        match self.kind {
            NodeKind::Rect { width, height }
            | NodeKind::Image { width, height, .. }
            | NodeKind::Anchor { width, height, .. } => Some((width, height)),
            _ => None,
        }
    }

    pub fn set_size(&mut self, w: f64, h: f64) {
        match &mut self.kind {
            NodeKind::Rect { width, height }
            | NodeKind::Image { width, height, .. }
            | NodeKind::Anchor { width, height, .. } => {
                *width = w;
                *height = h;
            }
            _ => {}
        }
    }

    /// Size after applying the node's scale.
    pub fn scaled_size(&self) -> (f64, f64) {
        let (w, h) = self.size().unwrap_or((0.0, 0.0));
        (w * self.scale_x, h * self.scale_y)
    }

    /// Unrotated, unscaled box at the node's position.
    pub fn bounds(&self) -> Bounds {
        let (w, h) = self.size().unwrap_or((0.0, 0.0));
        Bounds::new(self.x, self.y, w, h)
    }

    /// Local → parent transform: translate, then rotate, then scale.
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Whether a parent-space point falls inside the node's (possibly
    /// rotated and scaled) box.
    pub fn contains(&self, p: Point) -> bool {
        let Some((w, h)) = self.size() else {
            return false;
        };
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return false;
        }
        let local = self.transform().inverse() * p;
        local.x >= 0.0 && local.x <= w && local.y >= 0.0 && local.y <= h
    }
}

// ─── Scene Graph ─────────────────────────────────────────────────────────

/// Tree of `SceneNode` values rooted at the stage.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub graph: StableDiGraph<SceneNode, ()>,
    pub root: NodeIndex,
    /// Index from NodeId → NodeIndex for fast lookup.
    pub id_index: HashMap<NodeId, NodeIndex>,
    /// Paint order of each parent's children.
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl SceneGraph {
    /// Create a graph holding only the stage node.
    #[must_use]
    pub fn new(stage: SceneNode) -> Self {
        let mut graph = StableDiGraph::new();
        let id = stage.id;
        let root = graph.add_node(stage);
        let mut id_index = HashMap::new();
        id_index.insert(id, root);

        Self {
            graph,
            root,
            id_index,
            child_order: HashMap::new(),
        }
    }

    /// Append a node as the topmost child of `parent`.
    pub fn add_node(&mut self, parent: NodeIndex, node: SceneNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        self.id_index.insert(id, idx);
        self.child_order.entry(parent).or_default().push(idx);
        idx
    }

    pub fn get_by_id(&self, id: NodeId) -> Option<&SceneNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn get_by_id_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children of a node in paint order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.child_order.get(&idx).cloned().unwrap_or_default()
    }

    /// Move a node to the end of its parent's paint order.
    /// Returns true if the order changed.
    pub fn move_to_top(&mut self, idx: NodeIndex) -> bool {
        self.reorder(idx, |order, pos| {
            let child = order.remove(pos);
            order.push(child);
        })
    }

    /// Move a node to the start of its parent's paint order.
    pub fn move_to_bottom(&mut self, idx: NodeIndex) -> bool {
        self.reorder(idx, |order, pos| {
            let child = order.remove(pos);
            order.insert(0, child);
        })
    }

    fn reorder(&mut self, idx: NodeIndex, f: impl FnOnce(&mut Vec<NodeIndex>, usize)) -> bool {
        let Some(parent) = self.parent(idx) else {
            return false;
        };
        let Some(order) = self.child_order.get_mut(&parent) else {
            return false;
        };
        let Some(pos) = order.iter().position(|&c| c == idx) else {
            return false;
        };
        let before = order.clone();
        f(order, pos);
        *order != before
    }
}
