//! Flame graph layout and rendering.
//!
//! [`layout`] maps a validated tree onto a grid of terminal cells: each node
//! becomes a [`FlameFrame`] whose width is proportional to its share of the
//! root's value, one row per tree level with the root on top. [`FlameGraph`]
//! paints those frames with ratatui.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::parser::Node;

/// Size of the drawing surface in cells. Both sides are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlameDimensions {
    width: u16,
    height: u16,
}

impl FlameDimensions {
    /// Returns `None` unless both dimensions are positive.
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if width > 0 && height > 0 {
            Some(Self { width, height })
        } else {
            None
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }
}

/// One laid-out node.
#[derive(Debug, Clone, PartialEq)]
pub struct FlameFrame {
    pub name: String,
    pub value: f64,
    /// Leftmost cell, relative to the drawing surface.
    pub x: u16,
    /// Width in cells, at least 1.
    pub width: u16,
    /// Row, equal to the node's depth (root = 0).
    pub depth: u16,
    pub tooltip: Option<String>,
    pub background_color: Option<String>,
    pub color: Option<String>,
}

/// Lays out `root` within `dims`.
///
/// Children are packed left to right from their parent's left edge and
/// clipped to the parent's extent, so a parent that reports less than its
/// children simply cuts them off. Nodes with non-positive value, frames
/// narrower than one cell, and levels below the bottom row are dropped along
/// with their descendants. Frames come out in pre-order.
pub fn layout(root: &Node, dims: FlameDimensions) -> Vec<FlameFrame> {
    let mut frames = Vec::new();
    if root.value <= 0.0 {
        return frames;
    }

    let scale = f64::from(dims.width) / root.value;
    // (node, left edge, right limit, depth), in fractional cells
    let mut stack: Vec<(&Node, f64, f64, u16)> = vec![(root, 0.0, f64::from(dims.width), 0)];

    while let Some((node, left, limit, depth)) = stack.pop() {
        if depth >= dims.height || node.value <= 0.0 {
            continue;
        }

        let right = (left + node.value * scale).min(limit);
        let x0 = left.round();
        let x1 = right.round();
        if x1 <= x0 {
            continue;
        }

        frames.push(FlameFrame {
            name: node.name.clone(),
            value: node.value,
            x: x0 as u16,
            width: (x1 - x0) as u16,
            depth,
            tooltip: node.tooltip.clone(),
            background_color: node.background_color.clone(),
            color: node.color.clone(),
        });

        let mut cursor = left;
        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            if cursor >= right {
                break;
            }
            children.push((child, cursor, right, depth + 1));
            cursor += child.value.max(0.0) * scale;
        }
        // Reversed so the first child is popped first.
        stack.extend(children.into_iter().rev());
    }

    frames
}

/// Number of tree levels below and including `root`.
pub fn tree_height(root: &Node) -> usize {
    let mut max_depth = 0;
    let mut stack = vec![(root, 1usize)];
    while let Some((node, depth)) = stack.pop() {
        max_depth = max_depth.max(depth);
        stack.extend(node.children.iter().map(|c| (c, depth + 1)));
    }
    max_depth
}

/// Deterministic warm color for a frame without an explicit background.
pub fn default_color(name: &str) -> Color {
    let hash = name
        .bytes()
        .fold(5381u32, |h, b| h.wrapping_mul(33).wrapping_add(u32::from(b)));
    let r = 205 + (hash % 50) as u8;
    let g = 80 + ((hash / 50) % 120) as u8;
    let b = 40 + ((hash / 6000) % 40) as u8;
    Color::Rgb(r, g, b)
}

/// Parses a display color: `#rrggbb`, an ANSI color name, or an index.
pub fn parse_color(value: &str) -> Option<Color> {
    value.trim().parse::<Color>().ok()
}

/// Widget that paints laid-out frames.
pub struct FlameGraph<'a> {
    frames: &'a [FlameFrame],
    highlight: Option<&'a str>,
}

impl<'a> FlameGraph<'a> {
    pub fn new(frames: &'a [FlameFrame]) -> Self {
        Self {
            frames,
            highlight: None,
        }
    }

    /// Emphasizes every frame named `name`.
    pub fn highlight(mut self, name: Option<&'a str>) -> Self {
        self.highlight = name;
        self
    }
}

impl Widget for FlameGraph<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for frame in self.frames {
            if frame.depth >= area.height || frame.x >= area.width {
                continue;
            }
            let x = area.x + frame.x;
            let y = area.y + frame.depth;
            let width = frame.width.min(area.width - frame.x);

            let background = frame
                .background_color
                .as_deref()
                .and_then(parse_color)
                .unwrap_or_else(|| default_color(&frame.name));
            let foreground = frame
                .color
                .as_deref()
                .and_then(parse_color)
                .unwrap_or(Color::Black);

            let mut style = Style::default().bg(background).fg(foreground);
            if self.highlight == Some(frame.name.as_str()) {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }

            buf.set_style(Rect::new(x, y, width, 1), style);
            // One cell of padding on the right keeps neighbours readable.
            let label_width = usize::from(width.saturating_sub(1));
            if label_width > 0 {
                buf.set_stringn(x, y, &frame.name, label_width, style);
            }
        }
    }
}
