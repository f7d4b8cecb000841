mod connector;
pub(crate) mod types;
pub use connector::CubicPath;
pub use types::*;

use crate::config::LayoutConfig;
use crate::expansion::ExpansionState;
use crate::model::Node;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Lays out the forest top-down, roots side by side.
///
/// Both passes run from scratch on every call: subtree widths are measured
/// into a fresh map, then cards are placed and connectors emitted. Nodes that
/// are not expanded are treated as leaves. A node id met a second time is
/// skipped along with its subtree.
pub fn compute_layout(
    roots: &[Node],
    expansion: &ExpansionState,
    config: &LayoutConfig,
) -> HierarchyLayout {
    let widths = measure_forest(roots, expansion, config);

    let mut placer = Placer {
        expansion,
        config,
        widths: &widths,
        placed: HashSet::new(),
        positions: Vec::new(),
        connectors: Vec::new(),
    };
    let mut cursor_x = config.padding;
    for root in roots {
        if !placer.placed.insert(root.id.as_str()) {
            continue;
        }
        let width = placer.width_of(root);
        placer.place(root, cursor_x, config.padding);
        cursor_x += width + config.horizontal_gap;
    }

    let (width, height) = canvas_size(&placer.positions, config);
    debug!(
        nodes = placer.positions.len(),
        connectors = placer.connectors.len(),
        width,
        height,
        "computed hierarchy layout"
    );
    HierarchyLayout {
        positions: placer.positions,
        connectors: placer.connectors,
        width,
        height,
    }
}

/// Subtree width of every visible node, keyed by node id.
pub fn subtree_widths(
    roots: &[Node],
    expansion: &ExpansionState,
    config: &LayoutConfig,
) -> HashMap<String, f32> {
    measure_forest(roots, expansion, config)
        .into_iter()
        .map(|(id, width)| (id.to_string(), width))
        .collect()
}

fn measure_forest<'a>(
    roots: &'a [Node],
    expansion: &ExpansionState,
    config: &LayoutConfig,
) -> HashMap<&'a str, f32> {
    let mut widths = HashMap::new();
    let mut seen = HashSet::new();
    for root in roots {
        if !seen.insert(root.id.as_str()) {
            warn!(node = %root.id, "node id repeated in forest, skipping subtree");
            continue;
        }
        let mut stack = vec![MeasureFrame::open(root, expansion)];
        while let Some(frame) = stack.last_mut() {
            let children = frame.children;
            if let Some(child) = children.get(frame.next) {
                frame.next += 1;
                if !seen.insert(child.id.as_str()) {
                    warn!(node = %child.id, "node id repeated in forest, skipping subtree");
                    continue;
                }
                stack.push(MeasureFrame::open(child, expansion));
                continue;
            }
            let Some(frame) = stack.pop() else { break };
            let width = frame.width(config);
            widths.insert(frame.node.id.as_str(), width);
            if let Some(parent) = stack.last_mut() {
                parent.total += width;
                parent.count += 1;
            }
        }
    }
    widths
}

fn is_layout_leaf(node: &Node, expansion: &ExpansionState) -> bool {
    node.children.is_empty() || !expansion.is_expanded(&node.id)
}

fn visible_children<'a>(node: &'a Node, expansion: &ExpansionState) -> &'a [Node] {
    if is_layout_leaf(node, expansion) {
        &[]
    } else {
        &node.children
    }
}

/// Pass 1 state for one node: children still to measure and the widths
/// collected so far.
struct MeasureFrame<'a> {
    node: &'a Node,
    children: &'a [Node],
    next: usize,
    total: f32,
    count: usize,
}

impl<'a> MeasureFrame<'a> {
    fn open(node: &'a Node, expansion: &ExpansionState) -> Self {
        Self {
            node,
            children: visible_children(node, expansion),
            next: 0,
            total: 0.0,
            count: 0,
        }
    }

    fn width(&self, config: &LayoutConfig) -> f32 {
        if self.count == 0 {
            return config.card_width;
        }
        let spread = self.total + config.horizontal_gap * (self.count as f32 - 1.0);
        config.card_width.max(spread)
    }
}

struct PlaceFrame<'a> {
    node: &'a Node,
    children: &'a [Node],
    next: usize,
    center_x: f32,
    y: f32,
    cursor_x: f32,
}

struct Placer<'a, 'w> {
    expansion: &'a ExpansionState,
    config: &'a LayoutConfig,
    widths: &'w HashMap<&'a str, f32>,
    placed: HashSet<&'a str>,
    positions: Vec<Position>,
    connectors: Vec<Connector>,
}

impl<'a> Placer<'a, '_> {
    fn width_of(&self, node: &Node) -> f32 {
        self.widths
            .get(node.id.as_str())
            .copied()
            .unwrap_or(self.config.card_width)
    }

    /// Records the card of `node` with its subtree starting at `x`.
    fn open(&mut self, node: &'a Node, x: f32, y: f32) -> PlaceFrame<'a> {
        let center_x = x + self.width_of(node) / 2.0;
        self.positions.push(Position {
            node_id: node.id.clone(),
            x: center_x,
            y,
        });
        PlaceFrame {
            node,
            children: visible_children(node, self.expansion),
            next: 0,
            center_x,
            y,
            cursor_x: x,
        }
    }

    // Pre-order with an explicit stack, so cards and connectors come out in the
    // same order a recursive descent would produce.
    fn place(&mut self, root: &'a Node, x: f32, y: f32) {
        let mut stack = vec![self.open(root, x, y)];
        while let Some(frame) = stack.last_mut() {
            let children = frame.children;
            let Some(child) = children.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            if !self.placed.insert(child.id.as_str()) {
                continue;
            }
            let child_x = frame.cursor_x;
            let child_y = frame.y + self.config.card_height + self.config.vertical_gap;
            let child_width = self.width_of(child);
            frame.cursor_x += child_width + self.config.horizontal_gap;
            self.connectors.push(Connector {
                from: frame.node.id.clone(),
                to: child.id.clone(),
                path: CubicPath::s_curve(
                    (frame.center_x, frame.y + self.config.card_height),
                    (child_x + child_width / 2.0, child_y),
                ),
                is_bonus: child.is_bonus,
            });
            let child_frame = self.open(child, child_x, child_y);
            stack.push(child_frame);
        }
    }
}

fn canvas_size(positions: &[Position], config: &LayoutConfig) -> (f32, f32) {
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for pos in positions {
        max_x = max_x.max(pos.x);
        max_y = max_y.max(pos.y);
    }
    if positions.is_empty() {
        return (config.min_canvas_width, config.min_canvas_height);
    }
    let width = (max_x + config.card_width / 2.0 + config.padding).max(config.min_canvas_width);
    let height = (max_y + config.card_height + config.padding).max(config.min_canvas_height);
    (width, height)
}
