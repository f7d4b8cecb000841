use tracing::debug;

use crate::config::LayoutConfig;
use crate::events::NodeAction;
use crate::expansion::ExpansionState;
use crate::layout::{HierarchyLayout, compute_layout};
use crate::model::{Level, Node, find_node};
use crate::tree::build_with_bonus_label;
use crate::zoom::Zoom;

/// Host-facing state of one hierarchy chart.
///
/// Every structural change rebuilds the forest and every expansion change
/// relays out the whole forest, each exactly once. Zoom never relays out.
#[derive(Debug, Clone)]
pub struct HierarchyView {
    config: LayoutConfig,
    roots: Vec<Node>,
    expansion: ExpansionState,
    zoom: Zoom,
    layout: HierarchyLayout,
    relayouts: usize,
}

impl HierarchyView {
    pub fn new(config: LayoutConfig) -> Self {
        let expansion = ExpansionState::new();
        let layout = compute_layout(&[], &expansion, &config);
        Self {
            config,
            roots: Vec::new(),
            expansion,
            zoom: Zoom::default(),
            layout,
            relayouts: 0,
        }
    }

    pub fn from_levels(levels: &[Level], config: LayoutConfig) -> Self {
        let mut view = Self::new(config);
        view.set_levels(levels);
        view
    }

    pub fn set_levels(&mut self, levels: &[Level]) {
        self.roots = build_with_bonus_label(levels, &self.config.bonus_role_label);
        let added = self.expansion.absorb(&self.roots);
        debug!(roots = self.roots.len(), added, "hierarchy rebuilt");
        self.relayout();
    }

    /// Flips one node and relays out. Returns whether it is now expanded.
    pub fn toggle(&mut self, node_id: &str) -> bool {
        let expanded = self.expansion.toggle(node_id);
        self.relayout();
        expanded
    }

    pub fn expand_all(&mut self) {
        self.expansion.expand_all(&self.roots);
        self.relayout();
    }

    pub fn collapse_all(&mut self) {
        self.expansion.collapse_all();
        self.relayout();
    }

    /// Replaces the zoom level without touching the layout.
    pub fn set_zoom(&mut self, zoom: Zoom) {
        self.zoom = zoom;
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom.zoom_out()
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.zoom.viewport(&self.layout)
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn layout(&self) -> &HierarchyLayout {
        &self.layout
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn relayout_count(&self) -> usize {
        self.relayouts
    }

    /// True when there is nothing to draw; adapters show an empty state.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Passes an action through when it targets a node of the current forest.
    pub fn request(&self, action: NodeAction) -> Option<NodeAction> {
        if find_node(&self.roots, action.node_id()).is_none() {
            debug!(node = action.node_id(), "ignoring action for unknown node");
            return None;
        }
        Some(action)
    }

    fn relayout(&mut self) {
        self.layout = compute_layout(&self.roots, &self.expansion, &self.config);
        self.relayouts += 1;
    }
}
