use serde::Serialize;

use super::connector::CubicPath;

/// Center-top anchor of a rendered card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub node_id: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub from: String,
    pub to: String,
    pub path: CubicPath,
    pub is_bonus: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyLayout {
    pub positions: Vec<Position>,
    pub connectors: Vec<Connector>,
    pub width: f32,
    pub height: f32,
}

impl HierarchyLayout {
    pub fn position(&self, node_id: &str) -> Option<&Position> {
        self.positions.iter().find(|pos| pos.node_id == node_id)
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
