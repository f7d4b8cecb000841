use crate::expansion::ExpansionState;
use crate::layout::HierarchyLayout;
use crate::model::{Node, index_nodes};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub connectors: Vec<ConnectorDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub role: String,
    pub x: f32,
    pub y: f32,
    pub is_bonus: bool,
    pub descendant_count: usize,
    pub expanded: bool,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    pub from: String,
    pub to: String,
    pub is_bonus: bool,
    pub d: String,
    pub points: [[f32; 2]; 4],
}

impl LayoutDump {
    pub fn from_layout(layout: &HierarchyLayout, roots: &[Node], expansion: &ExpansionState) -> Self {
        let index = index_nodes(roots);
        let nodes = layout
            .positions
            .iter()
            .filter_map(|pos| {
                let node = index.get(pos.node_id.as_str())?;
                Some(NodeDump {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    role: node.role.clone(),
                    x: pos.x,
                    y: pos.y,
                    is_bonus: node.is_bonus,
                    descendant_count: node.descendant_count,
                    expanded: node.has_children() && expansion.is_expanded(&node.id),
                })
            })
            .collect();

        let connectors = layout
            .connectors
            .iter()
            .map(|connector| {
                let path = &connector.path;
                ConnectorDump {
                    from: connector.from.clone(),
                    to: connector.to.clone(),
                    is_bonus: connector.is_bonus,
                    d: path.to_svg_path(),
                    points: [path.start, path.control1, path.control2, path.end]
                        .map(|(x, y)| [x, y]),
                }
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            nodes,
            connectors,
        }
    }
}

pub fn write_layout_dump(
    path: Option<&Path>,
    layout: &HierarchyLayout,
    roots: &[Node],
    expansion: &ExpansionState,
) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout, roots, expansion);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }
    Ok(())
}
