use serde::Serialize;

/// Requests raised from a rendered card, handed back to the structure editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "nodeId", rename_all = "camelCase")]
pub enum NodeAction {
    AddSubordinate(String),
    Remove(String),
    Edit(String),
}

impl NodeAction {
    pub fn node_id(&self) -> &str {
        match self {
            Self::AddSubordinate(id) | Self::Remove(id) | Self::Edit(id) => id,
        }
    }
}
