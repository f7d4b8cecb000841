use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CommissionKind {
    #[default]
    Percentage,
    Fixed,
    Tiered,
}

/// Who a member stands for. Exactly one of a user or a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubjectRef {
    User(String),
    Team(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub display_name: String,
    pub subject: SubjectRef,
    pub manager_member_id: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: String,
    pub name: String,
    pub priority: i32,
    pub commission_kind: CommissionKind,
    pub is_bonus: bool,
    pub members: Vec<Member>,
}

impl Member {
    pub fn user(id: &str, display_name: &str, user_id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            subject: SubjectRef::User(user_id.to_string()),
            manager_member_id: None,
            avatar: None,
        }
    }

    pub fn team(id: &str, display_name: &str, team_id: &str) -> Self {
        Self {
            subject: SubjectRef::Team(team_id.to_string()),
            ..Self::user(id, display_name, "")
        }
    }

    pub fn managed_by(mut self, manager_id: &str) -> Self {
        self.manager_member_id = Some(manager_id.to_string());
        self
    }
}

impl Level {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            priority: 0,
            commission_kind: CommissionKind::default(),
            is_bonus: false,
            members: Vec::new(),
        }
    }

    pub fn bonus(id: &str, name: &str) -> Self {
        Self {
            is_bonus: true,
            ..Self::new(id, name)
        }
    }

    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }
}

/// A vertex of the built forest. Children are owned by their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    pub role: String,
    pub descendant_count: usize,
    pub is_bonus: bool,
    pub avatar: Option<String>,
    pub is_first_root: bool,
    pub is_leaf: bool,
    pub children: Vec<Node>,
}

impl Node {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Pre-order traversal of this node and everything below it.
    pub fn walk(&self) -> NodeWalk<'_> {
        NodeWalk { stack: vec![self] }
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.walk().find(|node| node.id == id)
    }

    /// Counts descendants by traversal instead of trusting `descendant_count`.
    pub fn strict_descendants(&self) -> usize {
        self.walk().count() - 1
    }
}

// Management chains can be thousands of levels deep; unlink them one node at a
// time instead of letting drop glue recurse.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[derive(Debug)]
pub struct NodeWalk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for NodeWalk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

pub fn find_node<'a>(roots: &'a [Node], id: &str) -> Option<&'a Node> {
    roots.iter().find_map(|root| root.find(id))
}

/// Id lookup over the whole forest. A repeated id resolves to its first
/// occurrence in pre-order, the one layout places.
pub fn index_nodes(roots: &[Node]) -> HashMap<&str, &Node> {
    let mut index = HashMap::new();
    for node in roots.iter().flat_map(Node::walk) {
        index.entry(node.id.as_str()).or_insert(node);
    }
    index
}

pub fn all_node_ids(roots: &[Node]) -> Vec<String> {
    roots
        .iter()
        .flat_map(Node::walk)
        .map(|node| node.id.clone())
        .collect()
}
