use std::collections::BTreeSet;

use crate::model::Node;

/// Ids whose children take part in layout.
///
/// Kept outside the nodes so a built forest can be reused across relayouts.
/// Ids are only ever compared, so an id that vanished in a rebuild is inert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: BTreeSet<String>,
    // Every id this state has been offered; new ids start expanded.
    known: BTreeSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fully_expanded(roots: &[Node]) -> Self {
        let mut state = Self::new();
        state.absorb(roots);
        state
    }

    /// Expands ids seen for the first time; keeps the state of known ids.
    /// Returns how many ids were new.
    pub fn absorb(&mut self, roots: &[Node]) -> usize {
        let mut added = 0;
        for node in roots.iter().flat_map(Node::walk) {
            if self.known.insert(node.id.clone()) {
                self.expanded.insert(node.id.clone());
                added += 1;
            }
        }
        added
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Flips the id and returns whether it is now expanded.
    pub fn toggle(&mut self, id: &str) -> bool {
        self.known.insert(id.to_string());
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn expand(&mut self, id: &str) {
        self.known.insert(id.to_string());
        self.expanded.insert(id.to_string());
    }

    pub fn collapse(&mut self, id: &str) {
        self.known.insert(id.to_string());
        self.expanded.remove(id);
    }

    pub fn expand_all(&mut self, roots: &[Node]) {
        for node in roots.iter().flat_map(Node::walk) {
            self.expand(&node.id);
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn expanded_ids(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let expanded: BTreeSet<String> = iter.into_iter().map(Into::into).collect();
        Self {
            known: expanded.clone(),
            expanded,
        }
    }
}
