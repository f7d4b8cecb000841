use std::collections::HashMap;
use std::collections::hash_map::Entry;

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{Level, Member, Node};

/// Role shown on members of bonus levels, regardless of the level's own name.
pub const BONUS_ROLE: &str = "Bonus";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("member id `{id}` appears in level `{first_level}` and again in level `{second_level}`")]
    DuplicateMember {
        id: String,
        first_level: String,
        second_level: String,
    },
    #[error("manager references of member `{id}` loop back onto itself")]
    ManagerCycle { id: String },
}

struct RawMember<'a> {
    member: &'a Member,
    level_id: &'a str,
    role: &'a str,
    is_bonus: bool,
}

struct Plan<'a> {
    raw: Vec<RawMember<'a>>,
    parent: Vec<Option<usize>>,
    issues: Vec<BuildError>,
}

/// Builds the forest of root nodes from a level snapshot.
///
/// Never fails: dangling manager references and cycle-closing references turn
/// the member into a root, and repeated member ids keep their first occurrence.
/// Everything other than a plain dangling reference is logged at warn level.
pub fn build(levels: &[Level]) -> Vec<Node> {
    build_with_bonus_label(levels, BONUS_ROLE)
}

pub fn build_with_bonus_label(levels: &[Level], bonus_label: &str) -> Vec<Node> {
    let plan = plan(levels, bonus_label);
    for issue in &plan.issues {
        warn!(%issue, "demoting or dropping member while building hierarchy");
    }
    let mut roots = assemble(&plan);
    finalize(&mut roots);
    debug!(
        members = plan.raw.len(),
        roots = roots.len(),
        "built commission hierarchy"
    );
    roots
}

/// Strict check for callers that want malformed wiring rejected instead of
/// repaired. Returns the first issue in flattening order.
pub fn validate(levels: &[Level]) -> Result<(), BuildError> {
    match plan(levels, BONUS_ROLE).issues.into_iter().next() {
        Some(issue) => Err(issue),
        None => Ok(()),
    }
}

/// Recomputes `is_leaf`, `descendant_count` and `is_first_root` bottom-up.
pub fn finalize(roots: &mut [Node]) {
    for (idx, root) in roots.iter_mut().enumerate() {
        *root = finalize_tree(std::mem::take(root));
        root.is_first_root = idx == 0;
    }
}

/// A node whose children are detached while they are finalized.
struct FinalizeFrame {
    node: Node,
    pending: std::vec::IntoIter<Node>,
    done: Vec<Node>,
    count: usize,
}

impl FinalizeFrame {
    fn open(mut node: Node) -> Self {
        let children = std::mem::take(&mut node.children);
        Self {
            node,
            done: Vec::with_capacity(children.len()),
            pending: children.into_iter(),
            count: 0,
        }
    }

    fn adopt(&mut self, child: Node) {
        self.count += 1 + child.descendant_count;
        self.done.push(child);
    }

    fn close(mut self) -> Node {
        self.node.is_leaf = self.done.is_empty();
        self.node.descendant_count = self.count;
        self.node.is_first_root = false;
        self.node.children = self.done;
        self.node
    }
}

// Post-order over an explicit stack so chain depth never reaches the call stack.
fn finalize_tree(root: Node) -> Node {
    let mut stack = vec![FinalizeFrame::open(root)];
    let mut finished = None;
    while let Some(frame) = stack.last_mut() {
        if let Some(child) = frame.pending.next() {
            stack.push(FinalizeFrame::open(child));
            continue;
        }
        if let Some(frame) = stack.pop() {
            let node = frame.close();
            match stack.last_mut() {
                Some(parent) => parent.adopt(node),
                None => finished = Some(node),
            }
        }
    }
    finished.unwrap_or_default()
}

fn plan<'a>(levels: &'a [Level], bonus_label: &'a str) -> Plan<'a> {
    let mut raw: Vec<RawMember<'a>> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut issues = Vec::new();

    for level in levels {
        let role = if level.is_bonus {
            bonus_label
        } else {
            level.name.as_str()
        };
        for member in &level.members {
            match index.entry(member.id.as_str()) {
                Entry::Occupied(existing) => {
                    issues.push(BuildError::DuplicateMember {
                        id: member.id.clone(),
                        first_level: raw[*existing.get()].level_id.to_string(),
                        second_level: level.id.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(raw.len());
                    raw.push(RawMember {
                        member,
                        level_id: level.id.as_str(),
                        role,
                        is_bonus: level.is_bonus,
                    });
                }
            }
        }
    }

    let mut parent: Vec<Option<usize>> = vec![None; raw.len()];
    let mut links: Vec<usize> = (0..raw.len()).collect();
    for (idx, entry) in raw.iter().enumerate() {
        let Some(manager_id) = entry.member.manager_member_id.as_deref() else {
            continue;
        };
        let Some(&manager) = index.get(manager_id) else {
            debug!(
                member = %entry.member.id,
                manager = manager_id,
                "manager not in snapshot, member becomes a root"
            );
            continue;
        };
        // Each member is wired once, so it is still the top of its own chain here.
        if chain_top(&mut links, manager) == idx {
            issues.push(BuildError::ManagerCycle {
                id: entry.member.id.clone(),
            });
            continue;
        }
        parent[idx] = Some(manager);
        links[idx] = manager;
    }

    Plan {
        raw,
        parent,
        issues,
    }
}

/// Topmost manager above `member` over the edges accepted so far. Paths are
/// compressed as they are walked, so long chains stay cheap to query.
fn chain_top(links: &mut [usize], member: usize) -> usize {
    let mut top = member;
    while links[top] != top {
        top = links[top];
    }
    let mut cursor = member;
    while links[cursor] != top {
        let next = links[cursor];
        links[cursor] = top;
        cursor = next;
    }
    top
}

fn assemble(plan: &Plan<'_>) -> Vec<Node> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); plan.raw.len()];
    let mut roots = Vec::new();
    for (idx, parent) in plan.parent.iter().enumerate() {
        match parent {
            Some(parent) => children[*parent].push(idx),
            None => roots.push(idx),
        }
    }
    // Children are created before their parents and moved in once finished.
    let mut built: Vec<Option<Node>> = std::iter::repeat_with(|| None)
        .take(plan.raw.len())
        .collect();
    for &root in &roots {
        let mut stack = vec![(root, false)];
        while let Some((idx, ready)) = stack.pop() {
            if ready {
                let kids = children[idx]
                    .iter()
                    .filter_map(|&child| built[child].take())
                    .collect();
                built[idx] = Some(new_node(&plan.raw[idx], kids));
            } else {
                stack.push((idx, true));
                stack.extend(children[idx].iter().map(|&child| (child, false)));
            }
        }
    }
    roots
        .into_iter()
        .filter_map(|idx| built[idx].take())
        .collect()
}

fn new_node(entry: &RawMember<'_>, children: Vec<Node>) -> Node {
    Node {
        id: entry.member.id.clone(),
        name: entry.member.display_name.clone(),
        role: entry.role.to_string(),
        descendant_count: 0,
        is_bonus: entry.is_bonus,
        avatar: entry.member.avatar.clone(),
        is_first_root: false,
        is_leaf: false,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::all_node_ids;

    fn ids(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn empty_snapshot_has_no_roots() {
        assert!(build(&[]).is_empty());
        assert!(build(&[Level::new("l1", "Directors")]).is_empty());
    }

    #[test]
    fn manager_links_cross_levels() {
        let levels = vec![
            Level::new("l1", "Director").with_members(vec![Member::user("r", "Rita", "u1")]),
            Level::new("l2", "Agent").with_members(vec![
                Member::user("a", "Ana", "u2").managed_by("r"),
                Member::user("b", "Bo", "u3").managed_by("r"),
            ]),
        ];
        let roots = build(&levels);
        assert_eq!(ids(&roots), ["r"]);
        let root = &roots[0];
        assert_eq!(root.role, "Director");
        assert_eq!(ids(&root.children), ["a", "b"]);
        assert_eq!(root.descendant_count, 2);
        assert!(root.is_first_root);
        assert!(!root.is_leaf);
        assert!(root.children.iter().all(|c| c.is_leaf && !c.is_first_root));
        assert_eq!(root.children[0].role, "Agent");
    }

    #[test]
    fn dangling_manager_becomes_root() {
        let levels = vec![Level::new("l1", "Agent").with_members(vec![
            Member::user("a", "Ana", "u1"),
            Member::user("b", "Bo", "u2").managed_by("ghost"),
        ])];
        let roots = build(&levels);
        assert_eq!(ids(&roots), ["a", "b"]);
        assert!(roots[0].is_first_root);
        assert!(!roots[1].is_first_root);
        assert_eq!(validate(&levels), Ok(()));
    }

    #[test]
    fn bonus_levels_use_fixed_role() {
        let levels = vec![
            Level::new("l1", "Manager").with_members(vec![Member::user("m", "Mia", "u1")]),
            Level::bonus("l2", "Quarterly kicker")
                .with_members(vec![Member::team("k", "Kicker pool", "t1").managed_by("m")]),
        ];
        let roots = build(&levels);
        let bonus = &roots[0].children[0];
        assert_eq!(bonus.role, BONUS_ROLE);
        assert!(bonus.is_bonus);
        assert!(!roots[0].is_bonus);
        assert_eq!(build_with_bonus_label(&levels, "Bônus")[0].children[0].role, "Bônus");
    }

    #[test]
    fn descendant_count_is_recursive() {
        let levels = vec![Level::new("l1", "Any").with_members(vec![
            Member::user("r", "R", "u"),
            Member::user("a", "A", "u").managed_by("r"),
            Member::user("a1", "A1", "u").managed_by("a"),
            Member::user("a2", "A2", "u").managed_by("a"),
            Member::user("b", "B", "u").managed_by("r"),
        ])];
        let roots = build(&levels);
        assert_eq!(roots[0].descendant_count, 4);
        assert_eq!(roots[0].children[0].descendant_count, 2);
        for node in roots[0].walk() {
            assert_eq!(node.descendant_count, node.strict_descendants());
        }
    }

    #[test]
    fn child_declared_before_manager_still_attaches() {
        let levels = vec![
            Level::new("l2", "Agent").with_members(vec![Member::user("a", "A", "u").managed_by("r")]),
            Level::new("l1", "Director").with_members(vec![Member::user("r", "R", "u")]),
        ];
        let roots = build(&levels);
        assert_eq!(ids(&roots), ["r"]);
        assert!(roots[0].is_first_root);
        assert_eq!(ids(&roots[0].children), ["a"]);
    }

    #[test]
    fn cycle_is_broken_at_closing_member() {
        let levels = vec![Level::new("l1", "Loop").with_members(vec![
            Member::user("a", "A", "u").managed_by("c"),
            Member::user("b", "B", "u").managed_by("a"),
            Member::user("c", "C", "u").managed_by("b"),
        ])];
        let roots = build(&levels);
        assert_eq!(ids(&roots), ["c"]);
        assert_eq!(roots[0].descendant_count, 2);
        assert_eq!(all_node_ids(&roots), ["c", "a", "b"]);
        assert_eq!(
            validate(&levels),
            Err(BuildError::ManagerCycle { id: "c".to_string() })
        );
    }

    #[test]
    fn self_management_is_a_cycle() {
        let levels = vec![
            Level::new("l1", "Solo").with_members(vec![Member::user("s", "S", "u").managed_by("s")]),
        ];
        let roots = build(&levels);
        assert_eq!(ids(&roots), ["s"]);
        assert!(roots[0].is_leaf);
        assert!(validate(&levels).is_err());
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let levels = vec![
            Level::new("l1", "Director").with_members(vec![
                Member::user("r", "Rita", "u1"),
                Member::user("x", "First x", "u2").managed_by("r"),
            ]),
            Level::new("l2", "Agent").with_members(vec![
                Member::user("r2", "Ray", "u3"),
                Member::user("x", "Second x", "u4").managed_by("r2"),
            ]),
        ];
        let roots = build(&levels);
        assert_eq!(ids(&roots), ["r", "r2"]);
        assert_eq!(roots[0].children[0].name, "First x");
        assert!(roots[1].is_leaf);
        assert_eq!(all_node_ids(&roots).len(), 3);
        assert_eq!(
            validate(&levels),
            Err(BuildError::DuplicateMember {
                id: "x".to_string(),
                first_level: "l1".to_string(),
                second_level: "l2".to_string(),
            })
        );
    }

    #[test]
    fn finalize_clears_stale_flags() {
        let levels = vec![Level::new("l1", "Any").with_members(vec![
            Member::user("r", "R", "u"),
            Member::user("a", "A", "u").managed_by("r"),
        ])];
        let mut roots = build(&levels);
        let mut child = roots[0].children.remove(0);
        child.is_first_root = true;
        roots.insert(0, child);
        finalize(&mut roots);
        assert!(roots[0].is_first_root && roots[0].is_leaf);
        assert!(!roots[1].is_first_root);
        assert_eq!(roots[1].descendant_count, 0);
        assert!(roots[1].is_leaf);
    }
}
