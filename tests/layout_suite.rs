use std::path::{Path, PathBuf};

use commission_tree::input::parse_levels_json5;
use commission_tree::{
    BuildError, ExpansionState, HierarchyView, LayoutConfig, Level, Member, build,
    compute_layout, parse_levels, validate,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> Vec<Level> {
    let path = fixture_path(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    if name.ends_with(".json5") {
        parse_levels_json5(&input).expect("fixture parse failed")
    } else {
        parse_levels(&input).expect("fixture parse failed")
    }
}

fn xy(view: &HierarchyView, id: &str) -> (f32, f32) {
    let pos = view
        .layout()
        .position(id)
        .unwrap_or_else(|| panic!("{id}: no position"));
    (pos.x, pos.y)
}

#[test]
fn all_fixtures_lay_out() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = [
        "basic.json",
        "multi_root_bonus.json",
        "cycle.json5",
        "empty.json",
    ];
    for name in fixtures {
        assert!(fixture_path(name).exists(), "fixture missing: {name}");
        let levels = load_fixture(name);
        let view = HierarchyView::from_levels(&levels, LayoutConfig::default());
        let layout = view.layout();
        let member_count: usize = levels.iter().map(|level| level.members.len()).sum();
        assert_eq!(layout.positions.len(), member_count, "{name}: card count");
        assert_eq!(
            layout.connectors.len(),
            member_count - view.roots().len(),
            "{name}: connector count"
        );
        assert!(layout.width >= 800.0, "{name}: canvas width floor");
        assert!(layout.height >= 500.0, "{name}: canvas height floor");
    }
}

#[test]
fn basic_structure_matches_reference_geometry() {
    let view = HierarchyView::from_levels(&load_fixture("basic.json"), LayoutConfig::default());
    assert_eq!(view.roots().len(), 1);
    assert_eq!(xy(&view, "R"), (300.0, 60.0));
    assert_eq!(xy(&view, "A"), (170.0, 230.0));
    assert_eq!(xy(&view, "B"), (430.0, 230.0));

    let connectors = &view.layout().connectors;
    assert_eq!(connectors.len(), 2);
    for connector in connectors {
        assert_eq!(connector.from, "R");
        assert_eq!(connector.path.start, (300.0, 150.0));
        assert_eq!(connector.path.control1, (300.0, 190.0));
        assert_eq!(connector.path.control2.1, 190.0);
        assert!(!connector.is_bonus);
    }
    assert_eq!(connectors[0].path.end, (170.0, 230.0));
    assert_eq!(connectors[1].path.end, (430.0, 230.0));
}

#[test]
fn multiple_roots_and_bonus_branches() {
    let view = HierarchyView::from_levels(
        &load_fixture("multi_root_bonus.json"),
        LayoutConfig::default(),
    );
    let root_ids: Vec<&str> = view.roots().iter().map(|n| n.id.as_str()).collect();
    // s4 has a cleared manager, k2 points at a member that no longer exists.
    assert_eq!(root_ids, ["h1", "h2", "s4", "k2"]);
    assert!(view.roots()[0].is_first_root);
    assert!(view.roots()[1..].iter().all(|root| !root.is_first_root));
    assert_eq!(view.roots()[0].descendant_count, 3);
    assert_eq!(view.roots()[3].role, "Bonus");

    assert_eq!(xy(&view, "h1"), (300.0, 60.0));
    assert_eq!(xy(&view, "h2"), (690.0, 60.0));
    assert_eq!(xy(&view, "s4"), (950.0, 60.0));
    assert_eq!(xy(&view, "k2"), (1210.0, 60.0));
    assert_eq!(xy(&view, "s1"), (170.0, 230.0));
    assert_eq!(xy(&view, "k1"), (170.0, 400.0));
    assert_eq!(xy(&view, "s2"), (430.0, 230.0));
    assert_eq!(xy(&view, "s3"), (690.0, 230.0));
    assert_eq!((view.layout().width, view.layout().height), (1380.0, 550.0));

    let bonus: Vec<&str> = view
        .layout()
        .connectors
        .iter()
        .filter(|c| c.is_bonus)
        .map(|c| c.to.as_str())
        .collect();
    assert_eq!(bonus, ["k1"]);
}

#[test]
fn cycles_are_repaired_or_rejected() {
    let levels = load_fixture("cycle.json5");
    let roots = build(&levels);
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id, "X");
    let child_ids: Vec<&str> = roots[0].children.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(child_ids, ["D", "Y"]);
    assert_eq!(
        validate(&levels),
        Err(BuildError::ManagerCycle {
            id: "X".to_string()
        })
    );
}

#[test]
fn empty_structure_yields_floor_canvas() {
    let view = HierarchyView::from_levels(&load_fixture("empty.json"), LayoutConfig::default());
    assert!(view.is_empty());
    assert!(view.layout().is_empty());
    assert_eq!((view.layout().width, view.layout().height), (800.0, 500.0));
}

#[test]
fn collapsing_never_grows_the_canvas() {
    let levels = load_fixture("multi_root_bonus.json");
    let roots = build(&levels);
    let config = LayoutConfig::default();
    let full_state = ExpansionState::fully_expanded(&roots);
    let full = compute_layout(&roots, &full_state, &config);

    for id in ["h1", "s1", "h2"] {
        let mut state = full_state.clone();
        state.collapse(id);
        let collapsed = compute_layout(&roots, &state, &config);
        let node = commission_tree::model::find_node(&roots, id).expect("node exists");
        for below in node.walk().skip(1) {
            assert!(collapsed.position(&below.id).is_none(), "{id}: {} still placed", below.id);
        }
        assert!(collapsed.width <= full.width, "{id}: width grew");
        assert!(collapsed.height <= full.height, "{id}: height grew");
        assert_eq!(
            collapsed.positions.len(),
            full.positions.len() - node.descendant_count,
            "{id}: hidden count"
        );
    }
}

#[test]
fn long_management_chain_builds_and_lays_out() {
    const DEPTH: usize = 20_000;
    let members = (0..DEPTH)
        .map(|idx| {
            let member = Member::user(&format!("m{idx}"), "Agent", "u");
            match idx {
                0 => member,
                _ => member.managed_by(&format!("m{}", idx - 1)),
            }
        })
        .collect();
    let levels = vec![Level::new("l1", "Agent").with_members(members)];
    assert_eq!(validate(&levels), Ok(()));

    let roots = build(&levels);
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].descendant_count, DEPTH - 1);
    assert_eq!(roots[0].walk().count(), DEPTH);
    let deepest = roots[0].walk().last().expect("chain has members");
    assert_eq!(deepest.id, format!("m{}", DEPTH - 1));
    assert!(deepest.is_leaf);

    let config = LayoutConfig::default();
    let layout = compute_layout(&roots, &ExpansionState::fully_expanded(&roots), &config);
    assert_eq!(layout.positions.len(), DEPTH);
    assert_eq!(layout.connectors.len(), DEPTH - 1);
    let step = config.card_height + config.vertical_gap;
    let last = layout.position(&deepest.id).expect("deepest member placed");
    assert_eq!(last.x, 60.0 + config.card_width / 2.0);
    assert_eq!(last.y, 60.0 + step * (DEPTH - 1) as f32);

    let mut state = ExpansionState::fully_expanded(&roots);
    state.collapse("m10000");
    let collapsed = compute_layout(&roots, &state, &config);
    assert_eq!(collapsed.positions.len(), 10_001);
}
