use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn graph(n: usize, edges: &[(usize, usize)]) -> DependencyGraph {
    let mut g = DependencyGraph::new(n);
    for &(from, to) in edges {
        g.add_edge(from, to);
    }
    g
}

#[test]
fn independent_modules_share_a_level() {
    let g = graph(3, &[]);
    assert_eq!(
        g.schedule(),
        Schedule {
            levels: vec![vec![0, 1, 2]],
            cyclic: vec![],
            blocked: vec![],
        }
    );
}

#[test]
fn diamond() {
    // 0 imports 1 and 2, both import 3.
    let g = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
    assert_eq!(g.schedule().levels, vec![vec![3], vec![1, 2], vec![0]]);
}

#[test]
fn duplicate_edges_are_ignored() {
    let g = graph(2, &[(0, 1), (0, 1)]);
    assert_eq!(g.dependencies(0), &[1]);
}

#[test]
fn cycle_and_blocked() {
    // 1 <-> 2 form a cycle, 0 imports 1, 3 is independent.
    let g = graph(4, &[(0, 1), (1, 2), (2, 1)]);
    let schedule = g.schedule();
    assert_eq!(schedule.levels, vec![vec![3]]);
    assert_eq!(schedule.cyclic, vec![1, 2]);
    assert_eq!(schedule.blocked, vec![0]);
    assert_eq!(g.cycle_through(1), Some(vec![1, 2, 1]));
    assert_eq!(g.cycle_through(0), None);
}

#[test]
fn self_import_is_a_cycle() {
    let g = graph(1, &[(0, 0)]);
    assert_eq!(g.schedule().cyclic, vec![0]);
    assert_eq!(g.cycle_through(0), Some(vec![0, 0]));
}

#[test]
fn long_import_cycle_is_reported_in_full() {
    // 0 -> 1 -> ... -> n-1 -> 0, deeper than a default thread stack allows
    // one frame per module.
    let n = 100_000;
    let edges: Vec<(usize, usize)> = (0..n).map(|m| (m, (m + 1) % n)).collect();
    let g = graph(n, &edges);
    let cycle = g
        .cycle_through(0)
        .unwrap_or_else(|| panic!("no cycle found"));
    assert_eq!(cycle.len(), n + 1);
    assert_eq!(cycle.first(), Some(&0));
    assert_eq!(cycle.last(), Some(&0));
    assert_eq!(cycle[n / 2], n / 2);
}

proptest! {
    /// Edges only point to lower indices, so the graph is acyclic and every
    /// module is scheduled after all of its imports.
    #[test]
    fn levels_respect_dependencies(
        n in 1usize..12,
        raw in proptest::collection::vec((0usize..12, 0usize..12), 0..40),
    ) {
        let mut g = DependencyGraph::new(n);
        for (a, b) in raw {
            let (a, b) = (a % n, b % n);
            if a > b {
                g.add_edge(a, b);
            }
        }
        let schedule = g.schedule();
        prop_assert!(schedule.cyclic.is_empty());
        prop_assert!(schedule.blocked.is_empty());

        let mut level_of = vec![usize::MAX; n];
        for (level, modules) in schedule.levels.iter().enumerate() {
            for &m in modules {
                level_of[m] = level;
            }
        }
        for m in 0..n {
            prop_assert!(level_of[m] != usize::MAX);
            for &d in g.dependencies(m) {
                prop_assert!(level_of[d] < level_of[m]);
            }
        }
    }
}
