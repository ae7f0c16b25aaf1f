//! Module dependency graph.
//!
//! Modules are scheduled in levels: every module of a level depends only on
//! modules of earlier levels, so a level can be processed in parallel once the
//! previous one is done.

use mj_stack::ensure_sufficient_stack;
use rustc_hash::FxHashSet;

/// Import edges between modules, by module index.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    /// `deps[m]`: modules that `m` imports, deduplicated, in import order.
    deps: Vec<Vec<usize>>,
}

/// Processing order computed by [`DependencyGraph::schedule`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Modules grouped by level, ascending module index inside a level.
    pub levels: Vec<Vec<usize>>,
    /// Modules that lie on an import cycle.
    pub cyclic: Vec<usize>,
    /// Modules that are not on a cycle but import one, directly or not.
    pub blocked: Vec<usize>,
}

impl DependencyGraph {
    pub fn new(modules: usize) -> Self {
        DependencyGraph {
            deps: vec![Vec::new(); modules],
        }
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Record that `from` imports `to`.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        let deps = &mut self.deps[from];
        if !deps.contains(&to) {
            deps.push(to);
        }
    }

    pub fn dependencies(&self, module: usize) -> &[usize] {
        &self.deps[module]
    }

    /// Kahn's algorithm, one level at a time.
    #[tracing::instrument(level = "debug", skip_all, fields(modules = self.deps.len()))]
    pub fn schedule(&self) -> Schedule {
        let n = self.deps.len();
        let mut placed = vec![false; n];
        let mut levels: Vec<Vec<usize>> = Vec::new();

        loop {
            let level: Vec<usize> = (0..n)
                .filter(|&m| !placed[m] && self.deps[m].iter().all(|&d| placed[d]))
                .collect();
            if level.is_empty() {
                break;
            }
            for &m in &level {
                placed[m] = true;
            }
            tracing::trace!(level = levels.len(), modules = level.len(), "scheduled level");
            levels.push(level);
        }

        let rest: Vec<usize> = (0..n).filter(|&m| !placed[m]).collect();
        let (cyclic, blocked): (Vec<usize>, Vec<usize>) = rest
            .into_iter()
            .partition(|&m| self.reaches(m, m, &placed));
        Schedule {
            levels,
            cyclic,
            blocked,
        }
    }

    /// Whether `target` is reachable from `start`'s imports through modules
    /// that were not placed.
    fn reaches(&self, start: usize, target: usize, placed: &[bool]) -> bool {
        let mut seen = FxHashSet::default();
        let mut stack: Vec<usize> = self.deps[start].clone();
        while let Some(m) = stack.pop() {
            if m == target {
                return true;
            }
            if placed[m] || !seen.insert(m) {
                continue;
            }
            stack.extend(self.deps[m].iter().copied());
        }
        false
    }

    /// One cycle through `module`, in import order, starting and ending at it.
    pub fn cycle_through(&self, module: usize) -> Option<Vec<usize>> {
        let mut path = vec![module];
        let mut seen = FxHashSet::default();
        if self.find_path(module, module, &mut path, &mut seen) {
            Some(path)
        } else {
            None
        }
    }

    fn find_path(
        &self,
        from: usize,
        target: usize,
        path: &mut Vec<usize>,
        seen: &mut FxHashSet<usize>,
    ) -> bool {
        for &next in &self.deps[from] {
            if next == target {
                path.push(next);
                return true;
            }
            if !seen.insert(next) {
                continue;
            }
            path.push(next);
            if ensure_sufficient_stack(|| self.find_path(next, target, path, seen)) {
                return true;
            }
            path.pop();
        }
        false
    }
}

#[cfg(test)]
mod tests;
