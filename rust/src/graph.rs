//! Step dependency graph induced by produce/use relations.
//!
//! Step A is a predecessor of step B when the state A produces appears in
//! B's `uses` or `requires`. Steps are addressed by their position in the
//! recipe's step list.

use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::models::Step;

/// Index of a step in the recipe's step list.
pub type StepIndex = usize;

/// Cycle found during topological sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    /// Every step the sort could not emit (cycle members and everything downstream).
    pub unsorted: Vec<StepIndex>,
    /// One actual cycle, in predecessor-walk order.
    pub cycle: Vec<StepIndex>,
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Circular dependency detected among {} step(s)",
            self.unsorted.len()
        )
    }
}

impl std::error::Error for CycleError {}

/// Predecessor/successor adjacency over steps.
#[derive(Debug, Clone, Default)]
pub struct StepGraph {
    /// State id -> first step producing it.
    produced_by: FxHashMap<String, StepIndex>,
    /// Deduplicated predecessors per step, ascending.
    predecessors: Vec<Vec<StepIndex>>,
    /// Deduplicated successors per step, ascending.
    successors: Vec<Vec<StepIndex>>,
}

impl StepGraph {
    /// Build the graph. When a state is produced twice the first producer is kept;
    /// references to unknown states contribute no edge.
    pub fn build(steps: &[Step]) -> Self {
        let n = steps.len();
        let mut produced_by: FxHashMap<String, StepIndex> =
            FxHashMap::with_capacity_and_hasher(n, Default::default());
        for (idx, step) in steps.iter().enumerate() {
            if let Some(state) = step.produced_state() {
                produced_by.entry(state.to_string()).or_insert(idx);
            }
        }

        let mut predecessors: Vec<Vec<StepIndex>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<StepIndex>> = vec![Vec::new(); n];
        for (idx, step) in steps.iter().enumerate() {
            for reference in step.uses.iter().chain(step.requires.iter()) {
                if let Some(&pred) = produced_by.get(reference.as_str()) {
                    predecessors[idx].push(pred);
                }
            }
            predecessors[idx].sort_unstable();
            predecessors[idx].dedup();
            for &pred in &predecessors[idx] {
                successors[pred].push(idx);
            }
        }

        Self {
            produced_by,
            predecessors,
            successors,
        }
    }

    pub fn len(&self) -> usize {
        self.predecessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predecessors.is_empty()
    }

    /// Step producing `state`, if any.
    #[inline]
    pub fn producer_of(&self, state: &str) -> Option<StepIndex> {
        self.produced_by.get(state).copied()
    }

    pub fn is_produced(&self, state: &str) -> bool {
        self.produced_by.contains_key(state)
    }

    #[inline]
    pub fn predecessors(&self, step: StepIndex) -> &[StepIndex] {
        &self.predecessors[step]
    }

    #[inline]
    pub fn successors(&self, step: StepIndex) -> &[StepIndex] {
        &self.successors[step]
    }

    /// Topological order using Kahn's algorithm.
    ///
    /// The lowest-index ready step is always emitted next, so a graph whose step
    /// list already respects dependencies comes back in list order.
    pub fn topological_order(&self) -> Result<Vec<StepIndex>, CycleError> {
        let n = self.len();
        let mut in_degree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();

        let mut ready: BinaryHeap<Reverse<StepIndex>> = (0..n)
            .filter(|&i| in_degree[i] == 0)
            .map(Reverse)
            .collect();
        let mut order: Vec<StepIndex> = Vec::with_capacity(n);

        while let Some(Reverse(step)) = ready.pop() {
            order.push(step);
            for &succ in &self.successors[step] {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    ready.push(Reverse(succ));
                }
            }
        }

        if order.len() == n {
            return Ok(order);
        }

        let mut emitted = vec![false; n];
        for &step in &order {
            emitted[step] = true;
        }
        let unsorted: Vec<StepIndex> = (0..n).filter(|&i| !emitted[i]).collect();
        let cycle = self.find_cycle(unsorted[0], &emitted);
        Err(CycleError { unsorted, cycle })
    }

    /// Walk unsorted predecessors from `start` until a step repeats.
    ///
    /// Every unsorted step has at least one unsorted predecessor, so the walk
    /// always closes a loop.
    fn find_cycle(&self, start: StepIndex, emitted: &[bool]) -> Vec<StepIndex> {
        let mut position: FxHashMap<StepIndex, usize> = FxHashMap::default();
        let mut path: Vec<StepIndex> = Vec::new();
        let mut current = start;

        loop {
            if let Some(&pos) = position.get(&current) {
                return path.split_off(pos);
            }
            position.insert(current, path.len());
            path.push(current);
            match self.predecessors[current]
                .iter()
                .copied()
                .find(|&p| !emitted[p])
            {
                Some(next) => current = next,
                None => return path,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_step(id: &str, uses: &[&str], produces: Option<&str>, requires: &[&str]) -> Step {
        Step {
            id: id.to_string(),
            action: id.to_string(),
            duration: None,
            is_passive: false,
            uses: uses.iter().map(|s| s.to_string()).collect(),
            produces: produces.map(str::to_string),
            requires: requires.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_chain_edges_and_order() {
        let steps = vec![
            make_step("mix", &["flour"], Some("batter"), &[]),
            make_step("bake", &["batter"], Some("cake"), &[]),
            make_step("cool", &["cake"], Some("cooled"), &[]),
        ];
        let graph = StepGraph::build(&steps);

        assert_eq!(graph.predecessors(0), &[] as &[StepIndex]);
        assert_eq!(graph.predecessors(1), &[0]);
        assert_eq!(graph.successors(1), &[2]);
        assert_eq!(graph.producer_of("cake"), Some(1));
        assert_eq!(graph.producer_of("flour"), None);
        assert_eq!(graph.topological_order().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_requires_creates_edge_and_duplicates_collapse() {
        let steps = vec![
            make_step("preheat", &[], Some("hot_oven"), &[]),
            make_step("shape", &["dough"], Some("shaped"), &[]),
            make_step("bake", &["shaped", "shaped"], Some("bread"), &["hot_oven"]),
        ];
        let graph = StepGraph::build(&steps);
        assert_eq!(graph.predecessors(2), &[0, 1]);
        assert_eq!(graph.successors(0), &[2]);
    }

    #[test]
    fn test_dependency_respecting_list_keeps_list_order() {
        // s2 is ready from the start but must not overtake s1
        let steps = vec![
            make_step("s0", &["a"], Some("p0"), &[]),
            make_step("s1", &["p0"], Some("p1"), &[]),
            make_step("s2", &["b"], Some("p2"), &[]),
        ];
        let graph = StepGraph::build(&steps);
        assert_eq!(graph.topological_order().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_out_of_order_list_is_sorted() {
        let steps = vec![
            make_step("serve", &["sauce"], Some("dish"), &[]),
            make_step("sauce", &["cream"], Some("sauce"), &[]),
        ];
        let graph = StepGraph::build(&steps);
        assert_eq!(graph.topological_order().unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_two_step_cycle() {
        let steps = vec![
            make_step("a", &["s2"], Some("s1"), &[]),
            make_step("b", &["s1"], Some("s2"), &[]),
        ];
        let err = StepGraph::build(&steps).topological_order().unwrap_err();
        assert_eq!(err.unsorted, vec![0, 1]);
        assert_eq!(err.cycle.len(), 2);
    }

    #[test]
    fn test_cycle_representative_excludes_downstream_steps() {
        // c depends on the a<->b cycle but is not part of it
        let steps = vec![
            make_step("c", &["s1"], Some("s3"), &[]),
            make_step("a", &["s2"], Some("s1"), &[]),
            make_step("b", &["s1"], Some("s2"), &[]),
        ];
        let err = StepGraph::build(&steps).topological_order().unwrap_err();
        assert_eq!(err.unsorted, vec![0, 1, 2]);
        let mut cycle = err.cycle.clone();
        cycle.sort_unstable();
        assert_eq!(cycle, vec![1, 2]);
    }

    #[test]
    fn test_self_loop() {
        let steps = vec![make_step("a", &["s1"], Some("s1"), &[])];
        let err = StepGraph::build(&steps).topological_order().unwrap_err();
        assert_eq!(err.cycle, vec![0]);
    }

    #[test]
    fn test_equipment_step_without_state() {
        let steps = vec![make_step("preheat", &[], None, &[])];
        let graph = StepGraph::build(&steps);
        assert!(!graph.is_produced(""));
        assert_eq!(graph.topological_order().unwrap(), vec![0]);
    }
}
