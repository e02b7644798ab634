//! The include graph of a session

use petgraph::algo::{astar, toposort};
use petgraph::prelude::*;
use std::collections::HashMap;
use viper_files::UnitId;

/// Adding a dependency would have made a unit depend on itself.
///
/// The cycle starts and ends with the same unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("dependency cycle through {}", .0.iter().map(|u| u.to_string()).collect::<Vec<_>>().join(" -> "))]
pub struct GraphCyclic(pub Vec<UnitId>);

/// Which units include which. An edge `a -> b` means `a` includes `b`.
///
/// The graph is kept acyclic, edges that would close a cycle are refused.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: StableDiGraph<UnitId, ()>,
    nodes: HashMap<UnitId, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit with no dependencies, if not already present
    pub fn add_unit(&mut self, unit: UnitId) -> NodeIndex {
        *self
            .nodes
            .entry(unit)
            .or_insert_with(|| self.graph.add_node(unit))
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.nodes.contains_key(&unit)
    }

    /// Records that `from` includes `to`.
    ///
    /// # Error
    /// Returns the cycle, and leaves the graph untouched, if `to` already depends on `from`
    pub fn add_dependency(&mut self, from: UnitId, to: UnitId) -> Result<(), GraphCyclic> {
        if let Some(cycle) = self.cycle_through(from, to) {
            return Err(GraphCyclic(cycle));
        }
        let from_idx = self.add_unit(from);
        let to_idx = self.add_unit(to);
        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
        Ok(())
    }

    /// Gets the cycle an edge `from -> to` would create, if any
    pub fn cycle_through(&self, from: UnitId, to: UnitId) -> Option<Vec<UnitId>> {
        if from == to {
            return Some(vec![from, to]);
        }
        let from_idx = *self.nodes.get(&from)?;
        let to_idx = *self.nodes.get(&to)?;
        let (_, path) = astar(&self.graph, to_idx, |n| n == from_idx, |_| 1, |_| 0)?;
        Some(
            std::iter::once(from)
                .chain(path.into_iter().map(|idx| self.graph[idx]))
                .collect(),
        )
    }

    /// Checks if `from` transitively depends on `to`
    pub fn depends_on(&self, from: UnitId, to: UnitId) -> bool {
        match (self.nodes.get(&from), self.nodes.get(&to)) {
            (Some(&from), Some(&to)) => {
                petgraph::algo::has_path_connecting(&self.graph, from, to, None)
            }
            _ => false,
        }
    }

    /// The units directly included by a unit
    pub fn dependencies_of(&self, unit: UnitId) -> Vec<UnitId> {
        let Some(&idx) = self.nodes.get(&unit) else {
            return vec![];
        };
        let mut dependencies = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect::<Vec<_>>();
        dependencies.sort();
        dependencies
    }

    /// Every unit, ordered so that a unit comes after everything it includes
    pub fn dependency_order(&self) -> Result<Vec<UnitId>, GraphCyclic> {
        match toposort(&self.graph, None) {
            Ok(mut order) => {
                order.reverse();
                Ok(order.into_iter().map(|idx| self.graph[idx]).collect())
            }
            Err(cycle) => {
                let start = cycle.node_id();
                let members = petgraph::algo::tarjan_scc(&self.graph)
                    .into_iter()
                    .find(|nodes| nodes.contains(&start))
                    .unwrap_or_else(|| vec![start])
                    .into_iter()
                    .map(|node| self.graph[node])
                    .collect::<Vec<_>>();
                Err(GraphCyclic(members))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viper_files::{SourceUnit, SourceUnits};

    fn units(count: usize) -> Vec<UnitId> {
        let mut units = SourceUnits::new();
        (0..count)
            .map(|i| units.insert(SourceUnit::from_source(format!("{i}.vp"), "")))
            .collect()
    }

    #[test]
    fn test_refuses_cycle() {
        let ids = units(2);
        let (a, b) = (ids[0], ids[1]);
        let mut graph = DependencyGraph::new();
        graph.add_dependency(a, b).expect("a -> b is fine");
        let err = graph.add_dependency(b, a).unwrap_err();
        assert_eq!(err, GraphCyclic(vec![b, a, b]));
        assert!(!graph.depends_on(b, a));
    }

    #[test]
    fn test_self_include_is_cycle() {
        let ids = units(1);
        let mut graph = DependencyGraph::new();
        assert_eq!(
            graph.add_dependency(ids[0], ids[0]),
            Err(GraphCyclic(vec![ids[0], ids[0]]))
        );
    }

    #[test]
    fn test_long_cycle() {
        let ids = units(3);
        let mut graph = DependencyGraph::new();
        graph.add_dependency(ids[0], ids[1]).unwrap();
        graph.add_dependency(ids[1], ids[2]).unwrap();
        let err = graph.add_dependency(ids[2], ids[0]).unwrap_err();
        assert_eq!(err.0, vec![ids[2], ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let ids = units(4);
        let mut graph = DependencyGraph::new();
        graph.add_dependency(ids[0], ids[1]).unwrap();
        graph.add_dependency(ids[0], ids[2]).unwrap();
        graph.add_dependency(ids[1], ids[3]).unwrap();
        graph.add_dependency(ids[2], ids[3]).unwrap();
        assert_eq!(graph.dependencies_of(ids[0]), vec![ids[1], ids[2]]);
        assert!(graph.depends_on(ids[0], ids[3]));

        let order = graph.dependency_order().unwrap();
        let position = |id: UnitId| order.iter().position(|o| *o == id).unwrap();
        assert!(position(ids[3]) < position(ids[1]));
        assert!(position(ids[1]) < position(ids[0]));
    }
}
