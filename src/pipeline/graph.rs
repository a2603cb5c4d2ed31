//! Producer/consumer graph over a pipeline's crafts.
//!
//! An edge runs from craft P to craft C whenever C requires an artifact or
//! volatile that P produces. Required names with no producer are external
//! inputs: artifacts are read from the catalog, volatiles must be supplied
//! some other way and fail at run time otherwise.
//!
//! The execution order is a topological sort in which ties are broken by
//! insertion order, so the same sequence of combinations always yields the
//! same order. [`CraftGraph::to_dot`] renders the graph for Graphviz.

use petgraph::Direction;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::{CraftlineError, Result};
use crate::craft::{Craft, InputKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Dependency graph of a set of crafts.
///
/// Node weights are indices into the craft slice the graph was built from,
/// edge weights are the names linking producer to consumer.
#[derive(Debug)]
pub struct CraftGraph {
    graph: DiGraph<usize, String>,
    names: Vec<String>,
    external_inputs: BTreeSet<String>,
}

impl CraftGraph {
    /// Build the graph, rejecting names with more than one producer.
    pub fn build(crafts: &[Arc<Craft>]) -> Result<Self> {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..crafts.len()).map(|i| graph.add_node(i)).collect();

        let mut producers: HashMap<&str, usize> = HashMap::new();
        for (index, craft) in crafts.iter().enumerate() {
            for production in &craft.contract().produced {
                if let Some(&first) = producers.get(production.name.as_str()) {
                    return Err(CraftlineError::AmbiguousProducer {
                        name: production.name.clone(),
                        first: crafts[first].name().to_string(),
                        second: craft.name().to_string(),
                    });
                }
                producers.insert(production.name.as_str(), index);
            }
        }

        let mut external_inputs = BTreeSet::new();
        for (consumer, craft) in crafts.iter().enumerate() {
            for requirement in craft.contract().dependencies() {
                match producers.get(requirement.name.as_str()) {
                    Some(&producer) if producer != consumer => {
                        let (from, to) = (nodes[producer], nodes[consumer]);
                        // Avoid duplicate edges
                        if !graph.contains_edge(from, to) {
                            graph.add_edge(from, to, requirement.name.clone());
                        }
                    }
                    Some(_) => {}
                    None => {
                        if requirement.kind == InputKind::Volatile {
                            warn!(
                                "volatile '{}' required by '{}' has no producer in this pipeline",
                                requirement.name,
                                craft.name()
                            );
                        } else {
                            debug!("'{}' is an external input of '{}'", requirement.name, craft.name());
                        }
                        external_inputs.insert(requirement.name.clone());
                    }
                }
            }
        }

        Ok(Self {
            graph,
            names: crafts.iter().map(|c| c.name().to_string()).collect(),
            external_inputs,
        })
    }

    /// Fail with the crafts of the first cycle found.
    pub fn detect_cycles(&self) -> Result<()> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|node| (node, Color::White)).collect();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                return Err(CraftlineError::CyclicDependency {
                    crafts: cycle.iter().map(|idx| self.names[self.graph[*idx]].clone()).collect(),
                });
            }
        }

        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.graph.neighbors(node) {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    // Back edge: the cycle runs from the neighbor's position to here
                    let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Execution order as indices into the crafts the graph was built from.
    ///
    /// Among crafts whose producers have all run, the earliest inserted runs first.
    pub fn topological_order(&self) -> Result<Vec<usize>> {
        self.detect_cycles()?;

        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|node| self.graph.neighbors_directed(node, Direction::Incoming).count())
            .collect();
        let mut ready: BTreeSet<usize> =
            in_degree.iter().enumerate().filter(|(_, d)| **d == 0).map(|(i, _)| i).collect();

        let mut order = Vec::with_capacity(self.names.len());
        while let Some(next) = ready.pop_first() {
            order.push(self.graph[NodeIndex::new(next)]);
            for consumer in self.graph.neighbors(NodeIndex::new(next)) {
                let degree = &mut in_degree[consumer.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(consumer.index());
                }
            }
        }

        if order.len() != self.names.len() {
            return Err(CraftlineError::CyclicDependency {
                crafts: in_degree
                    .iter()
                    .enumerate()
                    .filter(|(_, d)| **d > 0)
                    .map(|(i, _)| self.names[i].clone())
                    .collect(),
            });
        }
        Ok(order)
    }

    /// Names required by some craft and produced by none.
    #[must_use]
    pub const fn external_inputs(&self) -> &BTreeSet<String> {
        &self.external_inputs
    }

    /// `(producer, consumer, name)` for every edge.
    #[must_use]
    pub fn edges(&self) -> Vec<(&str, &str, &str)> {
        self.graph
            .edge_indices()
            .filter_map(|edge| {
                let (from, to) = self.graph.edge_endpoints(edge)?;
                Some((
                    self.names[self.graph[from]].as_str(),
                    self.names[self.graph[to]].as_str(),
                    self.graph[edge].as_str(),
                ))
            })
            .collect()
    }

    /// Graphviz DOT source, one node per craft, edges labelled by name.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let labelled = self
            .graph
            .map(|_, &index| self.names[index].clone(), |_, name| name.clone());
        format!("{}", Dot::new(&labelled))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
