//! Prerequisite graph module.
//!
//! Provides the `PrerequisiteGraph` type, which represents sigil node
//! prerequisites as a directed acyclic graph. Edges run from a
//! prerequisite to the nodes that depend on it, so walking outgoing
//! edges from a node visits everything that would be invalidated by
//! removing it.

use crate::error::BuilderError;
use crate::id::ItemId;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// A DAG of sigil node prerequisites.
///
/// # Examples
///
/// ```rust
/// use magecraft::graph::PrerequisiteGraph;
/// use magecraft::ItemId;
///
/// let mut graph = PrerequisiteGraph::new();
/// let root = ItemId::new("root");
/// let mid = ItemId::new("mid");
///
/// // mid requires root
/// graph.add_edge(mid.clone(), root.clone());
///
/// let order = graph.topological_sort().unwrap();
/// assert_eq!(order, vec![root, mid]);
/// ```
pub struct PrerequisiteGraph {
    graph: DiGraph<ItemId, ()>,
    node_map: HashMap<ItemId, NodeIndex>,
}

impl PrerequisiteGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a node if it doesn't exist and return its index.
    pub fn add_node(&mut self, id: ItemId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&id) {
            idx
        } else {
            let idx = self.graph.add_node(id.clone());
            self.node_map.insert(id, idx);
            idx
        }
    }

    /// Record that `dependent` requires `prerequisite`.
    ///
    /// Both nodes are added if missing.
    pub fn add_edge(&mut self, dependent: ItemId, prerequisite: ItemId) {
        let dependent_idx = self.add_node(dependent);
        let prerequisite_idx = self.add_node(prerequisite);
        self.graph.add_edge(prerequisite_idx, dependent_idx, ());
    }

    /// Detect prerequisite cycles.
    ///
    /// Returns the first cycle found as a closed path, e.g. `[a, b, a]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use magecraft::graph::PrerequisiteGraph;
    /// use magecraft::ItemId;
    ///
    /// let mut graph = PrerequisiteGraph::new();
    /// let a = ItemId::new("a");
    /// let b = ItemId::new("b");
    ///
    /// graph.add_edge(b.clone(), a.clone());
    /// assert!(graph.detect_cycles().is_ok());
    ///
    /// graph.add_edge(a.clone(), b.clone());
    /// assert!(graph.detect_cycles().is_err());
    /// ```
    pub fn detect_cycles(&self) -> Result<(), BuilderError> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();

        for node_idx in self.graph.node_indices() {
            if !visited.contains(&node_idx) {
                let mut cycle_path = Vec::new();
                if let Some(cycle) =
                    self.dfs_cycle_detect(node_idx, &mut visited, &mut rec_stack, &mut cycle_path)
                {
                    return Err(cycle);
                }
            }
        }

        Ok(())
    }

    fn dfs_cycle_detect(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        rec_stack: &mut HashSet<NodeIndex>,
        cycle_path: &mut Vec<ItemId>,
    ) -> Option<BuilderError> {
        visited.insert(node);
        rec_stack.insert(node);
        cycle_path.push(self.graph[node].clone());

        for neighbor in self.graph.neighbors_directed(node, Direction::Outgoing) {
            if !visited.contains(&neighbor) {
                if let Some(cycle) = self.dfs_cycle_detect(neighbor, visited, rec_stack, cycle_path)
                {
                    return Some(cycle);
                }
            } else if rec_stack.contains(&neighbor) {
                let neighbor_id = self.graph[neighbor].clone();
                let start = cycle_path
                    .iter()
                    .position(|id| id == &neighbor_id)
                    .unwrap_or(0);
                let mut path = cycle_path[start..].to_vec();
                path.push(neighbor_id);
                return Some(BuilderError::PrerequisiteCycle { path });
            }
        }

        rec_stack.remove(&node);
        cycle_path.pop();
        None
    }

    /// Nodes ordered so that prerequisites come first.
    pub fn topological_sort(&self) -> Result<Vec<ItemId>, BuilderError> {
        self.detect_cycles()?;

        match toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect()),
            Err(cycle) => Err(BuilderError::PrerequisiteCycle {
                path: vec![self.graph[cycle.node_id()].clone()],
            }),
        }
    }

    pub fn contains_node(&self, id: &ItemId) -> bool {
        self.node_map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct prerequisites of a node.
    pub fn prerequisites_of(&self, id: &ItemId) -> Vec<ItemId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Direct dependents of a node.
    pub fn dependents_of(&self, id: &ItemId) -> Vec<ItemId> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: &ItemId, direction: Direction) -> Vec<ItemId> {
        match self.node_map.get(id) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, direction)
                .map(|n| self.graph[n].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Breadth-first closure of `root` and its dependents.
    ///
    /// Only nodes for which `is_selected` holds are entered; an
    /// unselected node stops the walk along that branch. `root` itself
    /// is always the first element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use magecraft::graph::PrerequisiteGraph;
    /// use magecraft::ItemId;
    ///
    /// let mut graph = PrerequisiteGraph::new();
    /// graph.add_edge("mid".into(), "root".into());
    /// graph.add_edge("leaf".into(), "mid".into());
    ///
    /// let closure = graph.dependents_closure(&"root".into(), |_| true);
    /// assert_eq!(closure.len(), 3);
    /// ```
    pub fn dependents_closure<F>(&self, root: &ItemId, is_selected: F) -> Vec<ItemId>
    where
        F: Fn(&ItemId) -> bool,
    {
        let mut closure = vec![root.clone()];
        let Some(&start) = self.node_map.get(root) else {
            return closure;
        };

        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(idx) = queue.pop_front() {
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if seen.contains(&next) || !is_selected(&self.graph[next]) {
                    continue;
                }
                seen.insert(next);
                closure.push(self.graph[next].clone());
                queue.push_back(next);
            }
        }

        closure
    }
}

impl Default for PrerequisiteGraph {
    fn default() -> Self {
        Self::new()
    }
}
