//! Index-based adjacency view of an edge set.

use std::collections::HashMap;

use crate::domain::{EdgeSet, Node};

/// Nodes numbered `0..n` in first-seen order, with outgoing adjacency lists.
#[derive(Debug, Clone, Default)]
pub struct CompactGraph {
    nodes: Vec<Node>,
    index: HashMap<Node, usize>,
    adjacency: Vec<Vec<(usize, u32)>>,
}

impl CompactGraph {
    pub fn from_edges(edges: &EdgeSet) -> Self {
        let mut graph = CompactGraph::default();
        for (key, weight) in edges.iter() {
            let from = graph.intern(&key.from);
            let to = graph.intern(&key.to);
            graph.adjacency[from].push((to, weight.get()));
        }
        graph
    }

    fn intern(&mut self, node: &Node) -> usize {
        if let Some(&i) = self.index.get(node) {
            return i;
        }
        let i = self.nodes.len();
        self.nodes.push(node.clone());
        self.index.insert(node.clone(), i);
        self.adjacency.push(Vec::new());
        i
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    pub fn index_of(&self, node: &Node) -> Option<usize> {
        self.index.get(node).copied()
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn neighbours(&self, index: usize) -> &[(usize, u32)] {
        &self.adjacency[index]
    }

    /// Indices of every ground node, ordered by station id.
    pub fn ground_nodes(&self) -> Vec<usize> {
        let mut grounds: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_ground())
            .map(|(i, _)| i)
            .collect();
        grounds.sort_by(|&a, &b| self.nodes[a].station.cmp(&self.nodes[b].station));
        grounds
    }
}
