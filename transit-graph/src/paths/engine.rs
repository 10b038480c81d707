//! Single-source shortest paths as an explicit state machine.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::domain::Node;

use super::compact::CompactGraph;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A run was started while another is active or its result unread
    #[error("engine is not idle")]
    NotIdle,

    /// Stepping was requested with no active run
    #[error("engine is not running")]
    NotRunning,

    /// Distances were requested before a run finished
    #[error("engine has no finished run")]
    NotDone,

    #[error("unknown source node: {0}")]
    UnknownSource(String),
}

#[derive(Debug, Clone, Default)]
enum EngineState {
    #[default]
    Idle,
    Running {
        source: usize,
        dist: Vec<Option<u32>>,
        frontier: BinaryHeap<Reverse<(u32, usize)>>,
    },
    Done {
        source: usize,
        dist: Vec<Option<u32>>,
    },
}

/// Dijkstra over a [`CompactGraph`], one source at a time.
///
/// `Idle → Running(source) → Done`. [`reset`](Self::reset) returns to idle
/// for the next source.
#[derive(Debug, Clone)]
pub struct ShortestPathEngine<'g> {
    graph: &'g CompactGraph,
    state: EngineState,
}

impl<'g> ShortestPathEngine<'g> {
    pub fn new(graph: &'g CompactGraph) -> Self {
        Self {
            graph,
            state: EngineState::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, EngineState::Idle)
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, EngineState::Done { .. })
    }

    /// Begin a run from `source`.
    pub fn start(&mut self, source: &Node) -> Result<(), PathError> {
        if !self.is_idle() {
            return Err(PathError::NotIdle);
        }
        let source = self
            .graph
            .index_of(source)
            .ok_or_else(|| PathError::UnknownSource(source.to_string()))?;
        self.start_index(source)
    }

    pub(crate) fn start_index(&mut self, source: usize) -> Result<(), PathError> {
        if !self.is_idle() {
            return Err(PathError::NotIdle);
        }
        let mut dist = vec![None; self.graph.node_count()];
        dist[source] = Some(0);
        let mut frontier = BinaryHeap::new();
        frontier.push(Reverse((0, source)));

        self.state = EngineState::Running {
            source,
            dist,
            frontier,
        };
        Ok(())
    }

    /// Settle one frontier entry. Returns `Ok(false)` once the run is done.
    pub fn step(&mut self) -> Result<bool, PathError> {
        let EngineState::Running { dist, frontier, .. } = &mut self.state else {
            return Err(PathError::NotRunning);
        };

        let Some(Reverse((d, u))) = frontier.pop() else {
            let EngineState::Running { source, dist, .. } = std::mem::take(&mut self.state) else {
                return Err(PathError::NotRunning);
            };
            self.state = EngineState::Done { source, dist };
            return Ok(false);
        };

        // Stale entry: a shorter path was found after this was pushed.
        if dist[u].is_some_and(|best| d > best) {
            return Ok(true);
        }

        for &(v, w) in self.graph.neighbours(u) {
            let candidate = d.saturating_add(w);
            if dist[v].is_none_or(|best| candidate < best) {
                dist[v] = Some(candidate);
                frontier.push(Reverse((candidate, v)));
            }
        }
        Ok(true)
    }

    /// Step until the run is done.
    pub fn run(&mut self) -> Result<(), PathError> {
        while self.step()? {}
        Ok(())
    }

    /// Distances from the finished run's source, indexed by node.
    pub fn distances(&self) -> Result<&[Option<u32>], PathError> {
        match &self.state {
            EngineState::Done { dist, .. } => Ok(dist),
            _ => Err(PathError::NotDone),
        }
    }

    /// Source of the active or finished run.
    pub fn source(&self) -> Option<&Node> {
        match &self.state {
            EngineState::Idle => None,
            EngineState::Running { source, .. } | EngineState::Done { source, .. } => {
                Some(self.graph.node(*source))
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = EngineState::Idle;
    }

    /// Distance to `target` after a finished run. `None` if unreachable.
    pub fn distance_to(&self, target: &Node) -> Result<Option<u32>, PathError> {
        let dist = self.distances()?;
        Ok(self.graph.index_of(target).and_then(|i| dist[i]))
    }
}
