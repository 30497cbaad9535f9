use crate::activity::Activity;
use crate::schedule::ScheduleError;
use petgraph::Direction;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Predecessor graph of one project. Edges run predecessor -> activity.
/// References to ids outside the project are not represented.
pub struct ActivityDag {
    pub graph: DiGraph<i32, ()>,
    pub id_to_index: HashMap<i32, NodeIndex>,
}

impl ActivityDag {
    pub fn build(activities: &[Activity]) -> Self {
        let mut graph: DiGraph<i32, ()> = DiGraph::with_capacity(activities.len(), 0);
        let mut id_to_index: HashMap<i32, NodeIndex> = HashMap::with_capacity(activities.len());

        // Add nodes first
        for activity in activities {
            let node_ix = graph.add_node(activity.id);
            id_to_index.insert(activity.id, node_ix);
        }

        // Add edges: pred -> activity
        for activity in activities {
            let Some(&v) = id_to_index.get(&activity.id) else {
                continue;
            };
            for pred_id in &activity.predecessors {
                if let Some(&u) = id_to_index.get(pred_id) {
                    // update_edge keeps repeated predecessor ids to a single edge
                    graph.update_edge(u, v, ());
                }
            }
        }

        Self { graph, id_to_index }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Activity ids ordered so every activity follows all of its predecessors.
    pub fn topological_order(&self) -> Result<Vec<i32>, ScheduleError> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order.into_iter().map(|ix| self.graph[ix]).collect()),
            Err(cycle) => Err(ScheduleError::CyclicDependency {
                activity_ids: self.cycle_members(cycle.node_id()),
            }),
        }
    }

    /// Resolvable predecessors of `id`.
    pub fn predecessors(&self, id: i32) -> Vec<i32> {
        self.neighbors(id, Direction::Incoming)
    }

    pub fn successors(&self, id: i32) -> Vec<i32> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: i32, direction: Direction) -> Vec<i32> {
        let Some(&ix) = self.id_to_index.get(&id) else {
            return Vec::new();
        };
        let mut ids: Vec<i32> = self
            .graph
            .neighbors_directed(ix, direction)
            .map(|n| self.graph[n])
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted ids of the strongly connected component that contains `node`.
    fn cycle_members(&self, node: NodeIndex) -> Vec<i32> {
        let mut members = tarjan_scc(&self.graph)
            .into_iter()
            .find(|component| component.contains(&node))
            .map(|component| {
                component
                    .into_iter()
                    .map(|ix| self.graph[ix])
                    .collect::<Vec<_>>()
            })
            .unwrap_or_else(|| vec![self.graph[node]]);
        members.sort_unstable();
        members
    }
}
