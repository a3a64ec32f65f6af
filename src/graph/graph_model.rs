use std::collections::{BTreeMap, HashSet};

use crate::{filter::error::DenoiseError, node::node::Node};

pub type NodeId = usize;

// Build-time description of the network: nodes plus their connections.
// `verify` checks the wiring and fixes the execution order.
pub struct GraphModel {
    pub nodes: BTreeMap<NodeId, GraphNode>,
    pub verified: Option<GraphVerifiedData>,
}

pub struct GraphNode {
    pub id: NodeId,
    pub node: Box<dyn Node>,

    // Order matters: it is the order tensors are handed to the node
    pub input_connections: Vec<NodeId>,
    pub output_connections: Vec<NodeId>,
}

pub struct GraphVerifiedData {
    pub entry_points: Vec<NodeId>,
    pub exit_points: Vec<NodeId>,
    pub execution_order: Vec<NodeId>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            verified: None,
        }
    }

    // Connects the new node to the most recently added one, unless it takes no inputs
    pub fn add_node(&mut self, node: Box<dyn Node>) -> NodeId {
        let id = self.next_available_id();

        let input_connections = if node.input_requirements().0 > 0 {
            self.nodes.keys().next_back().map(|&prev| vec![prev]).unwrap_or_default()
        } else {
            Vec::new()
        };

        self.add_node_with(id, node, input_connections)
    }

    pub fn add_node_with(&mut self, id: NodeId, node: Box<dyn Node>, input_connections: Vec<NodeId>) -> NodeId {
        for &input_id in &input_connections {
            if let Some(input_node) = self.nodes.get_mut(&input_id) {
                if !input_node.output_connections.contains(&id) {
                    input_node.output_connections.push(id);
                }
            }
        }

        self.nodes.insert(id, GraphNode {
            id,
            node,
            input_connections,
            output_connections: Vec::new(),
        });
        self.verified = None;
        id
    }

    // Appends a node reading from `inputs`, in that order
    pub fn connect(&mut self, node: Box<dyn Node>, inputs: &[NodeId]) -> NodeId {
        let id = self.next_available_id();
        self.add_node_with(id, node, inputs.to_vec())
    }

    pub fn next_available_id(&self) -> NodeId {
        self.nodes.keys().next_back().map(|&id| id + 1).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn verify(&mut self) -> Result<(), DenoiseError> {
        let entry_points: Vec<NodeId> = self.nodes.values()
            .filter(|n| n.node.input_requirements().0 == 0)
            .map(|n| n.id)
            .collect();

        if entry_points.is_empty() {
            return Err(DenoiseError::internal("Graph must have at least one input node"));
        }

        let invalid_entries: Vec<NodeId> = entry_points.iter()
            .copied()
            .filter(|id| !self.nodes[id].input_connections.is_empty())
            .collect();

        if !invalid_entries.is_empty() {
            return Err(DenoiseError::internal(
                format!("Input nodes cannot have inputs themselves: {:?}", invalid_entries)
            ));
        }

        for node in self.nodes.values() {
            for input_id in &node.input_connections {
                match self.nodes.get(input_id) {
                    None => return Err(DenoiseError::internal(
                        format!("Node {} references non-existent input node {}", node.id, input_id)
                    )),
                    Some(input_node) if !input_node.output_connections.contains(&node.id) => {
                        return Err(DenoiseError::internal(format!(
                            "Connection inconsistency: node {} lists {} as input, but {} does not list {} as output",
                            node.id, input_id, input_id, node.id
                        )));
                    },
                    Some(_) => {},
                }
            }

            for output_id in &node.output_connections {
                match self.nodes.get(output_id) {
                    None => return Err(DenoiseError::internal(
                        format!("Node {} references non-existent output node {}", node.id, output_id)
                    )),
                    Some(output_node) if !output_node.input_connections.contains(&node.id) => {
                        return Err(DenoiseError::internal(format!(
                            "Connection inconsistency: node {} lists {} as output, but {} does not list {} as input",
                            node.id, output_id, output_id, node.id
                        )));
                    },
                    Some(_) => {},
                }
            }

            let (min_inputs, max_inputs) = node.node.input_requirements();
            let actual_inputs = node.input_connections.len();

            if actual_inputs < min_inputs {
                return Err(DenoiseError::internal(format!(
                    "Node {} ({}) requires at least {} inputs, but has {}",
                    node.id, node.node.name(), min_inputs, actual_inputs
                )));
            }

            if let Some(max) = max_inputs {
                if actual_inputs > max {
                    return Err(DenoiseError::internal(format!(
                        "Node {} ({}) requires at most {} inputs, but has {}",
                        node.id, node.node.name(), max, actual_inputs
                    )));
                }
            }
        }

        let exit_points: Vec<NodeId> = self.nodes.values()
            .filter(|n| n.output_connections.is_empty())
            .map(|n| n.id)
            .collect();

        let execution_order = self.topological_sort()?;

        if execution_order.len() != self.nodes.len() {
            return Err(DenoiseError::internal(format!(
                "Execution order has {} nodes but graph has {} nodes",
                execution_order.len(), self.nodes.len()
            )));
        }

        self.verified = Some(GraphVerifiedData {
            entry_points,
            exit_points,
            execution_order,
        });

        Ok(())
    }

    fn topological_sort(&self) -> Result<Vec<NodeId>, DenoiseError> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut temp = HashSet::new();

        for &id in self.nodes.keys() {
            if !visited.contains(&id) {
                self.visit_node(id, &mut visited, &mut temp, &mut result)?;
            }
        }

        // Post-order lists consumers first
        result.reverse();
        Ok(result)
    }

    fn visit_node(
        &self,
        id: NodeId,
        visited: &mut HashSet<NodeId>,
        temp: &mut HashSet<NodeId>,
        result: &mut Vec<NodeId>,
    ) -> Result<(), DenoiseError> {
        if temp.contains(&id) {
            return Err(DenoiseError::internal(
                format!("Cycle detected involving node {}", id)
            ));
        }

        if visited.contains(&id) {
            return Ok(());
        }

        temp.insert(id);

        if let Some(node) = self.nodes.get(&id) {
            for &next_id in &node.output_connections {
                self.visit_node(next_id, visited, temp, result)?;
            }
        }

        temp.remove(&id);
        visited.insert(id);
        result.push(id);

        Ok(())
    }
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}
