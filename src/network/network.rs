use std::collections::HashMap;

use log::debug;

use crate::{
    filter::error::DenoiseError,
    graph::graph_model::{GraphModel, NodeId},
    node::{execution::ExecContext, node::Node},
    tensor::{tensor::Tensor, tensor_desc::TensorDesc},
};

use super::variant::Variant;

pub struct NetworkNode {
    pub id: NodeId,
    pub node: Box<dyn Node>,
    // Indices into the tensor arena; a skip connection is just a second reader
    pub inputs: Vec<usize>,
}

/// A verified graph with every output tensor allocated. Node `i` in execution
/// order writes tensor `i` of the arena.
pub struct Network {
    variant: Variant,
    nodes: Vec<NetworkNode>,
    tensors: Vec<Tensor>,
    output_index: usize,
}

impl Network {
    pub fn new(mut graph: GraphModel, variant: Variant) -> Result<Self, DenoiseError> {
        if graph.verified.is_none() {
            graph.verify()?;
        }
        let verified = graph.verified.take()
            .ok_or_else(|| DenoiseError::internal("Graph verification left no execution order"))?;

        if verified.exit_points.len() != 1 {
            return Err(DenoiseError::internal(format!(
                "Network must have exactly one exit point, found {:?}", verified.exit_points
            )));
        }
        if verified.entry_points.len() != 1 {
            return Err(DenoiseError::internal(format!(
                "Network must have exactly one input node, found {:?}", verified.entry_points
            )));
        }

        let index_of: HashMap<NodeId, usize> = verified.execution_order.iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let mut graph_nodes = std::mem::take(&mut graph.nodes);
        let mut nodes = Vec::with_capacity(verified.execution_order.len());
        let mut descs: Vec<TensorDesc> = Vec::with_capacity(verified.execution_order.len());

        for (idx, id) in verified.execution_order.iter().enumerate() {
            let graph_node = graph_nodes.remove(id)
                .ok_or_else(|| DenoiseError::internal(format!("Node {} missing from graph", id)))?;

            let mut inputs = Vec::with_capacity(graph_node.input_connections.len());
            for input_id in &graph_node.input_connections {
                match index_of.get(input_id) {
                    Some(&input_idx) if input_idx < idx => inputs.push(input_idx),
                    _ => return Err(DenoiseError::internal(format!(
                        "Node {} reads node {} before it is computed", id, input_id
                    ))),
                }
            }

            let input_descs: Vec<&TensorDesc> = inputs.iter().map(|&i| &descs[i]).collect();
            let desc = graph_node.node.output_desc(&input_descs)?;

            debug!(
                "node {:>3} {:<10} {:<14} {}",
                idx,
                graph_node.node.name(),
                desc.to_shape_string(),
                graph_node.node.config_string().unwrap_or_default()
            );

            descs.push(desc);
            nodes.push(NetworkNode {
                id: *id,
                node: graph_node.node,
                inputs,
            });
        }

        let output_index = index_of[&verified.exit_points[0]];
        let tensors = descs.into_iter().map(Tensor::zeros).collect();

        Ok(Self {
            variant,
            nodes,
            tensors,
            output_index,
        })
    }

    /// Runs every node once, in order.
    pub fn execute(&mut self, ctx: &ExecContext<'_>) -> Result<(), DenoiseError> {
        for (idx, node) in self.nodes.iter().enumerate() {
            let mut output = std::mem::take(&mut self.tensors[idx]);

            let result = {
                let inputs: Vec<&Tensor> = node.inputs.iter().map(|&i| &self.tensors[i]).collect();
                node.node.forward(ctx, &inputs, &mut output)
            };

            self.tensors[idx] = output;
            result?;
        }

        Ok(())
    }

    pub fn output(&self) -> &Tensor {
        &self.tensors[self.output_index]
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    // Channel width K of the packed input
    pub fn input_channels(&self) -> usize {
        self.tensors.first()
            .and_then(|t| t.desc().chw())
            .map(|(c, _, _)| c)
            .unwrap_or(0)
    }

    // (height, width) the network was built for
    pub fn tile_size(&self) -> (usize, usize) {
        self.tensors.first()
            .and_then(|t| t.desc().chw())
            .map(|(_, h, w)| (h, w))
            .unwrap_or((0, 0))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NetworkNode, &TensorDesc)> {
        self.nodes.iter().zip(self.tensors.iter().map(|t| t.desc()))
    }

    pub fn tensor_descs(&self) -> Vec<&TensorDesc> {
        self.tensors.iter().map(|t| t.desc()).collect()
    }

    pub fn parameter_count(&self) -> usize {
        self.nodes.iter().map(|n| n.node.parameter_count()).sum()
    }

    pub fn activation_bytes(&self) -> usize {
        self.tensors.iter().map(|t| t.desc().size_in_bytes()).sum()
    }
}
