//! Encoder-decoder topology with skip connections, derived from the weights.
//!
//! Layer identifiers looked up in the weight source:
//! - `enc{s}_conv{j}`: conv `j` of encoder stage `s`, each stage ends in a pool
//! - `bottleneck_conv{j}`: convs at the lowest resolution
//! - `dec{s}_conv{j}`: conv `j` of decoder stage `s`, after upsample + concat
//! - `output_conv`: final conv to RGB, no activation
//!
//! Depth is the number of encoder stages present. Decoder stage `s` joins the
//! upsampled deeper features with the input of encoder stage `s`.

use std::sync::Arc;

use crate::{
    filter::error::DenoiseError,
    graph::graph_model::{GraphModel, NodeId},
    node::factory::Nodes,
    weights::weight_source::{ConvWeights, WeightSource},
};

use super::{network::Network, variant::Variant};

#[derive(Clone)]
pub struct ConvLayer {
    pub name: String,
    pub weights: Arc<ConvWeights>,
}

pub struct UNetTopology {
    pub variant: Variant,
    pub encoder: Vec<Vec<ConvLayer>>,
    pub bottleneck: Vec<ConvLayer>,
    pub decoder: Vec<Vec<ConvLayer>>,
    pub output: ConvLayer,
}

fn stage_convs(source: &dyn WeightSource, variant: Variant, prefix: &str) -> Vec<ConvLayer> {
    let mut convs = Vec::new();
    loop {
        let name = format!("{}_conv{}", prefix, convs.len());
        match source.conv(variant, &name) {
            Some(weights) => convs.push(ConvLayer { name, weights }),
            None => return convs,
        }
    }
}

fn missing(variant: Variant, layer: &str) -> DenoiseError {
    DenoiseError::config(format!("Missing weights for layer {} of the {} network", layer, variant.tag()))
}

impl UNetTopology {
    pub fn from_weights(source: &dyn WeightSource, variant: Variant) -> Result<Self, DenoiseError> {
        let mut encoder = Vec::new();
        loop {
            let convs = stage_convs(source, variant, &format!("enc{}", encoder.len()));
            if convs.is_empty() {
                break;
            }
            encoder.push(convs);
        }

        let bottleneck = stage_convs(source, variant, "bottleneck");
        if bottleneck.is_empty() {
            return Err(missing(variant, "bottleneck_conv0"));
        }

        let mut decoder = Vec::with_capacity(encoder.len());
        for s in 0..encoder.len() {
            let convs = stage_convs(source, variant, &format!("dec{}", s));
            if convs.is_empty() {
                return Err(missing(variant, &format!("dec{}_conv0", s)));
            }
            decoder.push(convs);
        }

        let output = source.conv(variant, "output_conv")
            .map(|weights| ConvLayer { name: "output_conv".to_string(), weights })
            .ok_or_else(|| missing(variant, "output_conv"))?;

        Ok(Self {
            variant,
            encoder,
            bottleneck,
            decoder,
            output,
        })
    }

    pub fn depth(&self) -> usize {
        self.encoder.len()
    }

    // Tile dims must be a multiple of this for every pool to divide evenly
    pub fn alignment(&self, factor: usize) -> Result<usize, DenoiseError> {
        u32::try_from(self.depth())
            .ok()
            .and_then(|depth| factor.checked_pow(depth))
            .ok_or_else(|| DenoiseError::config(format!(
                "Scale factor {} over {} stages overflows", factor, self.depth()
            )))
    }

    pub fn build_graph(&self, height: usize, width: usize, factor: usize) -> GraphModel {
        let mut graph = GraphModel::new();
        let mut current = graph.add_node(Nodes::input(self.variant.slots(), height, width));
        let mut skips = Vec::with_capacity(self.depth());

        for stage in &self.encoder {
            skips.push(current);
            current = add_convs(&mut graph, current, stage);
            current = graph.connect(Nodes::pool(factor), &[current]);
        }

        current = add_convs(&mut graph, current, &self.bottleneck);

        for (stage, skip) in self.decoder.iter().zip(skips.iter()).rev() {
            let upsampled = graph.connect(Nodes::upsample(factor), &[current]);
            current = graph.connect(Nodes::concat(), &[upsampled, *skip]);
            current = add_convs(&mut graph, current, stage);
        }

        let last = graph.connect(Nodes::conv2d(&self.output.name, self.output.weights.clone()), &[current]);
        graph.connect(Nodes::output(), &[last]);
        graph
    }

    pub fn build_network(&self, height: usize, width: usize, factor: usize) -> Result<Network, DenoiseError> {
        let mut graph = self.build_graph(height, width, factor);
        graph.verify()?;
        Network::new(graph, self.variant)
    }
}

fn add_convs(graph: &mut GraphModel, mut current: NodeId, convs: &[ConvLayer]) -> NodeId {
    for conv in convs {
        current = graph.connect(Nodes::conv2d(&conv.name, conv.weights.clone()), &[current]);
        current = graph.connect(Nodes::relu(), &[current]);
    }
    current
}
