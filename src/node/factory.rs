use std::sync::Arc;

use crate::{buffer::image_desc::ImageSlot, weights::weight_source::ConvWeights};

use super::{
    activations::{ActivationNode, ActivationType}, concat::ConcatNode, conv2d::Conv2DNode,
    input::InputNode, node::Node, output::OutputNode, pool::PoolNode, upsample::UpsampleNode,
};

pub struct Nodes;

impl Nodes {
    pub fn input(slots: Vec<ImageSlot>, height: usize, width: usize) -> Box<dyn Node> {
        Box::new(InputNode::new(slots, height, width))
    }

    pub fn conv2d(layer: &str, weights: Arc<ConvWeights>) -> Box<dyn Node> {
        Box::new(Conv2DNode::new(layer, weights))
    }

    pub fn relu() -> Box<dyn Node> {
        Box::new(ActivationNode::new(ActivationType::ReLU))
    }

    pub fn leakyrelu(alpha: f32) -> Box<dyn Node> {
        Box::new(ActivationNode::new(ActivationType::LeakyReLU(alpha)))
    }

    pub fn pool(factor: usize) -> Box<dyn Node> {
        Box::new(PoolNode::new(factor))
    }

    pub fn upsample(factor: usize) -> Box<dyn Node> {
        Box::new(UpsampleNode::new(factor))
    }

    pub fn concat() -> Box<dyn Node> {
        Box::new(ConcatNode::new())
    }

    pub fn output() -> Box<dyn Node> {
        Box::new(OutputNode::new())
    }
}
