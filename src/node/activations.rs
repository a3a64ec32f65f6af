use rayon::prelude::*;

use crate::{filter::error::DenoiseError, tensor::{tensor::Tensor, tensor_desc::TensorDesc}};

use super::{execution::ExecContext, node::Node};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActivationType {
    ReLU,
    LeakyReLU(f32),
}

impl ActivationType {
    pub fn name(&self) -> String {
        match self {
            ActivationType::ReLU => "ReLU".to_string(),
            ActivationType::LeakyReLU(_) => "LeakyReLU".to_string(),
        }
    }

    // NaN passes through unchanged
    pub fn apply(&self, x: f32) -> f32 {
        match self {
            ActivationType::ReLU => if x < 0.0 { 0.0 } else { x },
            ActivationType::LeakyReLU(alpha) => if x < 0.0 { alpha * x } else { x },
        }
    }
}

#[derive(Clone)]
pub struct ActivationNode {
    pub activation_type: ActivationType,
}

impl ActivationNode {
    pub fn new(activation_type: ActivationType) -> Self {
        Self { activation_type }
    }
}

impl Node for ActivationNode {
    fn output_desc(&self, input_descs: &[&TensorDesc]) -> Result<TensorDesc, DenoiseError> {
        if input_descs.len() != 1 {
            return Err(DenoiseError::internal(
                format!("Activation node requires exactly 1 input, got {}", input_descs.len())
            ));
        }

        // Activation functions preserve input shape
        Ok(input_descs[0].clone())
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (1, Some(1))
    }

    fn name(&self) -> String {
        self.activation_type.name()
    }

    fn config_string(&self) -> Option<String> {
        match &self.activation_type {
            ActivationType::LeakyReLU(alpha) => Some(format!("alpha={}", alpha)),
            _ => None,
        }
    }

    fn forward(&self, _ctx: &ExecContext<'_>, inputs: &[&Tensor], output: &mut Tensor) -> Result<(), DenoiseError> {
        let input = inputs[0];
        if input.len() != output.len() {
            return Err(DenoiseError::internal(format!(
                "Activation input has {} elements, output {}", input.len(), output.len()
            )));
        }

        let activation = self.activation_type;
        output.data_mut().par_iter_mut()
            .zip(input.data().par_iter())
            .for_each(|(dst, &src)| *dst = activation.apply(src));

        Ok(())
    }
}
