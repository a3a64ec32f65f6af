use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use std::f32::consts::PI;

use crate::filter::error::DenoiseError;

#[derive(Clone, Debug)]
pub enum WeightInit {
    Xavier,
    He,                 // Good for ReLU activation
    LeCun,
    UniformRandom {
        min: f32,
        max: f32,
    },
    Constant(f32),
}

impl WeightInit {
    // Box-Muller; 1 - u keeps the log argument in (0, 1]
    fn normal_sample<R: Rng>(rng: &mut R, uniform: &Uniform<f32>, mean: f32, std_dev: f32) -> f32 {
        let u1 = 1.0 - uniform.sample(rng);
        let u2 = uniform.sample(rng);

        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }

    /// Fills a tensor of `shape`. Conv kernels are `[out, in, kh, kw]`.
    pub fn init<R: Rng>(&self, shape: &[usize], rng: &mut R) -> Result<Vec<f32>, DenoiseError> {
        let total_elements: usize = shape.iter().product();

        let (fan_in, fan_out) = match shape {
            [out, inp, kh, kw] => (inp * kh * kw, out * kh * kw),
            [out, inp] => (*inp, *out),
            [len] => (1, *len),
            _ => (1, 1),
        };
        let fan_in = fan_in.max(1);

        let values = match self {
            WeightInit::Xavier => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                let dist = Uniform::new_inclusive(-limit, limit);
                (0..total_elements)
                    .map(|_| dist.sample(rng))
                    .collect()
            },

            WeightInit::He => {
                let std_dev = (2.0 / fan_in as f32).sqrt();
                let uniform = Uniform::new(0.0f32, 1.0);
                (0..total_elements)
                    .map(|_| Self::normal_sample(rng, &uniform, 0.0, std_dev))
                    .collect()
            },

            WeightInit::LeCun => {
                let std_dev = (1.0 / fan_in as f32).sqrt();
                let uniform = Uniform::new(0.0f32, 1.0);
                (0..total_elements)
                    .map(|_| Self::normal_sample(rng, &uniform, 0.0, std_dev))
                    .collect()
            },

            WeightInit::UniformRandom { min, max } => {
                if !(min < max) {
                    return Err(DenoiseError::config(
                        format!("Uniform init needs min < max, got [{}, {})", min, max)
                    ));
                }
                let dist = Uniform::new(*min, *max);
                (0..total_elements)
                    .map(|_| dist.sample(rng))
                    .collect()
            },

            WeightInit::Constant(value) => {
                vec![*value; total_elements]
            },
        };

        Ok(values)
    }
}
