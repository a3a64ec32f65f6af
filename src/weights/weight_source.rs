use std::{collections::HashMap, sync::Arc};

use crate::{
    filter::error::DenoiseError,
    network::variant::Variant,
    tensor::{tensor::Tensor, tensor_desc::TensorDesc},
};

/// Pretrained coefficients of one convolution: OIHW kernel plus bias.
#[derive(Debug)]
pub struct ConvWeights {
    weights: Tensor,
    bias: Tensor,
}

impl ConvWeights {
    pub fn new(weights: Tensor, bias: Tensor) -> Result<Self, DenoiseError> {
        let out_channels = match weights.desc() {
            TensorDesc::Tensor4D { batch, .. } => *batch,
            other => return Err(DenoiseError::config(
                format!("Conv weights must be 4D [out, in, kh, kw], got {:?}", other.to_dims())
            )),
        };

        match bias.desc() {
            TensorDesc::Vector { length } if *length == out_channels => {},
            other => return Err(DenoiseError::config(format!(
                "Conv bias must be a vector of {} values, got {:?}", out_channels, other.to_dims()
            ))),
        }

        Ok(Self { weights, bias })
    }

    pub fn from_raw(dims: [usize; 4], data: Vec<f32>, bias: Vec<f32>) -> Result<Self, DenoiseError> {
        let weights = Tensor::from_vec(TensorDesc::new_tensor4d(dims[0], dims[1], dims[2], dims[3]), data)?;
        let bias = Tensor::from_vec(TensorDesc::new_vector(bias.len()), bias)?;
        Self::new(weights, bias)
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    // (out_channels, in_channels, kernel_h, kernel_w)
    pub fn dims(&self) -> (usize, usize, usize, usize) {
        match self.weights.desc() {
            TensorDesc::Tensor4D { batch, channels, height, width } => (*batch, *channels, *height, *width),
            _ => (0, 0, 0, 0),
        }
    }

    pub fn out_channels(&self) -> usize {
        self.dims().0
    }

    pub fn in_channels(&self) -> usize {
        self.dims().1
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }
}

/// Supplies weights keyed by (variant, layer identifier).
pub trait WeightSource: Send + Sync {
    fn conv(&self, variant: Variant, layer: &str) -> Option<Arc<ConvWeights>>;
}

#[derive(Default)]
pub struct WeightMap {
    entries: HashMap<(Variant, String), Arc<ConvWeights>>,
}

impl WeightMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, variant: Variant, layer: &str, weights: ConvWeights) {
        self.entries.insert((variant, layer.to_string()), Arc::new(weights));
    }

    // Flat kernel buffer plus its declared [out, in, kh, kw] dims
    pub fn insert_raw(
        &mut self,
        variant: Variant,
        layer: &str,
        dims: [usize; 4],
        data: Vec<f32>,
        bias: Vec<f32>,
    ) -> Result<(), DenoiseError> {
        let weights = ConvWeights::from_raw(dims, data, bias)
            .map_err(|e| DenoiseError::config(format!("Layer {} ({}): {}", layer, variant.tag(), e)))?;
        self.insert(variant, layer, weights);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl WeightSource for WeightMap {
    fn conv(&self, variant: Variant, layer: &str) -> Option<Arc<ConvWeights>> {
        self.entries.get(&(variant, layer.to_string())).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_raw_validates_declared_dims() {
        let mut map = WeightMap::new();
        assert!(map.insert_raw(Variant::Color, "a", [2, 3, 3, 3], vec![0.0; 54], vec![0.0; 2]).is_ok());
        assert!(map.insert_raw(Variant::Color, "b", [2, 3, 3, 3], vec![0.0; 53], vec![0.0; 2]).is_err());
        assert!(map.insert_raw(Variant::Color, "c", [2, 3, 3, 3], vec![0.0; 54], vec![0.0; 3]).is_err());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn lookup_is_per_variant() {
        let mut map = WeightMap::new();
        map.insert_raw(Variant::Color, "output_conv", [3, 4, 1, 1], vec![1.0; 12], vec![0.0; 3]).unwrap();

        let conv = map.conv(Variant::Color, "output_conv").unwrap();
        assert_eq!(conv.dims(), (3, 4, 1, 1));
        assert_eq!(conv.parameter_count(), 15);
        assert!(map.conv(Variant::ColorAlbedoNormal, "output_conv").is_none());
    }

    #[test]
    fn short_bias_fails_commit_instead_of_execute() {
        use crate::{
            buffer::{format::PixelFormat, image_desc::{ImageDesc, SharedBuffer}},
            filter::{autoencoder::AutoencoderFilter, device::{Device, DeviceConfig}, error::ErrorKind},
        };

        let unchecked = ConvWeights {
            weights: Tensor::zeros(TensorDesc::new_tensor4d(3, 3, 1, 1)),
            bias: Tensor::zeros(TensorDesc::new_vector(0)),
        };
        let mut map = WeightMap::new();
        map.insert(Variant::Color, "bottleneck_conv0", unchecked);
        map.insert_raw(Variant::Color, "output_conv", [3, 3, 1, 1], vec![0.0; 9], vec![0.0; 3]).unwrap();

        let device = Device::new_with(DeviceConfig { num_threads: 1 }).unwrap();
        let output = ImageDesc::new(SharedBuffer::new(4 * 4 * 12), PixelFormat::Float3, 4, 4).unwrap();
        let mut filter = AutoencoderFilter::new(device.clone(), Arc::new(map));
        filter.set_image("color", ImageDesc::new(SharedBuffer::new(4 * 4 * 12), PixelFormat::Float3, 4, 4).unwrap());
        filter.set_image("output", output);
        filter.commit();

        let (kind, message) = device.get_error().unwrap();
        assert_eq!(kind, ErrorKind::Configuration);
        assert!(message.contains("bottleneck_conv0"));
        assert!(!filter.is_committed());

        filter.execute();
        assert_eq!(device.get_error().map(|e| e.0), Some(ErrorKind::InvalidUsage));
    }
}
