use rand::{rngs::StdRng, SeedableRng};

use crate::{
    filter::error::DenoiseError,
    network::variant::Variant,
    node::output::OUTPUT_CHANNELS,
};

use super::{weight_init::WeightInit, weight_source::WeightMap};

const KERNEL_SIZE: usize = 3;

/// Conv widths of a generated UNet; one conv per stage.
/// `encoder[s]` and `decoder[s]` are the widths of stage `s`.
#[derive(Clone, Debug)]
pub struct UNetShape {
    pub encoder: Vec<usize>,
    pub bottleneck: usize,
    pub decoder: Vec<usize>,
}

impl Default for UNetShape {
    fn default() -> Self {
        Self {
            encoder: vec![32, 48, 64],
            bottleneck: 80,
            decoder: vec![32, 64, 64],
        }
    }
}

impl UNetShape {
    pub fn depth(&self) -> usize {
        self.encoder.len()
    }
}

/// Random weights laid out under the UNet naming scheme, for benchmarking and tests.
pub fn synthetic_weights(
    variants: &[Variant],
    shape: &UNetShape,
    init: &WeightInit,
    seed: u64,
) -> Result<WeightMap, DenoiseError> {
    if shape.decoder.len() != shape.encoder.len() {
        return Err(DenoiseError::config(format!(
            "UNet shape has {} encoder stages but {} decoder stages",
            shape.encoder.len(), shape.decoder.len()
        )));
    }
    if shape.bottleneck == 0 || shape.encoder.iter().chain(&shape.decoder).any(|&w| w == 0) {
        return Err(DenoiseError::config("UNet stage widths must be non-zero"));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut map = WeightMap::new();
    let depth = shape.depth();

    for &variant in variants {
        let input_channels = variant.input_channels();
        let mut add = |layer: &str, out: usize, inp: usize| -> Result<(), DenoiseError> {
            let dims = [out, inp, KERNEL_SIZE, KERNEL_SIZE];
            let data = init.init(&dims, &mut rng)?;
            map.insert_raw(variant, layer, dims, data, vec![0.0; out])
        };

        let mut channels = input_channels;
        for (s, &width) in shape.encoder.iter().enumerate() {
            add(&format!("enc{}_conv0", s), width, channels)?;
            channels = width;
        }

        add("bottleneck_conv0", shape.bottleneck, channels)?;
        channels = shape.bottleneck;

        for s in (0..depth).rev() {
            let skip = if s == 0 { input_channels } else { shape.encoder[s - 1] };
            add(&format!("dec{}_conv0", s), shape.decoder[s], channels + skip)?;
            channels = shape.decoder[s];
        }

        add("output_conv", OUTPUT_CHANNELS, channels)?;
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::weight_source::WeightSource;

    #[test]
    fn generates_every_layer_per_variant() {
        let shape = UNetShape {
            encoder: vec![4, 6],
            bottleneck: 8,
            decoder: vec![5, 6],
        };
        let map = synthetic_weights(&[Variant::Color, Variant::ColorAlbedoNormal], &shape, &WeightInit::He, 3).unwrap();

        // 2 encoder + bottleneck + 2 decoder + output, twice
        assert_eq!(map.len(), 12);

        let dec0 = map.conv(Variant::ColorAlbedoNormal, "dec0_conv0").unwrap();
        assert_eq!(dec0.dims(), (5, 6 + 9, 3, 3));
        let dec1 = map.conv(Variant::Color, "dec1_conv0").unwrap();
        assert_eq!(dec1.dims(), (6, 8 + 4, 3, 3));
    }

    #[test]
    fn rejects_unbalanced_shape() {
        let shape = UNetShape {
            encoder: vec![4, 6],
            bottleneck: 8,
            decoder: vec![5],
        };
        assert!(synthetic_weights(&[Variant::Color], &shape, &WeightInit::He, 0).is_err());
    }
}
