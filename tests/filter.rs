use std::sync::Arc;

use approx::assert_relative_eq;
use rand::{rngs::StdRng, SeedableRng};

use rt_denoise::{
    weights::{synthetic::{synthetic_weights, UNetShape}, weight_init::WeightInit},
    AutoencoderFilter, Device, DeviceConfig, ErrorKind, FilterConfig, ImageDesc, PixelFormat,
    SharedBuffer, Variant, WeightMap,
};

fn device() -> Arc<Device> {
    Device::new_with(DeviceConfig { num_threads: 2 }).unwrap()
}

fn unet_weights() -> Arc<WeightMap> {
    let shape = UNetShape {
        encoder: vec![4],
        bottleneck: 6,
        decoder: vec![4],
    };
    Arc::new(synthetic_weights(&[Variant::Color, Variant::ColorAlbedoNormal], &shape, &WeightInit::He, 11).unwrap())
}

// Two 3x3 convs and no pooling: receptive field radius 2
fn flat_weights() -> Arc<WeightMap> {
    let mut rng = StdRng::seed_from_u64(5);
    let init = WeightInit::UniformRandom { min: -0.5, max: 0.5 };
    let mut map = WeightMap::new();

    let dims = [4, 3, 3, 3];
    map.insert_raw(Variant::Color, "bottleneck_conv0", dims, init.init(&dims, &mut rng).unwrap(), vec![0.1; 4]).unwrap();
    let dims = [3, 4, 3, 3];
    map.insert_raw(Variant::Color, "output_conv", dims, init.init(&dims, &mut rng).unwrap(), vec![0.05; 3]).unwrap();

    Arc::new(map)
}

fn float_image(width: usize, height: usize, values: &[f32]) -> ImageDesc {
    ImageDesc::new(SharedBuffer::from_f32(values), PixelFormat::Float3, width, height).unwrap()
}

fn noise(width: usize, height: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    WeightInit::UniformRandom { min: 0.0, max: 1.0 }.init(&[width * height * 3], &mut rng).unwrap()
}

#[test]
fn gray_srgb_image_gives_reproducible_ldr_output() {
    let device = device();
    let weights = unet_weights();

    let run = || {
        let output = float_image(4, 4, &[0.0; 48]);
        let mut filter = AutoencoderFilter::new(device.clone(), weights.clone());
        filter.set_image("color", float_image(4, 4, &[0.5; 48]));
        filter.set_image("output", output.clone());
        filter.set1i("srgb", 1);
        filter.commit();
        filter.execute();
        output.buffer().to_f32_vec()
    };

    let first = run();
    assert!(device.get_error().is_none());
    assert!(first.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v)));
    assert_eq!(first, run());
}

#[test]
fn repeated_execute_is_deterministic() {
    let device = device();
    let output = float_image(8, 8, &[0.0; 192]);
    let mut filter = AutoencoderFilter::new(device.clone(), unet_weights());
    filter.set_image("color", float_image(8, 8, &noise(8, 8, 1)));
    filter.set_image("output", output.clone());
    filter.commit();

    filter.execute();
    let first = output.buffer().to_f32_vec();
    filter.execute();

    assert_eq!(first, output.buffer().to_f32_vec());
    assert!(device.get_error().is_none());
}

#[test]
fn execute_before_commit_leaves_output_untouched() {
    let device = device();
    let output = float_image(4, 4, &[0.25; 48]);
    let mut filter = AutoencoderFilter::new(device.clone(), unet_weights());
    filter.set_image("color", float_image(4, 4, &[0.5; 48]));
    filter.set_image("output", output.clone());

    filter.execute();

    let (kind, _) = device.get_error().unwrap();
    assert_eq!(kind, ErrorKind::InvalidUsage);
    assert_eq!(output.buffer().to_f32_vec(), vec![0.25; 48]);
}

#[test]
fn rebinding_after_commit_requires_new_commit() {
    let device = device();
    let mut filter = AutoencoderFilter::new(device.clone(), unet_weights());
    filter.set_image("color", float_image(4, 4, &[0.5; 48]));
    filter.set_image("output", float_image(4, 4, &[0.0; 48]));
    filter.commit();
    assert!(filter.is_committed());

    filter.set_image("color", float_image(4, 4, &[0.1; 48]));
    assert!(!filter.is_committed());
    filter.execute();
    assert_eq!(device.get_error().map(|e| e.0), Some(ErrorKind::InvalidUsage));

    filter.commit();
    assert!(filter.is_committed());
    assert!(device.get_error().is_none());
}

#[test]
fn selects_variant_from_bound_images() {
    let device = device();
    let mut filter = AutoencoderFilter::new(device.clone(), unet_weights());
    filter.set_image("color", float_image(4, 4, &[0.5; 48]));
    filter.set_image("output", float_image(4, 4, &[0.0; 48]));
    filter.commit();
    assert_eq!(filter.variant(), Some(Variant::Color));
    assert_eq!(filter.network().map(|n| n.input_channels()), Some(3));

    filter.set_image("albedo", float_image(4, 4, &[0.8; 48]));
    filter.commit();
    assert_eq!(device.get_error().map(|e| e.0), Some(ErrorKind::Configuration));
    assert!(!filter.is_committed());

    filter.set_image("normal", float_image(4, 4, &[0.0; 48]));
    filter.commit();
    assert!(device.get_error().is_none());
    assert_eq!(filter.variant(), Some(Variant::ColorAlbedoNormal));
    assert_eq!(filter.network().map(|n| n.input_channels()), Some(9));

    filter.execute();
    assert!(device.get_error().is_none());
}

#[test]
fn mismatched_sizes_fail_commit() {
    let device = device();
    let mut filter = AutoencoderFilter::new(device.clone(), unet_weights());
    filter.set_image("color", float_image(4, 4, &[0.5; 48]));
    filter.set_image("output", float_image(5, 4, &[0.0; 60]));
    filter.commit();

    let (kind, message) = device.get_error().unwrap();
    assert_eq!(kind, ErrorKind::Configuration);
    assert!(message.contains("output"));
    assert!(!filter.is_committed());

    filter.execute();
    assert_eq!(device.get_error().map(|e| e.0), Some(ErrorKind::InvalidUsage));
}

#[test]
fn missing_output_fails_commit() {
    let device = device();
    let mut filter = AutoencoderFilter::new(device.clone(), unet_weights());
    filter.set_image("color", float_image(4, 4, &[0.5; 48]));
    filter.commit();
    assert_eq!(device.get_error().map(|e| e.0), Some(ErrorKind::Configuration));
}

#[test]
fn unknown_names_are_configuration_errors() {
    let device = device();
    let mut filter = AutoencoderFilter::new(device.clone(), unet_weights());

    filter.set_image("depth", float_image(4, 4, &[0.5; 48]));
    assert_eq!(device.get_error().map(|e| e.0), Some(ErrorKind::Configuration));

    filter.set1i("gamma", 1);
    assert_eq!(device.get_error().map(|e| e.0), Some(ErrorKind::Configuration));

    assert_eq!(filter.get1i("gamma"), 0);
    assert_eq!(device.get_error().map(|e| e.0), Some(ErrorKind::Configuration));

    filter.set1i("srgb", 1);
    assert_eq!(filter.get1i("srgb"), 1);
    assert_eq!(filter.get1i("hdr"), 0);
    assert!(device.get_error().is_none());
}

#[test]
fn hdr_option_combinations() {
    let device = device();
    let mut filter = AutoencoderFilter::new(device.clone(), unet_weights());
    filter.set_image("color", float_image(4, 4, &[3.5; 48]));
    filter.set_image("output", float_image(4, 4, &[0.0; 48]));
    filter.set1i("hdr", 1);
    filter.set1i("srgb", 1);
    filter.commit();
    assert_eq!(device.get_error().map(|e| e.0), Some(ErrorKind::Configuration));

    filter.set1i("srgb", 0);
    filter.set_image("output", ImageDesc::new(SharedBuffer::new(48), PixelFormat::UByte3, 4, 4).unwrap());
    filter.commit();
    assert_eq!(device.get_error().map(|e| e.0), Some(ErrorKind::Configuration));

    let output = float_image(4, 4, &[0.0; 48]);
    filter.set_image("output", output.clone());
    filter.commit();
    filter.execute();
    assert!(device.get_error().is_none());
    assert!(output.buffer().to_f32_vec().iter().all(|v| v.is_finite() && *v >= 0.0));
}

#[test]
fn missing_weights_fail_commit() {
    let device = device();
    let mut filter = AutoencoderFilter::new(device.clone(), Arc::new(WeightMap::new()));
    filter.set_image("color", float_image(4, 4, &[0.5; 48]));
    filter.set_image("output", float_image(4, 4, &[0.0; 48]));
    filter.commit();

    let (kind, message) = device.get_error().unwrap();
    assert_eq!(kind, ErrorKind::Configuration);
    assert!(message.contains("bottleneck_conv0"));
}

#[test]
fn odd_dimensions_are_padded_to_alignment() {
    let device = device();
    let output = float_image(7, 5, &[0.0; 105]);
    let mut filter = AutoencoderFilter::new(device.clone(), unet_weights());
    filter.set_image("color", float_image(7, 5, &noise(7, 5, 2)));
    filter.set_image("output", output.clone());
    filter.commit();

    assert_eq!(filter.network().map(|n| n.tile_size()), Some((6, 8)));

    filter.execute();
    assert!(device.get_error().is_none());
    assert!(output.buffer().to_f32_vec().iter().all(|v| v.is_finite()));
}

#[test]
fn tiled_matches_whole_image() {
    let (width, height) = (23, 17);
    let input = noise(width, height, 3);
    let device = device();

    let run = |config: FilterConfig| {
        let output = float_image(width, height, &vec![0.0; width * height * 3]);
        let mut filter = AutoencoderFilter::new_with(device.clone(), flat_weights(), config).unwrap();
        filter.set_image("color", float_image(width, height, &input));
        filter.set_image("output", output.clone());
        filter.commit();
        filter.execute();
        (filter.tile_count(), output.buffer().to_f32_vec())
    };

    let (whole_tiles, whole) = run(FilterConfig::default());
    let (tiled_tiles, tiled) = run(FilterConfig {
        tile_size: Some(10),
        tile_overlap: 3,
        ..Default::default()
    });

    assert!(device.get_error().is_none());
    assert_eq!(whole_tiles, 1);
    assert!(tiled_tiles > 1);
    for (a, b) in whole.iter().zip(&tiled) {
        assert_relative_eq!(*a, *b, epsilon = 1e-6);
    }
}

#[test]
fn output_may_alias_color() {
    let (width, height) = (12, 9);
    let input = noise(width, height, 4);
    let device = device();
    let config = || FilterConfig {
        tile_size: Some(8),
        tile_overlap: 2,
        ..Default::default()
    };

    let separate = float_image(width, height, &vec![0.0; width * height * 3]);
    let mut filter = AutoencoderFilter::new_with(device.clone(), flat_weights(), config()).unwrap();
    filter.set_image("color", float_image(width, height, &input));
    filter.set_image("output", separate.clone());
    filter.commit();
    filter.execute();

    let in_place = float_image(width, height, &input);
    let mut filter = AutoencoderFilter::new_with(device.clone(), flat_weights(), config()).unwrap();
    filter.set_image("color", in_place.clone());
    filter.set_image("output", in_place.clone());
    filter.commit();
    filter.execute();

    assert!(device.get_error().is_none());
    assert_eq!(separate.buffer().to_f32_vec(), in_place.buffer().to_f32_vec());
}

#[test]
fn filter_config_is_validated() {
    let config = FilterConfig {
        tile_size: Some(4),
        tile_overlap: 2,
        ..Default::default()
    };
    assert!(AutoencoderFilter::new_with(device(), unet_weights(), config).is_err());
}
