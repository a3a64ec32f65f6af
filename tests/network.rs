use std::sync::Arc;

use rt_denoise::{
    buffer::{image_desc::BoundImages, reorder::Region},
    network::{print_network_stats::print_network_stats, unet::UNetTopology},
    node::execution::ExecContext,
    transfer::transfer_function::TransferFunction,
    weights::{synthetic::{synthetic_weights, UNetShape}, weight_init::WeightInit},
    AutoencoderFilter, Device, DeviceConfig, ImageDesc, PixelFormat, SharedBuffer, Variant, WeightMap,
};

fn identity_1x1(channels: usize) -> Vec<f32> {
    let mut data = vec![0.0; channels * channels];
    for c in 0..channels {
        data[c * channels + c] = 1.0;
    }
    data
}

fn identity_weights() -> Arc<WeightMap> {
    let mut map = WeightMap::new();
    map.insert_raw(Variant::Color, "bottleneck_conv0", [3, 3, 1, 1], identity_1x1(3), vec![0.0; 3]).unwrap();
    map.insert_raw(Variant::Color, "output_conv", [3, 3, 1, 1], identity_1x1(3), vec![0.0; 3]).unwrap();
    Arc::new(map)
}

#[test]
fn identity_network_reproduces_ubyte_input() {
    let device = Device::new_with(DeviceConfig { num_threads: 1 }).unwrap();
    let bytes: Vec<u8> = (0..5 * 3 * 3).map(|i| (i * 29 % 256) as u8).collect();
    let color = ImageDesc::new(SharedBuffer::from_bytes(bytes.clone()), PixelFormat::UByte3, 5, 3).unwrap();
    let output = ImageDesc::new(SharedBuffer::new(bytes.len()), PixelFormat::UByte3, 5, 3).unwrap();

    let mut filter = AutoencoderFilter::new(device.clone(), identity_weights());
    filter.set_image("color", color);
    filter.set_image("output", output.clone());
    filter.set1i("srgb", 1);
    filter.commit();
    filter.execute();

    assert!(device.get_error().is_none());
    assert_eq!(output.buffer().to_bytes(), bytes);
}

#[test]
fn float4_output_keeps_alpha() {
    let device = Device::new_with(DeviceConfig { num_threads: 1 }).unwrap();
    let color: Vec<f32> = (0..2 * 2 * 4).map(|i| if i % 4 == 3 { 9.0 } else { 0.1 * (i % 7) as f32 }).collect();
    let output_values = vec![0.5f32; 16];
    let color = ImageDesc::new(SharedBuffer::from_f32(&color), PixelFormat::Float4, 2, 2).unwrap();
    let output = ImageDesc::new(SharedBuffer::from_f32(&output_values), PixelFormat::Float4, 2, 2).unwrap();

    let mut filter = AutoencoderFilter::new(device.clone(), identity_weights());
    filter.set_image("color", color);
    filter.set_image("output", output.clone());
    filter.commit();
    filter.execute();

    assert!(device.get_error().is_none());
    let result = output.buffer().to_f32_vec();
    for (i, value) in result.iter().enumerate() {
        if i % 4 == 3 {
            assert_eq!(*value, 0.5);
        } else {
            assert!((value - 0.1 * (i % 7) as f32).abs() < 1e-6);
        }
    }
}

#[test]
fn network_runs_directly_on_bound_images() {
    let shape = UNetShape {
        encoder: vec![4, 4],
        bottleneck: 8,
        decoder: vec![4, 4],
    };
    let weights = synthetic_weights(&[Variant::Color], &shape, &WeightInit::Xavier, 9).unwrap();
    let topology = UNetTopology::from_weights(&weights, Variant::Color).unwrap();
    let mut network = topology.build_network(8, 8, 2).unwrap();

    let values = vec![0.3f32; 8 * 8 * 3];
    let mut images = BoundImages::default();
    images.color = Some(ImageDesc::new(SharedBuffer::from_f32(&values), PixelFormat::Float3, 8, 8).unwrap());
    let ctx = ExecContext::new(&images, TransferFunction::Linear, Region { y: 0, x: 0, height: 8, width: 8 });

    network.execute(&ctx).unwrap();
    let first = network.output().data().to_vec();
    network.execute(&ctx).unwrap();

    assert_eq!(network.output().desc().to_dims(), vec![3, 8, 8]);
    assert_eq!(first, network.output().data());
    assert!(network.parameter_count() > 0);
    print_network_stats(&network);
}

#[test]
fn unbound_auxiliary_image_is_reported_at_execute() {
    let shape = UNetShape {
        encoder: vec![],
        bottleneck: 4,
        decoder: vec![],
    };
    let weights = synthetic_weights(&[Variant::ColorAlbedoNormal], &shape, &WeightInit::He, 1).unwrap();
    let topology = UNetTopology::from_weights(&weights, Variant::ColorAlbedoNormal).unwrap();
    let mut network = topology.build_network(2, 2, 2).unwrap();

    let mut images = BoundImages::default();
    images.color = Some(ImageDesc::new(SharedBuffer::new(48), PixelFormat::Float3, 2, 2).unwrap());
    let ctx = ExecContext::new(&images, TransferFunction::Linear, Region { y: 0, x: 0, height: 2, width: 2 });

    let err = network.execute(&ctx).unwrap_err();
    assert!(err.to_string().contains("albedo"));
}
