use std::{env, error::Error, process, sync::Arc, time::Instant};

use image::{DynamicImage, Rgb32FImage};
use log::info;

use rt_denoise::{
    network::print_network_stats::{print_network_stats, print_tensor_stats},
    tensor::{tensor::Tensor, tensor_desc::TensorDesc},
    weights::{synthetic::{synthetic_weights, UNetShape}, weight_init::WeightInit},
    AutoencoderFilter, Device, FilterConfig, ImageDesc, PixelFormat, SharedBuffer, Variant,
};

const WEIGHT_SEED: u64 = 727;

fn run(input: &str, output: &str, iterations: usize) -> Result<(), Box<dyn Error>> {
    let source = image::open(input)?.to_rgb32f();
    let (width, height) = (source.width() as usize, source.height() as usize);
    info!("Loaded {} ({}x{})", input, width, height);

    let color = ImageDesc::new(SharedBuffer::from_f32(source.as_raw()), PixelFormat::Float3, width, height)?;
    let result = ImageDesc::new(SharedBuffer::new(width * height * 12), PixelFormat::Float3, width, height)?;

    let weights = synthetic_weights(&[Variant::Color], &UNetShape::default(), &WeightInit::He, WEIGHT_SEED)?;
    let device = Device::new()?;
    let config = FilterConfig {
        tile_size: Some(256),
        ..Default::default()
    };

    let mut filter = AutoencoderFilter::new_with(device.clone(), Arc::new(weights), config)?;
    filter.set_image("color", color);
    filter.set_image("output", result.clone());
    filter.set1i("srgb", 1);
    filter.commit();

    if let Some((kind, message)) = device.get_error() {
        return Err(format!("{:?}: {}", kind, message).into());
    }
    if let Some(network) = filter.network() {
        print_network_stats(network);
    }

    // Warm-up, not timed
    filter.execute();

    let started = Instant::now();
    for _ in 0..iterations {
        filter.execute();
    }
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;

    if let Some((kind, message)) = device.get_error() {
        return Err(format!("{:?}: {}", kind, message).into());
    }

    info!(
        "{} iteration(s) over {} tile(s): {:.2} ms total, {:.2} ms each",
        iterations,
        filter.tile_count(),
        elapsed,
        elapsed / iterations.max(1) as f64
    );

    let pixels = result.buffer().to_f32_vec();
    let stats = Tensor::from_vec(TensorDesc::new_vector(pixels.len()), pixels.clone())?;
    print_tensor_stats("Output", &stats);

    let denoised = Rgb32FImage::from_raw(width as u32, height as u32, pixels)
        .ok_or("Output buffer does not match the image size")?;
    DynamicImage::ImageRgb32F(denoised).to_rgb8().save(output)?;
    info!("Saved {}", output);

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input.png> [output.png] [iterations]", args[0]);
        process::exit(2);
    }

    let input = &args[1];
    let output = args.get(2).map(String::as_str).unwrap_or("denoised.png");
    let iterations = match args.get(3).map(|s| s.parse::<usize>()) {
        None => 10,
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            eprintln!("Invalid iteration count: {}", e);
            process::exit(2);
        },
    };

    if let Err(e) = run(input, output, iterations) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
