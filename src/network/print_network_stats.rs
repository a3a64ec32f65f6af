use crate::tensor::tensor::Tensor;

use super::network::Network;

fn format_memory_mb(bytes: usize) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

pub fn print_network_stats(network: &Network) {
    let mut total_params = 0usize;
    let mut total_memory = 0usize;

    println!("\nNetwork Statistics");
    println!("==================");
    let (height, width) = network.tile_size();
    println!("\nVariant: {}", network.variant().tag());
    println!("Input Channels: {}", network.input_channels());
    println!("Tile Size: {}×{}", height, width);
    println!("\nLayer Details:");
    println!("{:-<90}", "");
    println!("{:<4} {:<12} {:<20} {:<12} {:<15} {:<15}",
        "ID", "Type", "Layer", "Parameters", "Memory (MB)", "Output Shape");
    println!("{:-<90}", "");

    for (graph_node, desc) in network.nodes() {
        let params = graph_node.node.parameter_count();
        let memory_bytes = desc.size_in_bytes();

        println!("{:<4} {:<12} {:<20} {:<12} {:<15} {:<15}",
            graph_node.id,
            graph_node.node.name(),
            graph_node.node.config_string().unwrap_or_default(),
            params,
            format_memory_mb(memory_bytes),
            desc.to_shape_string());

        total_params += params;
        total_memory += memory_bytes;
    }

    println!("{:-<90}", "");
    println!("\nNetwork Summary:");
    println!("Total Parameters: {}", total_params);
    println!("Activation Memory: {}", format_memory_mb(total_memory));
}

pub fn print_tensor_stats(name: &str, tensor: &Tensor) {
    let data = tensor.data();
    println!("\n{} ({}):", name, tensor.desc().to_shape_string());
    if data.is_empty() {
        return;
    }

    let min_val = data.iter().fold(f32::INFINITY, |a, &b| a.min(b));
    let max_val = data.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let mean = data.iter().sum::<f32>() / data.len() as f32;
    let variance = data.iter()
        .map(|&x| (x - mean).powi(2))
        .sum::<f32>() / data.len() as f32;

    println!("  Min: {:.6}", min_val);
    println!("  Max: {:.6}", max_val);
    println!("  Mean: {:.6}", mean);
    println!("  Std Dev: {:.6}", variance.sqrt());

    let non_zero = data.iter().filter(|&&x| x != 0.0).count();
    println!("  Non-zero elements: {} ({:.2}%)",
        non_zero,
        (non_zero as f32 / data.len() as f32) * 100.0
    );
}
