//! Prediction command for leafscan
//!
//! Loads a trained model and classifies one leaf image.

use leafscan::InferenceAdapter;
use std::{env, path::Path, process};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut model_path = None;
    let mut image_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--model" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --model requires a file path");
                    process::exit(1);
                }
                model_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => {
                if image_path.is_none() {
                    image_path = Some(arg.to_string());
                } else {
                    eprintln!("Error: Multiple image paths provided");
                    process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(image_path) = image_path else {
        print_help(&args[0]);
        process::exit(1);
    };
    let model_path = model_path.unwrap_or_else(|| "plant_disease_model.json".to_string());

    let adapter = match InferenceAdapter::from_model_file(Path::new(&model_path)) {
        Ok(adapter) => adapter,
        Err(error) => {
            eprintln!("Error: {}", error);
            eprintln!("Suggestion: {}", error.user_message());
            process::exit(1);
        }
    };

    match adapter.predict_image(Path::new(&image_path)) {
        Ok(prediction) => {
            println!("Prediction: {}", prediction.label);
            println!("Confidence: {:.1}%", prediction.confidence * 100.0);
            println!();
            println!("Class probabilities:");
            for (label, probability) in &prediction.distribution {
                println!("  {:<30} {:>6.1}%", label, probability * 100.0);
            }
        }
        Err(error) => {
            eprintln!("Classification failed: {}", error);
            eprintln!("Suggestion: {}", error.user_message());
            process::exit(1);
        }
    }
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <image_path>", program_name);
    eprintln!();
    eprintln!("Classify a plant leaf image with a trained model.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --model FILE     Model artifact path (default: plant_disease_model.json)");
    eprintln!("  --help, -h       Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} leaf.jpg", program_name);
    eprintln!("  {} --model leaf_model.json leaf.jpg", program_name);
}
