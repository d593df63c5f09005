//! Training command for leafscan
//!
//! Fits the random forest on a labeled image directory and writes the
//! model artifact.

use leafscan::TrainingConfig;
use std::{env, path::PathBuf, process};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut config_path = None;
    let mut dataset_dir = None;
    let mut model_path = None;
    let mut seed = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    process::exit(1);
                }
                config_path = Some(PathBuf::from(&args[i + 1]));
                i += 1;
            }
            "--model" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --model requires a file path");
                    process::exit(1);
                }
                model_path = Some(PathBuf::from(&args[i + 1]));
                i += 1;
            }
            "--seed" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --seed requires a number");
                    process::exit(1);
                }
                match args[i + 1].parse::<u64>() {
                    Ok(value) => seed = Some(value),
                    Err(_) => {
                        eprintln!("Error: invalid seed '{}'", args[i + 1]);
                        process::exit(1);
                    }
                }
                i += 1;
            }
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => {
                if dataset_dir.is_none() {
                    dataset_dir = Some(PathBuf::from(arg));
                } else {
                    eprintln!("Error: Multiple dataset directories provided");
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

    let mut config = match config_path {
        Some(path) => match TrainingConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("Error: Failed to load config '{}': {}", path.display(), error);
                process::exit(1);
            }
        },
        None => TrainingConfig::default_plant_village(),
    };

    if let Some(dir) = dataset_dir {
        config.dataset_dir = dir;
    }
    if let Some(path) = model_path {
        config.model_path = path;
    }
    if let Some(value) = seed {
        config.seed = value;
    }

    match leafscan::train(&config) {
        Ok(report) => {
            println!("{}", report.format());
            println!("Model saved to '{}'", config.model_path.display());
        }
        Err(error) => {
            eprintln!("Training failed: {}", error);
            eprintln!("Suggestion: {}", error.user_message());
            process::exit(1);
        }
    }
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <dataset_dir>", program_name);
    eprintln!();
    eprintln!("Train the leaf disease classifier on a labeled image directory.");
    eprintln!("The directory's immediate subdirectories are used as class names.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config FILE    Load training configuration from a JSON file");
    eprintln!("  --model FILE     Output path for the model artifact");
    eprintln!("  --seed N         Seed for segmentation, splitting, and fitting");
    eprintln!("  --help, -h       Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} PlantVillage", program_name);
    eprintln!("  {} --model leaf_model.json --seed 7 PlantVillage", program_name);
}
