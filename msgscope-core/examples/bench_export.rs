use std::fs;
use std::time::Instant;

fn main() {
    // Relative to msgscope-core/ when run via `cargo run --example bench_export`
    let path =
        std::env::var("BENCH_FILE").unwrap_or_else(|_| "../samples/export.json".to_string());
    let raw =
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));
    println!("Loaded {} bytes", raw.len());

    for i in 0..3 {
        let start = Instant::now();
        match msgscope_core::analyze_messages_native(&raw, "premium") {
            Ok(json) => {
                if i == 0 {
                    println!("Report JSON length: {}", json.len());
                }
            }
            Err(e) => {
                println!("Error: {}", e);
            }
        }
        println!("Run {}: {:?}", i + 1, start.elapsed());
    }
}
