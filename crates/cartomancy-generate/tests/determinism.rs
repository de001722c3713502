use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};

use cartomancy_core::timestamp;
use cartomancy_generate::{GenerateOptions, GenerationEngine};

fn hash_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn temp_out(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cartomancy_{tag}_{}", uuid::Uuid::new_v4()))
}

fn options_with(out_dir: PathBuf, seed: u64, chunk_size: u64) -> GenerateOptions {
    GenerateOptions {
        out_dir,
        seed,
        users: 30,
        products: 20,
        categories: 3,
        transactions: 40,
        sessions: 200,
        timespan_days: 21,
        chunk_size,
        subcategories_min: 2,
        subcategories_max: 4,
        progress_every: 0,
        reference_date: timestamp::parse("2025-01-01T00:00:00").unwrap(),
    }
}

fn run_into(out_dir: &Path, seed: u64, chunk_size: u64) {
    GenerationEngine::new(options_with(out_dir.to_path_buf(), seed, chunk_size))
        .run()
        .expect("generation succeeds");
}

fn session_records(out_dir: &Path) -> Vec<Value> {
    let mut records = Vec::new();
    for chunk_index in 0_u64.. {
        let path = out_dir.join(format!("sessions_{chunk_index}.json"));
        if !path.exists() {
            break;
        }
        let raw = std::fs::read_to_string(&path).expect("read sessions chunk");
        let chunk: Vec<Value> = serde_json::from_str(&raw).expect("parse sessions chunk");
        records.extend(chunk);
    }
    records
}

#[test]
fn identical_seeds_produce_identical_files() {
    let first_dir = temp_out("det_a");
    let second_dir = temp_out("det_b");
    run_into(&first_dir, 99, 80);
    run_into(&second_dir, 99, 80);

    for file in [
        "categories.json",
        "products.json",
        "users.json",
        "sessions_0.json",
        "sessions_1.json",
        "sessions_2.json",
        "transactions.json",
    ] {
        let first = hash_file(&first_dir.join(file)).expect("hash first");
        let second = hash_file(&second_dir.join(file)).expect("hash second");
        assert_eq!(first, second, "{file} differs between identical runs");
    }
}

#[test]
fn different_seeds_diverge() {
    let first_dir = temp_out("seed_a");
    let second_dir = temp_out("seed_b");
    run_into(&first_dir, 99, 80);
    run_into(&second_dir, 100, 80);

    let first = hash_file(&first_dir.join("transactions.json")).expect("hash first");
    let second = hash_file(&second_dir.join("transactions.json")).expect("hash second");
    assert_ne!(first, second, "seeds 99 and 100 produced identical output");
}

#[test]
fn chunk_size_does_not_change_content() {
    let single_dir = temp_out("chunk_single");
    let split_dir = temp_out("chunk_split");
    run_into(&single_dir, 7, 200);
    run_into(&split_dir, 7, 45);

    assert!(single_dir.join("sessions_0.json").exists());
    assert!(!single_dir.join("sessions_1.json").exists());
    assert!(split_dir.join("sessions_4.json").exists());

    let single_sessions = session_records(&single_dir);
    let split_sessions = session_records(&split_dir);
    assert_eq!(single_sessions.len(), 200);
    assert_eq!(single_sessions, split_sessions);

    for file in ["products.json", "transactions.json"] {
        let single = hash_file(&single_dir.join(file)).expect("hash single");
        let split = hash_file(&split_dir.join(file)).expect("hash split");
        assert_eq!(single, split, "{file} depends on chunking");
    }
}
