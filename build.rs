use std::env;
use std::fs;
use std::path::Path;

/// Variables forwarded from `.env` so `option_env!` can see them.
const FORWARDED_KEYS: &[&str] = &[
    "FINNHUB_API_KEY",
    "FMP_API_KEY",
    "MARKETAUX_API_KEY",
    "API_BASE_URL",
    "FIREBASE_API_KEY",
    "FIREBASE_PROJECT_ID",
    "FETCH_FAILURE_POLICY",
    "ENABLE_LOGGING",
];

fn main() {
    let env_file = Path::new(".env");

    if env_file.exists() {
        println!("cargo:rerun-if-changed=.env");

        if let Ok(contents) = fs::read_to_string(env_file) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"');

                    if !FORWARDED_KEYS.contains(&key) {
                        continue;
                    }

                    // A variable already set in the environment wins over .env
                    if env::var(key).is_err() {
                        println!("cargo:rustc-env={}={}", key, value);
                    }
                }
            }
        }
    } else {
        println!("cargo:warning=No .env file found. Market data and Firebase keys will be empty.");
    }

    for key in FORWARDED_KEYS {
        println!("cargo:rerun-if-env-changed={}", key);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
