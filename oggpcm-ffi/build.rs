//! Build script for oggpcm-ffi
//!
//! Generates the C header (`include/oggpcm.h`) with cbindgen.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };

    let config = match cbindgen::Config::from_file(crate_dir.join("cbindgen.toml")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: cannot read cbindgen.toml: {}", e);
            return;
        }
    };

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => {
            if std::fs::create_dir_all(crate_dir.join("include")).is_ok() {
                bindings.write_to_file(crate_dir.join("include").join("oggpcm.h"));
            }
        }
        Err(e) => {
            eprintln!("Warning: cbindgen failed: {}", e);
        }
    }
}
