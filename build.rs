use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

// Glasses, creature and overlay images live below assets/ and are fetched
// by key at runtime, so they are shipped next to the build output.
const ASSET_DIR: &str = "assets";

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed={}", ASSET_DIR);

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    if !manifest_dir.join(ASSET_DIR).exists() {
        return Ok(());
    }

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    let paths_to_copy = vec![manifest_dir.join(ASSET_DIR)];
    copy_items(&paths_to_copy, out_dir, &copy_options)?;

    Ok(())
}
