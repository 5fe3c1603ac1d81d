use anyhow::{bail, Result};
use std::process::Command;

pub fn run_fmt() -> Result<()> {
    println!("running cargo fmt --all...");

    let status = Command::new("cargo").args(["fmt", "--all"]).status()?;

    if !status.success() {
        bail!("cargo fmt failed");
    }

    println!("format completed successfully");
    Ok(())
}
