use anyhow::Result;
use std::process::Command;

pub fn run_clippy() -> Result<()> {
    println!("running cargo clippy...");

    let status = Command::new("cargo")
        .args(["clippy", "--all-targets", "--all-features", "--", "-D", "warnings"])
        .status()?;

    if status.success() {
        println!("clippy checks passed");
    } else {
        println!("clippy found issues");
    }

    Ok(())
}
