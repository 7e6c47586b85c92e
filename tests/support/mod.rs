use anyhow::{Context, Result};
use binding_surface::SurfaceRepository;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn fixture(name: &str) -> PathBuf {
    repo_root().join("surfaces").join(name)
}

pub fn alsa_repository() -> SurfaceRepository {
    SurfaceRepository::load(&fixture("alsa.json")).expect("fixture surfaces load")
}

pub fn surface_check() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_surface-check"))
}

fn surface_check_command(surfaces: &Path, expect: &Path, extra: &[&str]) -> Command {
    let mut cmd = Command::new(surface_check());
    cmd.arg("--surfaces")
        .arg(surfaces)
        .arg("--expect")
        .arg(expect)
        .args(extra)
        .env_remove("SURFACE_SCHEMA_PATH")
        .env_remove("RUST_LOG");
    cmd
}

fn output_of(mut cmd: Command) -> Result<Output> {
    cmd.output()
        .with_context(|| format!("failed to run command: {:?}", cmd))
}

/// Run surface-check without asserting on its exit status.
pub fn run_surface_check(surfaces: &Path, expect: &Path, extra: &[&str]) -> Result<Output> {
    output_of(surface_check_command(surfaces, expect, extra))
}

/// Run surface-check with `SURFACE_SCHEMA_PATH` pointing at `schema`.
pub fn run_surface_check_with_schema(
    surfaces: &Path,
    expect: &Path,
    schema: &Path,
) -> Result<Output> {
    let mut cmd = surface_check_command(surfaces, expect, &[]);
    cmd.env("SURFACE_SCHEMA_PATH", schema);
    output_of(cmd)
}

pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}
