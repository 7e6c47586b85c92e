//! Run capability checks from a check file against a surface file.
//!
//! Each check prints at most one diagnostic line on stdout, in the same form
//! the library verifiers use. With `--report` every check is audited instead
//! and one JSON report per check is emitted as NDJSON. The exit status is 0
//! only when every check passes.

use anyhow::{Context, Result, bail};
use binding_surface::{SurfaceRepository, Verdict, load_checks_from_path};
use log::info;
use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<bool> {
    let args = CliArgs::parse()?;
    let repo = SurfaceRepository::load(&args.surfaces)?;
    let checks = load_checks_from_path(&args.expect)?;
    info!(
        "running {} checks against {} surfaces",
        checks.len(),
        repo.len()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut all_passed = true;
    for check in &checks {
        if args.report {
            let report = check.audit(&repo)?;
            all_passed &= report.is_complete();
            serde_json::to_writer(&mut out, &report).context("writing report")?;
            writeln!(out).context("writing report")?;
        } else if let Verdict::Missing(missing) = check.run(&repo)? {
            all_passed = false;
            writeln!(out, "{missing}").context("writing diagnostic")?;
        }
    }
    out.flush().context("flushing stdout")?;
    Ok(all_passed)
}

struct CliArgs {
    surfaces: PathBuf,
    expect: PathBuf,
    report: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut surfaces: Option<PathBuf> = None;
        let mut expect: Option<PathBuf> = None;
        let mut report = false;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--surfaces" => {
                    if surfaces.is_some() {
                        bail!("--surfaces may only be provided once");
                    }
                    surfaces = Some(PathBuf::from(next_value(&mut args, "--surfaces")?));
                }
                "--expect" => {
                    if expect.is_some() {
                        bail!("--expect may only be provided once");
                    }
                    expect = Some(PathBuf::from(next_value(&mut args, "--expect")?));
                }
                "--report" => report = true,
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        let surfaces = surfaces.ok_or_else(|| anyhow::anyhow!("missing --surfaces\n{}", usage()))?;
        let expect = expect.ok_or_else(|| anyhow::anyhow!("missing --expect\n{}", usage()))?;
        Ok(Self {
            surfaces,
            expect,
            report,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow::anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: surface-check --surfaces PATH --expect PATH [--report]\n\
Loads a type surface file, runs every check in the check file, and prints one line per missing capability.\n\
  --report   audit every expected name and print one JSON report per check (NDJSON)\n\
Environment: SURFACE_SCHEMA_PATH overrides the surface schema; RUST_LOG controls logging.\n"
}
