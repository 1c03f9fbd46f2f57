//! `trellis dev` and `trellis build`: run the project binary with the
//! `TRELLIS_*` environment set for the requested mode.

use std::path::{Path, PathBuf};
use std::process::Command;

use clap::Args;
use color_eyre::eyre::{bail, Result, WrapErr};
use tracing::{debug, info};
use trellis_core::config::{
    Mode, DEFAULT_HOST, DEFAULT_OUTPUT, DEFAULT_PORT, ENV_HOST, ENV_MODE, ENV_OUTPUT, ENV_PORT, ENV_WS_PORT,
};

#[derive(Args, Debug)]
pub struct DevArgs {
    /// HTTP port; the WebSocket listens on the next one unless --ws-port is given
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Interface to bind
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Explicit WebSocket port
    #[arg(long)]
    ws_port: Option<u16>,

    /// Project directory
    #[arg(long, default_value = ".")]
    path: PathBuf,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Output directory, relative to the project
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Build the project binary in release mode
    #[arg(long)]
    release: bool,

    /// Project directory
    #[arg(long, default_value = ".")]
    path: PathBuf,
}

pub fn dev(args: DevArgs, verbose: u8) -> Result<()> {
    let mut env = vec![
        (ENV_MODE, Mode::Dev.to_string()),
        (ENV_HOST, args.host.clone()),
        (ENV_PORT, args.port.to_string()),
    ];
    if let Some(ws_port) = args.ws_port {
        env.push((ENV_WS_PORT, ws_port.to_string()));
    }

    info!("starting dev server on http://{}:{}", args.host, args.port);
    run_project(project_command(&args.path, false, verbose, &env)?)
}

pub fn build(args: BuildArgs, verbose: u8) -> Result<()> {
    let env = vec![
        (ENV_MODE, Mode::Build.to_string()),
        (ENV_OUTPUT, args.output.display().to_string()),
    ];

    run_project(project_command(&args.path, args.release, verbose, &env)?)?;
    info!("static build written to {}", args.path.join(&args.output).display());
    Ok(())
}

/// `cargo run` in `dir` with `env` applied.
fn project_command(dir: &Path, release: bool, verbose: u8, env: &[(&str, String)]) -> Result<Command> {
    if !dir.join("Cargo.toml").is_file() {
        bail!("{} is not a cargo project (no Cargo.toml)", dir.display());
    }

    let mut cmd = Command::new("cargo");
    cmd.arg("run").current_dir(dir);
    if release {
        cmd.arg("--release");
    }
    if verbose == 0 {
        cmd.arg("--quiet");
    }
    for (key, value) in env {
        cmd.env(key, value);
    }
    if verbose > 0 && std::env::var_os("RUST_LOG").is_none() {
        cmd.env("RUST_LOG", if verbose == 1 { "debug" } else { "trace" });
    }
    Ok(cmd)
}

fn run_project(mut cmd: Command) -> Result<()> {
    debug!("running {:?}", cmd);
    let status = cmd.status().wrap_err("failed to run cargo")?;
    if !status.success() {
        bail!("project exited with {status}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::ffi::OsStr;

    fn envs(cmd: &Command) -> HashMap<String, String> {
        cmd.get_envs()
            .filter_map(|(k, v)| Some((k.to_str()?.to_string(), v?.to_str()?.to_string())))
            .collect()
    }

    #[test]
    fn rejects_non_cargo_directories() {
        let dir = std::env::temp_dir().join(format!("trellis-cli-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        assert!(project_command(&dir, false, 0, &[]).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn command_carries_mode_environment() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let cmd = project_command(
            dir,
            true,
            1,
            &[(ENV_MODE, Mode::Build.to_string()), (ENV_OUTPUT, "dist".into())],
        )
        .unwrap();

        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec![OsStr::new("run"), OsStr::new("--release")]);

        let env = envs(&cmd);
        assert_eq!(env[ENV_MODE], "build");
        assert_eq!(env[ENV_OUTPUT], "dist");
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(env["RUST_LOG"], "debug");
        }
        assert_eq!(cmd.get_current_dir(), Some(dir));
    }
}
