use anyhow::Result;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::error::GbeError;

/// Captured result of a finished external program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, `None` when terminated by a signal.
    pub status: Option<i32>,
    /// stdout followed by stderr.
    pub output: String,
}

/// Seam for spawning external tools (the archiver, `strings`, generators).
///
/// `Err` means the program could not be started; a program that ran and
/// failed returns `Ok` with `success == false`.
pub trait ProcessRunner {
    fn run(&self, program: &OsStr, args: &[OsString], cwd: Option<&Path>) -> Result<CommandOutput>;
}

/// Runs programs with [`std::process::Command`] and waits for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &OsStr, args: &[OsString], cwd: Option<&Path>) -> Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        let out = cmd.output().map_err(|source| GbeError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;
        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));
        Ok(CommandOutput {
            success: out.status.success(),
            status: out.status.code(),
            output,
        })
    }
}

/// Run and turn an unsuccessful exit into [`GbeError::CommandFailed`].
pub fn run_checked(
    runner: &dyn ProcessRunner,
    program: &OsStr,
    args: &[OsString],
    cwd: Option<&Path>,
) -> Result<CommandOutput> {
    let out = runner.run(program, args, cwd)?;
    if !out.success {
        return Err(GbeError::CommandFailed {
            program: program.to_string_lossy().into_owned(),
            status: out.status,
            output: out.output,
        }
        .into());
    }
    Ok(out)
}

#[cfg(unix)]
pub fn make_executable(p: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perm = fs::metadata(p)?.permissions();
    perm.set_mode(0o755);
    fs::set_permissions(p, perm)?;
    Ok(())
}
#[cfg(not(unix))]
pub fn make_executable(_p: &Path) -> Result<()> {
    Ok(())
}
