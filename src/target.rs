use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::error::{FuzzError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    /// `sh -c` on Unix, `cmd.exe /c` on Windows.
    System,
    /// Split the command on whitespace and exec the first word directly.
    Direct,
}

/// Launch configuration for the program under test. Read-only once built;
/// every input gets a fresh [`Command`] from [`Target::command`].
#[derive(Debug, Clone)]
pub struct Target {
    pub command: String,
    pub working_dir: PathBuf,
    pub shell: Shell,
    /// `None` waits for the target forever.
    pub timeout: Option<Duration>,
}

impl Target {
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Target {
            command: command.into(),
            working_dir: working_dir.into(),
            shell: Shell::System,
            timeout: None,
        }
    }

    pub fn with_shell(mut self, shell: Shell) -> Self {
        self.shell = shell;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> Command {
        let mut cmd = match self.shell {
            Shell::System => {
                let (shell, flag) = system_shell();
                let mut cmd = Command::new(shell);
                cmd.arg(flag).arg(&self.command);
                cmd
            }
            Shell::Direct => {
                let (program, args) = parse_command(&self.command);
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
        };
        cmd.current_dir(&self.working_dir);
        // Own process group, so a timeout can take down the whole tree.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }

    /// Runs the pre-flight check and returns a target that launches the
    /// program the check found. A bare name that only exists in the working
    /// directory is rewritten to a `./name` path, since neither the shell nor
    /// a direct exec would look there.
    pub fn resolve(mut self) -> Result<Self> {
        resolve_program(&self.command, &self.working_dir)?;

        let (program, _) = parse_command(&self.command);
        if is_bare(&program) && search_path(&program, std::env::var_os("PATH")).is_none() {
            self.command = format!(".{}{}", std::path::MAIN_SEPARATOR, self.command.trim_start());
        }
        Ok(self)
    }

    /// Human-readable argv, e.g. `["sh", "-c", "./parser"]`.
    pub fn argv(&self) -> Vec<String> {
        let cmd = self.command();
        std::iter::once(cmd.get_program())
            .chain(cmd.get_args())
            .map(|s| s.to_string_lossy().to_string())
            .collect()
    }
}

fn system_shell() -> (&'static str, &'static str) {
    if cfg!(windows) {
        ("cmd.exe", "/c")
    } else {
        ("sh", "-c")
    }
}

pub fn parse_command(cmd: &str) -> (String, Vec<String>) {
    let mut parts = cmd.split_whitespace();
    match parts.next() {
        Some(program) => (program.to_string(), parts.map(|s| s.to_string()).collect()),
        None => (cmd.to_string(), vec![]),
    }
}

/// Pre-flight check: locate the program word of `command`.
///
/// Paths (anything containing a separator, or absolute) are resolved against
/// `working_dir`. A bare name is looked up on `PATH` first, then in
/// `working_dir`.
pub fn resolve_program(command: &str, working_dir: &Path) -> Result<PathBuf> {
    let not_found = || FuzzError::CommandNotFound {
        command: command.to_string(),
        working_dir: working_dir.to_path_buf(),
    };

    let (program, _) = parse_command(command);
    if program.is_empty() {
        return Err(not_found());
    }

    if is_bare(&program) {
        if let Some(found) = search_path(&program, std::env::var_os("PATH")) {
            return Ok(found);
        }
    }

    let in_wd = working_dir.join(&program);
    if in_wd.is_file() {
        Ok(in_wd)
    } else {
        Err(not_found())
    }
}

fn is_bare(program: &str) -> bool {
    !Path::new(program).is_absolute()
        && !program.contains(std::path::MAIN_SEPARATOR)
        && !program.contains('/')
}

fn search_path(program: &str, path_var: Option<OsString>) -> Option<PathBuf> {
    let path_var = path_var?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| candidate.is_file())
}

fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    if cfg!(windows) {
        ["", ".exe", ".cmd", ".bat"]
            .iter()
            .map(|ext| dir.join(format!("{program}{ext}")))
            .collect()
    } else {
        vec![dir.join(program)]
    }
}
