use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use rpmrm_core::ScriptPhase;
use thiserror::Error;
use tracing::debug;

use crate::layout::RootLayout;

pub const SCRIPT_PATH_PREAMBLE: &str =
    "PATH=/sbin:/bin:/usr/sbin:/usr/bin:/usr/X11R6/bin\nexport PATH\n";

pub const INSTALL_PREFIX_ENV: &str = "RPM_INSTALL_PREFIX";

const DEFAULT_SHELL: &str = "/bin/sh";

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("error creating file for (un)install script")]
    TempFile {
        #[source]
        source: io::Error,
    },

    #[error("failed to start {phase} script")]
    Spawn {
        phase: ScriptPhase,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for {phase} script")]
    Wait {
        phase: ScriptPhase,
        #[source]
        source: io::Error,
    },

    #[error("execution of {phase} script failed: {}", describe_exit(.code, .signal))]
    Failed {
        phase: ScriptPhase,
        code: Option<i32>,
        signal: Option<i32>,
    },
}

fn describe_exit(code: &Option<i32>, signal: &Option<i32>) -> String {
    match (code, signal) {
        (Some(code), _) => format!("exit status {code}"),
        (None, Some(signal)) => format!("killed by signal {signal}"),
        (None, None) => "abnormal termination".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    Skipped,
    NoScript,
    Succeeded,
}

#[derive(Debug, Clone, Copy)]
pub struct ScriptInvocation<'a> {
    pub phase: ScriptPhase,
    pub body: Option<&'a str>,
    pub arg: usize,
    pub install_prefix: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct ScriptRunner {
    shell: PathBuf,
    debug: bool,
    script_dir: Option<PathBuf>,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self {
            shell: PathBuf::from(DEFAULT_SHELL),
            debug: false,
            script_dir: None,
        }
    }
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = Some(dir.into());
        self
    }

    pub fn run(
        &self,
        layout: &RootLayout,
        invocation: &ScriptInvocation<'_>,
        skip: bool,
    ) -> Result<ScriptOutcome, ScriptError> {
        if skip {
            return Ok(ScriptOutcome::Skipped);
        }
        let Some(body) = invocation.body else {
            return Ok(ScriptOutcome::NoScript);
        };

        let phase = invocation.phase;
        let script = self.materialize(body)?;

        let mut command = Command::new(&self.shell);
        command
            .arg(if self.debug { "-xs" } else { "-s" })
            .arg(invocation.arg.to_string())
            .stdin(Stdio::from(script));
        if let Some(prefix) = invocation.install_prefix {
            command.env(INSTALL_PREFIX_ENV, prefix);
        }
        if !layout.is_system_root() {
            debug!("performing chroot({})", layout.root().display());
            confine_to_root(&mut command, layout.root())
                .map_err(|source| ScriptError::Spawn { phase, source })?;
        }

        let spawned = command.spawn();
        // Drops the parent's handle on the script file.
        drop(command);
        let mut child = spawned.map_err(|source| ScriptError::Spawn { phase, source })?;
        let status = child
            .wait()
            .map_err(|source| ScriptError::Wait { phase, source })?;

        if status.success() {
            return Ok(ScriptOutcome::Succeeded);
        }
        Err(ScriptError::Failed {
            phase,
            code: status.code(),
            signal: exit_signal(&status),
        })
    }

    fn materialize(&self, body: &str) -> Result<File, ScriptError> {
        let temp_error = |source| ScriptError::TempFile { source };
        let mut file = if self.debug {
            let mut builder = tempfile::Builder::new();
            builder.prefix("rpmrm-script.");
            let named = match &self.script_dir {
                Some(dir) => builder.tempfile_in(dir),
                None => builder.tempfile(),
            }
            .map_err(temp_error)?;
            let (file, path) = named.keep().map_err(|err| temp_error(err.error))?;
            debug!("script found - running from file {}", path.display());
            file
        } else {
            match &self.script_dir {
                Some(dir) => tempfile::tempfile_in(dir),
                None => tempfile::tempfile(),
            }
            .map_err(temp_error)?
        };

        file.write_all(SCRIPT_PATH_PREAMBLE.as_bytes())
            .and_then(|()| file.write_all(body.as_bytes()))
            .and_then(|()| file.seek(SeekFrom::Start(0)))
            .map_err(temp_error)?;
        Ok(file)
    }
}

#[cfg(unix)]
fn confine_to_root(command: &mut Command, root: &Path) -> io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::process::CommandExt;

    let root = CString::new(root.as_os_str().as_bytes())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    // Runs in the forked child only; the parent's root and cwd stay intact.
    unsafe {
        command.pre_exec(move || {
            if libc::chroot(root.as_ptr()) != 0 {
                return Err(io::Error::last_os_error());
            }
            if libc::chdir(b"/\0".as_ptr().cast()) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
    Ok(())
}

#[cfg(not(unix))]
fn confine_to_root(_command: &mut Command, root: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot confine scripts to {}", root.display()),
    ))
}

#[cfg(unix)]
fn exit_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
