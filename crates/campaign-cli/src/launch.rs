//! Handing vault files to external programs.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("no program configured")]
    Empty,

    #[error(
        "{program} not found\n\n\
         Set it in config.yaml under `programs`, or export $EDITOR / $PAGER."
    )]
    NotFound { program: String },

    #[error("{program} exited with {status}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
    },

    #[error("could not run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Programs
// ---------------------------------------------------------------------------

/// Split a configured command such as `code --wait` into program and args,
/// and locate the program on `PATH`.
fn command_for(command_line: &str) -> Result<(PathBuf, Vec<&str>), LaunchError> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next().ok_or(LaunchError::Empty)?;
    let path = which::which(program).map_err(|_| LaunchError::NotFound {
        program: program.to_string(),
    })?;
    Ok((path, parts.collect()))
}

/// Run `command_line <path>` in the foreground and wait for it.
pub fn run(command_line: &str, path: &Path) -> Result<(), LaunchError> {
    let (program, args) = command_for(command_line)?;
    tracing::debug!(program = %program.display(), file = %path.display(), "launching");
    let status = Command::new(&program)
        .args(args)
        .arg(path)
        .status()
        .map_err(|source| LaunchError::Io {
            program: command_line.to_string(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(LaunchError::Failed {
            program: command_line.to_string(),
            status,
        })
    }
}

/// Start `command_line <path>` in the background, output discarded.
pub fn spawn(command_line: &str, path: &Path) -> Result<(), LaunchError> {
    let (program, args) = command_for(command_line)?;
    Command::new(&program)
        .args(args)
        .arg(path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| LaunchError::Io {
            program: command_line.to_string(),
            source,
        })?;
    Ok(())
}

/// Open `path` with the desktop's default handler.
pub fn open_default(path: &Path) -> Result<(), LaunchError> {
    open::that(path).map_err(|source| LaunchError::Io {
        program: "default viewer".to_string(),
        source,
    })
}

/// Best-effort desktop notification. A missing notifier is not an error.
pub fn notify(notifier: &str, title: &str, body: &str) {
    let Ok(program) = which::which(notifier) else {
        tracing::debug!(notifier, "notifier not installed, skipping notification");
        return;
    };
    let result = Command::new(program)
        .args(["-u", "normal", title, body])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match result {
        Ok(status) if !status.success() => {
            tracing::warn!(notifier, %status, "notification failed");
        }
        Err(e) => tracing::warn!(notifier, "notification failed: {e}"),
        Ok(_) => {}
    }
}
