//! Subprocess runner shared by the tool adapters.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::error::ConverterError;

/// Maximum number of stderr bytes kept in an error.
const STDERR_LIMIT: usize = 4096;

/// Runs `binary` with `args` and waits for it to exit.
///
/// Fails on spawn errors, non-zero exit and timeout. The child is killed if
/// the timeout elapses.
pub(crate) async fn run_tool(
    binary: &Path,
    args: &[String],
    timeout_secs: u64,
) -> Result<(), ConverterError> {
    let child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ConverterError::from_spawn(binary, e))?;

    let output = match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await
    {
        Ok(result) => result?,
        Err(_) => return Err(ConverterError::Timeout { timeout_secs }),
    };

    if !output.status.success() {
        let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.len() > STDERR_LIMIT {
            let mut cut = STDERR_LIMIT;
            while !stderr.is_char_boundary(cut) {
                cut -= 1;
            }
            stderr.truncate(cut);
        }
        return Err(ConverterError::conversion_failed(
            format!(
                "{} exited with code: {:?}",
                binary.display(),
                output.status.code()
            ),
            if stderr.is_empty() { None } else { Some(stderr) },
        ));
    }

    Ok(())
}

/// Checks that `binary` can be spawned at all.
pub(crate) async fn probe_binary(binary: &Path, version_arg: &str) -> Result<(), ConverterError> {
    Command::new(binary)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|_| ())
        .map_err(|e| ConverterError::from_spawn(binary, e))
}
