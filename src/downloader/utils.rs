// Helper functions for backend implementations

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;

use super::errors::DownloadError;

/// Run a command to completion, optionally bounded by `timeout_secs`
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    timeout_secs: Option<u64>,
) -> Result<Output, DownloadError> {
    run_streaming(program, args, timeout_secs, |_| {}).await
}

/// Run a command, handing every stdout line to `on_line` as it arrives.
///
/// The returned `Output` carries the collected stdout and stderr.
pub async fn run_streaming<F>(
    program: &str,
    args: &[String],
    timeout_secs: Option<u64>,
    mut on_line: F,
) -> Result<Output, DownloadError>
where
    F: FnMut(&str),
{
    tracing::debug!("running: {} {}", program, args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::ExecutionError(format!("Failed to capture stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::ExecutionError(format!("Failed to capture stderr from {}", program)))?;

    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    let read_and_wait = async {
        let mut stdout = Vec::new();
        let mut reader = BufReader::new(stdout_pipe);
        let mut buf = Vec::new();
        // Titles may arrive in a non-UTF-8 locale encoding
        while reader.read_until(b'\n', &mut buf).await? > 0 {
            let line = String::from_utf8_lossy(&buf);
            on_line(line.trim_end_matches(['\r', '\n']));
            stdout.extend_from_slice(&buf);
            buf.clear();
        }
        let status = child.wait().await?;
        Ok::<_, std::io::Error>((status, stdout))
    };

    let waited = match timeout_secs {
        Some(secs) => timeout(Duration::from_secs(secs), read_and_wait)
            .await
            .map_err(|_| secs),
        None => Ok(read_and_wait.await),
    };

    let (status, stdout) = match waited {
        Ok(res) => res?,
        Err(secs) => {
            stderr_task.abort();
            kill_quietly(&mut child).await;
            return Err(DownloadError::TimedOut(secs));
        }
    };

    let stderr = stderr_task
        .await
        .map_err(|e| DownloadError::ExecutionError(format!("stderr task failed: {}", e)))??;

    Ok(Output { status, stdout, stderr })
}

async fn kill_quietly(child: &mut Child) {
    if let Err(e) = child.kill().await {
        tracing::warn!("failed to kill timed out process: {}", e);
    }
}

fn spawn_error(program: &str, e: std::io::Error) -> DownloadError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DownloadError::ToolNotFound(format!("{}: {}", program, e))
    } else {
        DownloadError::ExecutionError(format!("Failed to start {}: {}", program, e))
    }
}

/// Locate an executable: explicit override, common install paths, then `PATH`
pub fn find_executable(binary_name: &str, explicit: Option<&str>) -> Option<String> {
    if let Some(path) = explicit {
        return Some(path.to_string());
    }

    let common_paths = [
        format!("/opt/homebrew/bin/{}", binary_name),
        format!("/usr/local/bin/{}", binary_name),
        format!("/usr/bin/{}", binary_name),
    ];
    for path in common_paths {
        if Path::new(&path).exists() {
            return Some(path);
        }
    }

    search_path(binary_name)
}

fn search_path(binary_name: &str) -> Option<String> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary_name))
        .find(|candidate| candidate.is_file())
        .map(|p| p.to_string_lossy().to_string())
}

/// Python interpreter; `TUBEFETCH_PYTHON` points at a venv if needed
pub fn python_cmd(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var("TUBEFETCH_PYTHON").ok())
        .unwrap_or_else(|| "python3".to_string())
}

/// yt-dlp executable; `TUBEFETCH_YTDLP` overrides the search
pub fn ytdlp_cmd(explicit: Option<&str>) -> String {
    let env_override = std::env::var("TUBEFETCH_YTDLP").ok();
    find_executable("yt-dlp", explicit.or(env_override.as_deref()))
        .unwrap_or_else(|| "yt-dlp".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_executable_wins() {
        assert_eq!(
            find_executable("yt-dlp", Some("/opt/tools/yt-dlp")),
            Some("/opt/tools/yt-dlp".to_string())
        );
    }

    #[test]
    fn test_python_cmd_explicit() {
        assert_eq!(python_cmd(Some("/venv/bin/python")), "/venv/bin/python");
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_not_found() {
        let err = run_output_with_timeout("tubefetch-definitely-missing-binary", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::ToolNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_streaming_collects_lines() {
        let mut seen = Vec::new();
        let args = vec!["-c".to_string(), "echo one; echo two; echo err >&2".to_string()];
        let output = run_streaming("sh", &args, Some(10), |line| seen.push(line.to_string()))
            .await
            .unwrap();
        assert!(output.status.success());
        assert_eq!(seen, vec!["one", "two"]);
        assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_streaming_survives_non_utf8_output() {
        let mut seen = Vec::new();
        let args = vec![
            "-c".to_string(),
            "printf '[download] Destination: caf\\351.mp4\\n'; echo done".to_string(),
        ];
        let output = run_streaming("sh", &args, Some(10), |line| seen.push(line.to_string()))
            .await
            .unwrap();
        assert!(output.status.success());
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("[download] Destination: caf"));
        assert!(seen[0].ends_with(".mp4"));
        assert_eq!(seen[1], "done");
        assert!(output.stdout.contains(&0xe9));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_process() {
        let args = vec!["-c".to_string(), "sleep 5".to_string()];
        let err = run_output_with_timeout("sh", &args, Some(1)).await.unwrap_err();
        assert!(matches!(err, DownloadError::TimedOut(1)));
    }
}
