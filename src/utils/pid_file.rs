use std::path::Path;

/// Mirrors `fs.go::checkPidFile`: if a pid file exists and `/proc/<pid>`
/// is still alive, refuse to start a second instance. A stale pid file
/// (process gone) is silently overwritten.
pub fn check_and_write(path: &Path) -> anyhow::Result<()> {
    if let Ok(contents) = std::fs::read_to_string(path) {
        if let Ok(pid) = contents.trim().parse::<u32>() {
            if process_is_alive(pid) {
                anyhow::bail!("agent already running with pid {pid}");
            }
        }
    }

    std::fs::write(path, std::process::id().to_string())?;
    Ok(())
}

pub fn remove(path: &Path) {
    let _ = std::fs::remove_file(path);
}

#[cfg(target_os = "linux")]
fn process_is_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}/stat")).exists()
}

#[cfg(not(target_os = "linux"))]
fn process_is_alive(_pid: u32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_own_pid_when_no_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.pid");
        check_and_write(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, std::process::id().to_string());
    }

    #[test]
    fn overwrites_a_stale_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.pid");
        std::fs::write(&path, "999999999").unwrap();
        check_and_write(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, std::process::id().to_string());
    }
}
