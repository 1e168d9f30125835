use std::path::Path;

/// Mirrors `utils.go::Tail`/`file_utils.go::Sed`, but reads the log file
/// directly instead of shelling out to `tail`(1)/`sed`(1).
pub async fn tail_lines(path: &Path, n: usize) -> std::io::Result<String> {
    let contents = tokio::fs::read_to_string(path).await?;
    let lines: Vec<&str> = contents.lines().collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].join("\n"))
}

pub async fn read_all(path: &Path) -> std::io::Result<String> {
    tokio::fs::read_to_string(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tail_returns_only_the_last_n_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.log");
        tokio::fs::write(&path, "one\ntwo\nthree\nfour\n").await.unwrap();
        let tail = tail_lines(&path, 2).await.unwrap();
        assert_eq!(tail, "three\nfour");
    }
}
