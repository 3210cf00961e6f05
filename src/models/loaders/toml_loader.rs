use crate::models::submission::Submission;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载一份答卷
pub async fn load_submission(toml_file_path: &Path) -> Result<Submission> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let submission: Submission = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(submission.with_file_path(toml_file_path.to_string_lossy().to_string()))
}

/// 从文件夹中加载所有答卷 TOML 文件
///
/// 单个文件解析失败只记录警告并跳过，按文件名排序以保证处理顺序稳定。
pub async fn load_all_submissions(folder_path: &str) -> Result<Vec<Submission>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut submissions = Vec::with_capacity(toml_files.len());
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_submission(&path).await {
            Ok(submission) => submissions.push(submission),
            Err(e) => tracing::warn!("加载文件失败 {}: {:#}", path.display(), e),
        }
    }

    Ok(submissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::Source;

    const VALID: &str = r#"
name = "Bob"
question_paper = { text = "Q1. 2+2?" }
answer_key = { text = "4" }
student_answers = { files = ["bob.png"] }
"#;

    #[tokio::test]
    async fn test_load_all_submissions_skips_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_bob.toml"), VALID).unwrap();
        std::fs::write(dir.path().join("a_broken.toml"), "name = ").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let submissions = load_all_submissions(dir.path().to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].name, "Bob");
        assert_eq!(
            submissions[0].student_answers,
            Source::Files {
                files: vec!["bob.png".to_string()]
            }
        );
        assert!(submissions[0]
            .file_path
            .as_deref()
            .unwrap()
            .ends_with("b_bob.toml"));
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        let result = load_all_submissions("/definitely/not/here").await;
        assert!(result.is_err());
    }
}
