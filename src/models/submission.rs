use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 文件扩展名 → MIME 类型
static MIME_BY_EXTENSION: phf::Map<&'static str, &'static str> = phf_map! {
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "bmp" => "image/bmp",
    "pdf" => "application/pdf",
};

/// 根据文件扩展名推断 MIME 类型，未知扩展名返回 `application/octet-stream`
pub fn mime_from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| MIME_BY_EXTENSION.get(ext.as_str()).copied())
        .unwrap_or("application/octet-stream")
}

/// 试卷 / 答案 / 学生作答的来源：直接给出的文字，或需要识别的文件列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Text { text: String },
    Files { files: Vec<String> },
}

impl Source {
    /// 文件路径（相对路径以 `base_dir` 为基准）
    pub fn resolved_files(&self, base_dir: &Path) -> Vec<PathBuf> {
        match self {
            Source::Text { .. } => Vec::new(),
            Source::Files { files } => files
                .iter()
                .map(|file| {
                    let path = Path::new(file);
                    if path.is_absolute() {
                        path.to_path_buf()
                    } else {
                        base_dir.join(path)
                    }
                })
                .collect(),
        }
    }
}

/// 一份待批改的答卷（对应一个 TOML 文件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub question_paper: Source,
    pub answer_key: Source,
    pub student_answers: Source,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl Submission {
    /// TOML 文件所在目录，文件来源的相对路径以此为基准
    pub fn base_dir(&self) -> PathBuf {
        self.file_path
            .as_deref()
            .and_then(|p| Path::new(p).parent())
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }
}
