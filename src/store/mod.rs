pub mod session_store;

pub use session_store::{JsonFileStore, MemoryStore, SessionStore};

use crate::config::Config;
use crate::error::AppResult;
use std::sync::Arc;

/// 根据配置打开会话存储：配置了路径时使用 JSON 文件，否则只保存在内存中
pub fn open_store(config: &Config) -> AppResult<Arc<dyn SessionStore>> {
    Ok(match &config.session_store_path {
        Some(path) => Arc::new(JsonFileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_store_by_config() {
        let memory = open_store(&Config::default()).unwrap();
        assert!(memory.list_sessions().unwrap().is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let config = Config {
            session_store_path: Some(path.to_string_lossy().to_string()),
            ..Config::default()
        };
        let file_store = open_store(&config).unwrap();
        file_store.put_progress(Default::default()).unwrap();
        assert!(path.exists());
    }
}
