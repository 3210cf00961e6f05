//! 学习会话与进度存储
//!
//! 通过 `SessionStore` 注入到流程层，不使用全局单例。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, FileError};
use crate::models::progress::UserProgress;
use crate::models::session::StudySession;

/// 会话存储接口
pub trait SessionStore: Send + Sync {
    fn get_session(&self, id: &str) -> AppResult<Option<StudySession>>;

    /// 新增或覆盖会话；新会话排在最前
    fn put_session(&self, session: StudySession) -> AppResult<()>;

    /// 删除会话，返回是否存在
    fn delete_session(&self, id: &str) -> AppResult<bool>;

    /// 所有会话，最新创建的在前
    fn list_sessions(&self) -> AppResult<Vec<StudySession>>;

    /// 在同一把写锁内修改会话，会话不存在时返回 `None`
    fn update_session(
        &self,
        id: &str,
        change: &mut dyn FnMut(&mut StudySession),
    ) -> AppResult<Option<StudySession>>;

    fn get_progress(&self) -> AppResult<UserProgress>;

    fn put_progress(&self, progress: UserProgress) -> AppResult<()>;

    /// 在同一把写锁内修改学习进度，返回修改后的进度
    fn update_progress(
        &self,
        change: &mut dyn FnMut(&mut UserProgress),
    ) -> AppResult<UserProgress>;
}

fn upsert_session(state: &mut StoreState, session: StudySession) {
    match state.sessions.iter().position(|s| s.id == session.id) {
        Some(index) => state.sessions[index] = session,
        None => state.sessions.insert(0, session),
    }
}

fn remove_session(state: &mut StoreState, id: &str) -> bool {
    let before = state.sessions.len();
    state.sessions.retain(|s| s.id != id);
    state.sessions.len() != before
}

fn change_session(
    state: &mut StoreState,
    id: &str,
    change: &mut dyn FnMut(&mut StudySession),
) -> Option<StudySession> {
    let session = state.sessions.iter_mut().find(|s| s.id == id)?;
    change(session);
    Some(session.clone())
}

fn change_progress(
    state: &mut StoreState,
    change: &mut dyn FnMut(&mut UserProgress),
) -> UserProgress {
    change(&mut state.progress);
    state.progress.clone()
}

/// 存储快照（也是 JSON 文件的格式）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    sessions: Vec<StudySession>,
    progress: UserProgress,
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| AppError::Other("会话存储锁已损坏".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| AppError::Other("会话存储锁已损坏".to_string()))
    }
}

impl SessionStore for MemoryStore {
    fn get_session(&self, id: &str) -> AppResult<Option<StudySession>> {
        Ok(self.read()?.sessions.iter().find(|s| s.id == id).cloned())
    }

    fn put_session(&self, session: StudySession) -> AppResult<()> {
        upsert_session(&mut *self.write()?, session);
        Ok(())
    }

    fn delete_session(&self, id: &str) -> AppResult<bool> {
        Ok(remove_session(&mut *self.write()?, id))
    }

    fn list_sessions(&self) -> AppResult<Vec<StudySession>> {
        Ok(self.read()?.sessions.clone())
    }

    fn update_session(
        &self,
        id: &str,
        change: &mut dyn FnMut(&mut StudySession),
    ) -> AppResult<Option<StudySession>> {
        Ok(change_session(&mut *self.write()?, id, change))
    }

    fn get_progress(&self) -> AppResult<UserProgress> {
        Ok(self.read()?.progress.clone())
    }

    fn put_progress(&self, progress: UserProgress) -> AppResult<()> {
        self.write()?.progress = progress;
        Ok(())
    }

    fn update_progress(
        &self,
        change: &mut dyn FnMut(&mut UserProgress),
    ) -> AppResult<UserProgress> {
        Ok(change_progress(&mut *self.write()?, change))
    }
}

/// JSON 文件存储：内存存储 + 每次修改后写回快照
#[derive(Debug)]
pub struct JsonFileStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl JsonFileStore {
    /// 打开存储文件，文件不存在时从空状态开始
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
            let state: StoreState = serde_json::from_str(&content)?;
            info!(
                "📂 已加载会话存储: {} ({} 个会话)",
                path.display(),
                state.sessions.len()
            );
            state
        } else {
            StoreState::default()
        };

        Ok(Self {
            inner: MemoryStore::from_state(state),
            path,
        })
    }

    /// 修改状态并写回快照，写文件期间一直持有写锁
    fn mutate<R>(&self, change: impl FnOnce(&mut StoreState) -> R) -> AppResult<R> {
        let mut state = self.inner.write()?;
        let result = change(&mut state);
        self.persist(&state)?;
        Ok(result)
    }

    fn persist(&self, state: &StoreState) -> AppResult<()> {
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json).map_err(|source| FileError::WriteFailed {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!("会话存储已写入: {}", self.path.display());
        Ok(())
    }
}

impl SessionStore for JsonFileStore {
    fn get_session(&self, id: &str) -> AppResult<Option<StudySession>> {
        self.inner.get_session(id)
    }

    fn put_session(&self, session: StudySession) -> AppResult<()> {
        self.mutate(|state| upsert_session(state, session))
    }

    fn delete_session(&self, id: &str) -> AppResult<bool> {
        self.mutate(|state| remove_session(state, id))
    }

    fn list_sessions(&self) -> AppResult<Vec<StudySession>> {
        self.inner.list_sessions()
    }

    fn update_session(
        &self,
        id: &str,
        change: &mut dyn FnMut(&mut StudySession),
    ) -> AppResult<Option<StudySession>> {
        self.mutate(|state| change_session(state, id, change))
    }

    fn get_progress(&self) -> AppResult<UserProgress> {
        self.inner.get_progress()
    }

    fn put_progress(&self, progress: UserProgress) -> AppResult<()> {
        self.mutate(|state| state.progress = progress)
    }

    fn update_progress(
        &self,
        change: &mut dyn FnMut(&mut UserProgress),
    ) -> AppResult<UserProgress> {
        self.mutate(|state| change_progress(state, change))
    }
}
