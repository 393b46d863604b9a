//! 配置存储服务 - 业务能力层
//!
//! 只负责"按名称保存出题参数"能力，不关心流程

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::InputParameters;

/// 命名配置存储
///
/// 职责：
/// - 启动时读取一次 JSON 文件
/// - 每次保存/删除后整体写回
/// - 覆盖前的确认由调用方负责（见 `contains`）
pub struct ConfigStore {
    path: PathBuf,
    configurations: BTreeMap<String, InputParameters>,
}

impl ConfigStore {
    /// 打开存储文件
    ///
    /// 文件不存在时为空；内容无法解析时记录警告并视为空
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let configurations = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(configurations) => configurations,
                Err(e) => {
                    warn!("⚠️ 无法解析配置文件 {}: {}，将使用空配置", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("配置文件 {} 不存在，使用空配置", path.display());
                BTreeMap::new()
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let store = Self {
            path,
            configurations,
        };
        info!("💾 已加载 {} 个保存的配置", store.configurations.len());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保存配置（同名覆盖）
    pub fn save(&mut self, name: &str, params: &InputParameters) -> Result<(), StoreError> {
        let name = normalize_name(name)?;
        let replaced = self
            .configurations
            .insert(name.clone(), params.clone())
            .is_some();
        self.persist()?;

        if replaced {
            info!("💾 已覆盖配置 '{}'", name);
        } else {
            info!("💾 已保存配置 '{}'", name);
        }
        Ok(())
    }

    /// 读取配置
    pub fn load(&self, name: &str) -> Result<InputParameters, StoreError> {
        let name = normalize_name(name)?;
        self.configurations
            .get(&name)
            .cloned()
            .ok_or(StoreError::NotFound { name })
    }

    /// 删除配置
    pub fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        let name = normalize_name(name)?;
        if self.configurations.remove(&name).is_none() {
            return Err(StoreError::NotFound { name });
        }
        self.persist()?;
        info!("🗑️ 已删除配置 '{}'", name);
        Ok(())
    }

    /// 所有配置名称（排序后）
    pub fn list(&self) -> Vec<String> {
        self.configurations.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.configurations.contains_key(name.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let path = self.path.display().to_string();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.configurations).map_err(|source| {
            StoreError::Json {
                path: path.clone(),
                source,
            }
        })?;

        std::fs::write(&self.path, json).map_err(|source| StoreError::Io { path, source })?;
        debug!("配置文件已写入: {}", self.path.display());
        Ok(())
    }
}

fn normalize_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::EmptyName);
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(grade: &str) -> InputParameters {
        InputParameters {
            grade: grade.to_string(),
            ..InputParameters::default()
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.json");
        let store = ConfigStore::open(&path).unwrap();
        assert_eq!(store.path(), path.as_path());
        assert!(store.is_empty());
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_save_load_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("configs.json");

        let mut store = ConfigStore::open(&path).unwrap();
        store.save("KHTN 7 Giữa kỳ 1", &sample("Lớp 7")).unwrap();
        store.save(" Toán 9 ", &sample("Lớp 9")).unwrap();

        let reopened = ConfigStore::open(&path).unwrap();
        assert_eq!(reopened.list(), vec!["KHTN 7 Giữa kỳ 1", "Toán 9"]);
        assert_eq!(reopened.load("Toán 9").unwrap().grade, "Lớp 9");
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::open(dir.path().join("c.json")).unwrap();

        store.save("a", &sample("Lớp 6")).unwrap();
        assert!(store.contains("a"));
        store.save("a", &sample("Lớp 8")).unwrap();

        assert_eq!(store.list().len(), 1);
        assert_eq!(store.load("a").unwrap().grade, "Lớp 8");
    }

    #[test]
    fn test_delete_and_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        let mut store = ConfigStore::open(&path).unwrap();

        store.save("a", &sample("Lớp 6")).unwrap();
        store.delete("a").unwrap();

        assert!(matches!(store.load("a"), Err(StoreError::NotFound { .. })));
        assert!(matches!(store.delete("a"), Err(StoreError::NotFound { .. })));
        assert!(ConfigStore::open(&path).unwrap().is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::open(dir.path().join("c.json")).unwrap();
        assert!(matches!(
            store.save("   ", &InputParameters::default()),
            Err(StoreError::EmptyName)
        ));
    }

    #[test]
    fn test_corrupt_file_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = ConfigStore::open(&path).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_reads_camel_case_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        let json = serde_json::json!({
            "Toán 6": serde_json::to_value(InputParameters::default()).unwrap()
        });
        std::fs::write(&path, json.to_string()).unwrap();

        let store = ConfigStore::open(&path).unwrap();
        assert_eq!(store.load("Toán 6").unwrap(), InputParameters::default());
    }
}
