use anyhow::Result;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CACHE_FILE: &str = "write-cache.json";

/// 输出文件的 SHA-256 缓存：只有磁盘上的文件与新内容一致时才跳过写入
pub struct WriteCache {
    hashes: HashMap<String, String>,
    cache_path: PathBuf,
}

impl WriteCache {
    /// 从缓存文件加载，不存在或损坏时返回空表
    pub fn load(working_dir: &Path) -> Self {
        let cache_path = working_dir.join(CACHE_FILE);
        let hashes = std::fs::read_to_string(&cache_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self { hashes, cache_path }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.hashes)?;
        std::fs::write(&self.cache_path, json)?;
        Ok(())
    }

    /// 计算文件的 SHA-256 哈希（十六进制）
    pub fn compute_hash(path: &Path) -> Result<String> {
        let data = std::fs::read(path)?;
        Ok(Self::hash_bytes(&data))
    }

    pub fn hash_bytes(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    /// 判断输出是否需要重新写入，并记录新的哈希。
    /// 缓存记录与新内容不同时直接判定为变更；否则以磁盘上的实际内容为准
    pub fn check_and_update(&mut self, path: &Path, data: &[u8]) -> bool {
        let key = path.to_string_lossy().into_owned();
        let hash = Self::hash_bytes(data);
        let unchanged = match self.hashes.get(&key) {
            Some(cached) if *cached != hash => false,
            _ => Self::compute_hash(path).is_ok_and(|on_disk| on_disk == hash),
        };
        self.hashes.insert(key, hash);
        !unchanged
    }

    /// 只保留本次构建的输出
    pub fn retain(&mut self, outputs: &[PathBuf]) {
        let keys: std::collections::HashSet<_> =
            outputs.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        self.hashes.retain(|k, _| keys.contains(k));
    }
}
