use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// 源目录中的一个文件，发现后不再变化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    root: PathBuf,
    /// 相对 source 根目录的目录路径，以 / 开头；根目录为空串
    pub path: String,
    pub name: String,
}

impl SourceEntry {
    pub fn new(root: impl Into<PathBuf>, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            path: path.into(),
            name: name.into(),
        }
    }

    pub fn file(&self) -> PathBuf {
        let mut file = self.root.clone();
        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            file.push(segment);
        }
        file.push(&self.name);
        file
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        let file = self.file();
        std::fs::read(&file).with_context(|| format!("读取源文件失败：{}", file.display()))
    }

    /// 去掉最后一个扩展名的文件名
    pub fn base_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[..idx],
            _ => &self.name,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => Some(&self.name[idx + 1..]),
            _ => None,
        }
    }
}

/// 源文件与资源目录共用的文件名过滤规则
#[derive(Debug, Clone, Default)]
pub struct SourceFilter {
    includes: Vec<String>,
    excludes: Vec<String>,
}

impl SourceFilter {
    pub fn new(includes: Vec<String>, excludes: Vec<String>) -> Self {
        Self { includes, excludes }
    }

    pub fn accept(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        // includes 优先于其他所有规则
        if self.includes.iter().any(|i| i == name) {
            return true;
        }
        if self.excludes.iter().any(|e| e == name) {
            return false;
        }
        if name.is_empty() || name.starts_with(['.', '_', '#']) || name.ends_with('~') {
            return false;
        }
        !is_hidden(path)
    }
}

#[cfg(windows)]
fn is_hidden(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    std::fs::metadata(path).is_ok_and(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
}

#[cfg(not(windows))]
fn is_hidden(_path: &Path) -> bool {
    // unix 下隐藏文件即以 . 开头，前面已经判断过
    false
}

/// 递归收集 source 目录下通过过滤的文件，同级按文件名排序
pub fn load_entries(root: &Path, filter: &SourceFilter) -> Result<Vec<SourceEntry>> {
    let mut entries = Vec::new();
    collect_entries(root, root, "", filter, &mut entries)?;
    tracing::debug!("共发现 {} 个源文件", entries.len());
    Ok(entries)
}

fn collect_entries(
    root: &Path,
    dir: &Path,
    rel: &str,
    filter: &SourceFilter,
    entries: &mut Vec<SourceEntry>,
) -> Result<()> {
    let mut children: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("读取目录失败：{}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    children.sort_by_key(|e| e.file_name());

    for child in children {
        let path = child.path();
        if !filter.accept(&path) {
            tracing::trace!("已忽略：{}", path.display());
            continue;
        }
        let name = child.file_name().to_string_lossy().into_owned();
        if path.is_dir() {
            let sub = format!("{rel}/{name}");
            collect_entries(root, &path, &sub, filter, entries)?;
        } else if path.is_file() {
            entries.push(SourceEntry::new(root, rel, name));
        }
    }
    Ok(())
}
