use crate::plugin::Registry;
use crate::site::Site;
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 删除目标目录中不再对应任何输出的旧文件，返回删除数量
pub fn cleanup(site: &Site, registry: &Registry) -> Result<usize> {
    let dest = &site.dirs.dest;
    let expected = expected_outputs(site, dest);
    let deleted = prune(dest, &expected);
    if deleted > 0 {
        tracing::info!("已清理 {deleted} 个过期文件");
    }

    for hook in registry.hooks() {
        hook.post_cleanup(site)?;
    }
    Ok(deleted)
}

/// 本次构建所有文章、页面和静态文件的输出路径
pub fn expected_outputs(site: &Site, dest: &Path) -> HashSet<PathBuf> {
    site.output_paths(dest).into_iter().collect()
}

/// 递归列出目标目录中已有的普通文件，目录不存在时为空
pub fn collect_existing(dest: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_recursive(dest, &mut files);
    files
}

fn collect_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            tracing::warn!("读取目录 {} 失败，其中的旧文件不会被清理：{e}", dir.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        match entry.file_type() {
            Ok(t) if t.is_dir() => collect_recursive(&path, files),
            Ok(t) if t.is_file() => files.push(path),
            _ => {}
        }
    }
}

/// 删除 `expected` 之外的文件，删除失败只记录警告
pub fn prune(dest: &Path, expected: &HashSet<PathBuf>) -> usize {
    remove_stale(collect_existing(dest), expected)
}

fn remove_stale(existing: Vec<PathBuf>, expected: &HashSet<PathBuf>) -> usize {
    let mut deleted = 0;
    for path in existing {
        if expected.contains(&path) {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("已删除：{}", path.display());
                deleted += 1;
            }
            Err(e) => tracing::warn!("删除 {} 失败：{e}", path.display()),
        }
    }
    deleted
}
