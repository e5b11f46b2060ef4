use crate::build::cache::WriteCache;
use crate::content::{OutputUnit, write_file};
use crate::plugin::Registry;
use crate::site::Site;
use crate::source::{self, SourceFilter};
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct WriteStats {
    pub written: usize,
    pub unchanged: usize,
}

/// 写出文章、页面和静态文件，最后复制 assets 目录
pub fn write(site: &Site, registry: &Registry) -> Result<WriteStats> {
    let dest = &site.dirs.dest;
    std::fs::create_dir_all(dest)
        .with_context(|| format!("创建目标目录失败：{}", dest.display()))?;

    let mut cache = WriteCache::load(&site.dirs.working);
    let mut stats = WriteStats::default();

    for post in &site.posts {
        emit(post, dest, &mut cache, &mut stats)?;
    }
    for page in &site.pages {
        emit(page, dest, &mut cache, &mut stats)?;
    }
    for file in &site.static_files {
        emit(file, dest, &mut cache, &mut stats)?;
    }
    tracing::info!("写入 {} 个文件，{} 个未变化", stats.written, stats.unchanged);

    if let Some(assets) = &site.dirs.assets {
        let copied = copy_assets(assets, dest, &site.filter());
        tracing::info!("已复制 {copied} 个资源文件");
    }

    cache.retain(&site.output_paths(dest));
    if let Err(e) = cache.save() {
        tracing::warn!("保存写入缓存失败：{e}");
    }

    for hook in registry.hooks() {
        hook.post_write(site)?;
    }
    Ok(stats)
}

fn emit(
    unit: &impl OutputUnit,
    dest: &Path,
    cache: &mut WriteCache,
    stats: &mut WriteStats,
) -> Result<()> {
    let path = unit.output_path(dest);
    let contents = unit.contents()?;
    if cache.check_and_update(&path, &contents) {
        write_file(&path, &contents)?;
        tracing::debug!("已写入：{}", path.display());
        stats.written += 1;
    } else {
        stats.unchanged += 1;
    }
    Ok(())
}

/// 按与 source 相同的过滤规则复制 assets，出错只记录日志
pub fn copy_assets(assets: &Path, dest: &Path, filter: &SourceFilter) -> usize {
    let entries = match source::load_entries(assets, filter) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("读取 assets 目录失败：{e}");
            return 0;
        }
    };

    let mut copied = 0;
    for entry in entries {
        let mut target = dest.to_path_buf();
        target.extend(entry.path.split('/').filter(|s| !s.is_empty()));
        target.push(&entry.name);

        let result = target
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| std::fs::copy(entry.file(), &target));
        match result {
            Ok(_) => copied += 1,
            Err(e) => tracing::error!("复制资源 {} 失败：{e}", entry.file().display()),
        }
    }
    copied
}
