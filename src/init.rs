use crate::config::CONFIG_FILE;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

// 嵌入默认站点骨架
const SKELETON: &[(&str, &str)] = &[
    (CONFIG_FILE, include_str!("../skeleton/cpress.toml")),
    ("templates/base.html", include_str!("../skeleton/templates/base.html")),
    ("templates/post.html", include_str!("../skeleton/templates/post.html")),
    ("templates/page.html", include_str!("../skeleton/templates/page.html")),
    ("templates/list.html", include_str!("../skeleton/templates/list.html")),
    ("templates/index.html", include_str!("../skeleton/templates/index.html")),
    ("templates/category.html", include_str!("../skeleton/templates/category.html")),
    ("templates/tag.html", include_str!("../skeleton/templates/tag.html")),
    ("source/2024/hello-world.md", include_str!("../skeleton/source/2024/hello-world.md")),
    ("source/about.md", include_str!("../skeleton/source/about.md")),
    ("assets/css/site.css", include_str!("../skeleton/assets/css/site.css")),
];

/// 在 `root` 下创建站点骨架。
/// 返回 `true` 表示执行了初始化，`false` 表示 cpress.toml 已存在，不做任何改动。
pub fn init_site(root: &Path) -> Result<bool> {
    if root.join(CONFIG_FILE).exists() {
        return Ok(false);
    }

    for (rel, content) in SKELETON {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("创建目录失败：{}", parent.display()))?;
        }
        // 已有的文件保持原样
        if path.exists() {
            tracing::debug!("已存在，跳过：{}", path.display());
            continue;
        }
        fs::write(&path, content).with_context(|| format!("写入失败：{}", path.display()))?;
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{self, BuildOptions};
    use tempfile::TempDir;

    #[test]
    fn skeleton_builds() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("site");
        assert!(init_site(&root).unwrap());
        assert!(!init_site(&root).unwrap());

        let dest = tmp.path().join("public");
        let stats = build::run(
            &root,
            BuildOptions {
                destination: Some(dest.clone()),
                ..BuildOptions::default()
            },
        )
        .unwrap();
        assert_eq!(stats.posts, 1);
        assert!(dest.join("2024/hello-world/index.html").is_file());
        assert!(dest.join("category/notes/index.html").is_file());
        assert!(dest.join("tag/cpress/index.html").is_file());
        assert!(dest.join("css/site.css").is_file());

        let index = std::fs::read_to_string(dest.join("index.html")).unwrap();
        assert!(index.contains("/2024/hello-world/"));
    }

    #[test]
    fn existing_files_are_kept() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("source")).unwrap();
        fs::write(tmp.path().join("source/about.md"), "mine").unwrap();
        init_site(tmp.path()).unwrap();
        assert_eq!(fs::read_to_string(tmp.path().join("source/about.md")).unwrap(), "mine");
    }
}
