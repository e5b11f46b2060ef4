pub mod cache;
pub mod pipeline;
pub mod stage;
pub mod stages;

use crate::config::{SiteConfig, SiteDirs};
use crate::plugin::Registry;
use crate::site::Site;
use crate::template::TemplateRenderer;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// 构建统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub posts: usize,
    pub pages: usize,
    pub static_files: usize,
    pub written: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

/// 命令行对配置的覆盖
#[derive(Debug, Default, Clone)]
pub struct BuildOptions {
    pub show_drafts: Option<bool>,
    pub destination: Option<PathBuf>,
}

/// 加载配置并完整构建一次站点，每次调用都使用全新的 Site
pub fn run(site_root: &Path, options: BuildOptions) -> Result<BuildStats> {
    let mut config = SiteConfig::load(site_root)?;
    if let Some(show) = options.show_drafts {
        config.show_drafts = show;
    }
    if let Some(dest) = options.destination {
        config.destination = Some(dest);
    }
    run_with_config(site_root, config)
}

pub fn run_with_config(site_root: &Path, config: SiteConfig) -> Result<BuildStats> {
    let dirs = SiteDirs::resolve(site_root, &config)?;
    tracing::info!(
        "source：{}，输出：{}",
        dirs.source.display(),
        dirs.dest.display()
    );

    let registry = Registry::with_defaults(&config);
    let mut site = Site::new(config, dirs)?;
    let renderer = TemplateRenderer::new(&site.dirs.templates, &site);

    pipeline::execute(&mut site, &registry, &renderer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn list(dir: &Path) -> Vec<String> {
        let mut files: Vec<_> = stages::cleanup::collect_existing(dir)
            .into_iter()
            .map(|p| p.strip_prefix(dir).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        files.sort();
        files
    }

    fn sample_site() -> SiteFixture {
        let fixture = SiteFixture::new();
        fixture.config("title = \"Demo\"\nplugins = [\"category_pages\", \"tag_pages\", \"paginate\"]\n");
        fixture.write_source(
            "2024/first.md",
            "---\nlayout: post\ntitle: First\ndate: 2024-01-01\ncategories: [Notes]\ntags: [rust]\n---\nOne<!--more-->More",
        );
        fixture.write_source(
            "2024/second.md",
            "---\nlayout: post\ntitle: Second\ndate: 2024-02-01\ncategories: [Notes]\n---\nTwo",
        );
        fixture.write_source("about.md", "---\ntitle: About\nlayout: page\n---\nMe");
        fixture.write_source("css/site.css", "body {}");
        fixture
    }

    #[test]
    fn full_build_writes_every_output() {
        let fixture = sample_site();
        fixture.write_asset("img/logo.svg", "<svg/>");
        let stats = fixture.build().unwrap();

        assert_eq!(stats.posts, 2);
        assert_eq!(stats.static_files, 1);
        // about + 分类 + 标签 + 首页
        assert_eq!(stats.pages, 4);
        assert_eq!(stats.deleted, 0);

        assert_eq!(
            list(&fixture.dest()),
            vec![
                "2024/first/index.html",
                "2024/second/index.html",
                "about.html",
                "category/notes/index.html",
                "css/site.css",
                "img/logo.svg",
                "index.html",
                "tag/rust/index.html",
            ]
        );
    }

    #[test]
    fn stale_outputs_are_removed_and_current_ones_kept() {
        let fixture = sample_site();
        fixture.build().unwrap();

        let stale = fixture.dest().join("old/index.html");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();
        std::fs::remove_file(fixture.root().join("source/2024/second.md")).unwrap();

        let stats = fixture.build().unwrap();
        assert!(!stale.exists());
        assert!(!fixture.dest().join("2024/second/index.html").exists());
        assert!(fixture.dest().join("2024/first/index.html").is_file());
        assert_eq!(stats.deleted, 2);
    }

    #[test]
    fn rebuilding_unchanged_sources_is_idempotent() {
        let fixture = sample_site();
        let first = fixture.build().unwrap();
        let before = list(&fixture.dest());

        let second = fixture.build().unwrap();
        assert_eq!(list(&fixture.dest()), before);
        assert_eq!(second.deleted, 0);
        assert_eq!(second.written, 0);
        assert_eq!(second.unchanged, first.written);
    }

    #[test]
    fn edited_outputs_are_restored() {
        let fixture = sample_site();
        fixture.build().unwrap();
        let post = fixture.dest().join("2024/first/index.html");
        let expected = std::fs::read_to_string(&post).unwrap();

        std::fs::write(&post, "TAMPERED").unwrap();
        let stats = fixture.build().unwrap();
        assert_eq!(stats.written, 1);
        assert_eq!(std::fs::read_to_string(&post).unwrap(), expected);
    }

    #[test]
    fn removed_asset_no_longer_shadows_page() {
        let fixture = sample_site();
        fixture.write_asset("about.html", "ASSET");
        fixture.build().unwrap();
        let about = fixture.dest().join("about.html");
        assert_eq!(std::fs::read_to_string(&about).unwrap(), "ASSET");

        std::fs::remove_file(fixture.root().join("assets/about.html")).unwrap();
        fixture.build().unwrap();
        let page = std::fs::read_to_string(&about).unwrap();
        assert!(page.starts_with("<main>") && page.contains("Me"), "{page}");
    }

    #[test]
    fn cli_overrides_apply() {
        let fixture = sample_site();
        fixture.write_source("wip.md", "---\nlayout: post\ndate: 2024-03-01\npublished: false\n---\nWIP");
        let other = fixture.root().join("../elsewhere");

        let stats = run(
            fixture.root(),
            BuildOptions {
                show_drafts: Some(true),
                destination: Some(other.clone()),
            },
        )
        .unwrap();
        assert_eq!(stats.posts, 3);
        assert!(other.join("wip/index.html").is_file());
    }

    #[test]
    fn destination_containing_source_is_rejected() {
        let fixture = sample_site();
        let err = run(
            fixture.root(),
            BuildOptions {
                destination: Some(PathBuf::from(".")),
                ..BuildOptions::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("不能等于或包含"));
    }
}
