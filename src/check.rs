use crate::build::stages::read::read;
use crate::config::{CONFIG_FILE, SiteConfig, SiteDirs};
use crate::plugin::Registry;
use crate::site::Site;
use crate::template::{Renderer, TemplateRenderer};
use anyhow::Result;
use std::path::Path;

pub struct CheckResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// 依次检查配置、目录、分类层级、插件、模板和源文件，不写出任何文件
pub fn run(site_root: &Path) -> Result<CheckResult> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Some(config) = check_config(site_root, &mut errors) {
        check_site(site_root, config, &mut errors, &mut warnings);
    }

    Ok(CheckResult { errors, warnings })
}

fn check_config(root: &Path, errors: &mut Vec<String>) -> Option<SiteConfig> {
    if !root.join(CONFIG_FILE).exists() {
        errors.push(format!("缺少 {CONFIG_FILE} 配置文件"));
        return None;
    }
    match SiteConfig::load(root) {
        Ok(config) => Some(config),
        Err(e) => {
            errors.push(format!("{CONFIG_FILE} 解析失败: {e:#}"));
            None
        }
    }
}

fn check_site(
    root: &Path,
    config: SiteConfig,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    for name in &config.plugins {
        if !Registry::is_builtin(name) {
            warnings.push(format!("未知插件 '{name}'，构建时会被忽略"));
        }
    }

    let dirs = match SiteDirs::resolve(root, &config) {
        Ok(dirs) => dirs,
        Err(e) => {
            errors.push(e.to_string());
            return;
        }
    };
    if dirs.assets.is_none() {
        warnings.push("assets/ 目录不存在".to_string());
    }

    let mut site = match Site::new(config, dirs) {
        Ok(site) => site,
        Err(e) => {
            errors.push(e.to_string());
            return;
        }
    };

    let renderer = TemplateRenderer::new(&site.dirs.templates, &site);
    if !renderer.has_layout("post") {
        errors.push("缺少必需模板 post.html".to_string());
    }
    for (plugin, layout) in [
        ("category_pages", "category"),
        ("tag_pages", "tag"),
        ("paginate", "index"),
    ] {
        if site.config.plugins.iter().any(|p| p == plugin) && !renderer.has_layout(layout) {
            errors.push(format!("插件 {plugin} 需要模板 {layout}.html"));
        }
    }

    if let Err(e) = read(&mut site, &Registry::new()) {
        errors.push(format!("{e:#}"));
        return;
    }
    for page in &site.pages {
        if let Some(layout) = &page.layout
            && !renderer.has_layout(layout)
        {
            errors.push(format!("页面 {} 的模板 {layout}.html 不存在", page.url));
        }
    }
    for post in &site.posts {
        if !renderer.has_layout(&post.layout) {
            errors.push(format!(
                "文章 {} 的模板 {}.html 不存在",
                post.source.file().display(),
                post.layout
            ));
        }
    }
    if site.posts.is_empty() {
        warnings.push("没有任何文章".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn healthy_site_passes() {
        let fixture = SiteFixture::new();
        fixture.config("plugins = [\"paginate\"]\n");
        fixture.write_asset("a.css", "");
        fixture.write_source("a.md", "---\nlayout: post\ndate: 2024-01-01\n---\n");
        let result = run(fixture.root()).unwrap();
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn missing_config_is_an_error() {
        let fixture = SiteFixture::new();
        let result = run(fixture.root()).unwrap();
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn reports_taxonomy_templates_and_sources() {
        let fixture = SiteFixture::new();
        fixture.config("plugins = [\"nope\"]\n");
        fixture.write_source("a.md", "---\nlayout: post\ntitle: x\n---\n");
        let result = run(fixture.root()).unwrap();
        assert!(result.errors.iter().any(|e| e.contains("a.md")));
        assert!(result.warnings.iter().any(|w| w.contains("nope")));

        fixture.config("[category_names]\n\"x.y\" = \"Y\"\n");
        let result = run(fixture.root()).unwrap();
        assert!(result.errors.iter().any(|e| e.contains("x.y")));
    }

    #[test]
    fn missing_layouts_are_reported() {
        let fixture = SiteFixture::new();
        fixture.config("");
        fixture.write_source("about.md", "---\nlayout: fancy\n---\n");
        let result = run(fixture.root()).unwrap();
        assert!(result.errors.iter().any(|e| e.contains("fancy.html")));
    }
}
