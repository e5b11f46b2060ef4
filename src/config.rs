use crate::error::SiteError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "cpress.toml";

/// cpress.toml 的完整结构（平铺的键值表）
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub root: String,
    #[serde(default)]
    pub show_drafts: bool,
    #[serde(default = "default_excerpt_separator")]
    pub excerpt_separator: String,
    #[serde(default = "default_related_posts")]
    pub related_posts: usize,
    #[serde(default)]
    pub category_names: BTreeMap<String, String>,
    #[serde(default)]
    pub tag_names: BTreeMap<String, String>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub destination: Option<PathBuf>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default = "default_paginate")]
    pub paginate: usize,
    #[serde(default = "default_category_dir")]
    pub category_dir: String,
    #[serde(default = "default_tag_dir")]
    pub tag_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 未识别的键原样保留，供模板通过 site.* 访问
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

impl SiteConfig {
    pub fn load(site_root: &Path) -> Result<Self> {
        let config_path = site_root.join(CONFIG_FILE);
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("读取 {} 失败", config_path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("解析 {} 失败", config_path.display()))?;
        if config.show_drafts {
            tracing::info!("已开启草稿显示");
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: SiteConfig = toml::from_str(content)?;
        config.root = normalize_root(&config.root);
        Ok(config)
    }

    /// 构建时间：优先取配置中的 time，否则为当前时间
    pub fn build_time(&self) -> Result<DateTime<Utc>, SiteError> {
        match self.time.as_deref() {
            Some(s) => crate::content::frontmatter::parse_date(s)
                .ok_or_else(|| SiteError::Config(format!("无法解析 time：{s}"))),
            None => Ok(Utc::now()),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            description: String::new(),
            root: String::new(),
            show_drafts: false,
            excerpt_separator: default_excerpt_separator(),
            related_posts: default_related_posts(),
            category_names: BTreeMap::new(),
            tag_names: BTreeMap::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            destination: None,
            working_dir: None,
            time: None,
            plugins: Vec::new(),
            paginate: default_paginate(),
            category_dir: default_category_dir(),
            tag_dir: default_tag_dir(),
            log_level: default_log_level(),
            extra: BTreeMap::new(),
        }
    }
}

/// 规范化 URL 前缀：结果为 "" 或以 / 开头且不以 / 结尾
pub fn normalize_root(root: &str) -> String {
    let root = root.trim();
    if root.is_empty() || root == "/" {
        return String::new();
    }
    let root = root.trim_end_matches('/');
    if root.starts_with('/') {
        root.to_string()
    } else {
        format!("/{root}")
    }
}

// 默认值函数
fn default_excerpt_separator() -> String { "<!--more-->".into() }
fn default_related_posts() -> usize { 5 }
fn default_paginate() -> usize { 10 }
fn default_category_dir() -> String { "category".into() }
fn default_tag_dir() -> String { "tag".into() }
fn default_log_level() -> String { "info".into() }

/// 站点相关目录，构建前统一解析并校验
#[derive(Debug, Clone)]
pub struct SiteDirs {
    pub source: PathBuf,
    pub templates: PathBuf,
    pub assets: Option<PathBuf>,
    pub dest: PathBuf,
    pub working: PathBuf,
}

impl SiteDirs {
    pub fn resolve(site_root: &Path, config: &SiteConfig) -> Result<Self, SiteError> {
        if !site_root.is_dir() || std::fs::read_dir(site_root).is_err() {
            return Err(SiteError::SiteDirMissing(site_root.to_path_buf()));
        }

        let source = site_root.join("source");
        if !source.is_dir() || std::fs::read_dir(&source).is_err() {
            return Err(SiteError::SourceDirMissing(source));
        }

        let mut templates = site_root.join("templates");
        if !templates.is_dir() {
            templates = source.join("_templates");
        }
        if !templates.is_dir() {
            return Err(SiteError::TemplatesDirMissing(site_root.to_path_buf()));
        }

        let assets = Some(site_root.join("assets")).filter(|p| p.is_dir());

        let site_name = site_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "site".into());

        let dest = match &config.destination {
            Some(d) => site_root.join(d),
            None => site_root.join("..").join("public").join(&site_name),
        };
        let dest = normalize_path(&dest);

        let working = match &config.working_dir {
            Some(w) => site_root.join(w),
            None => std::env::temp_dir().join("cpress-cache").join(&site_name),
        };

        let source = normalize_path(&source);
        if dest == source || source.starts_with(&dest) {
            return Err(SiteError::DestinationContainsSource { dest, src: source });
        }

        Ok(Self {
            source,
            templates,
            assets,
            dest,
            working,
        })
    }
}

/// 词法层面消除 `.` 与 `..`，目标目录可能尚不存在，无法 canonicalize
fn normalize_path(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
