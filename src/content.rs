pub mod excerpt;
pub mod frontmatter;
pub mod markdown;

use crate::error::SiteError;
use crate::plugin::Converter;
use crate::site::taxonomy::Taxonomy;
use crate::source::SourceEntry;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use excerpt::Excerpt;
use frontmatter::ParsedSource;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 文章在 Site::posts 中的下标，读取阶段排序后重新编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId(pub usize);

/// 构造文章时需要的站点级选项
#[derive(Debug, Clone)]
pub struct PostOptions<'a> {
    pub excerpt_separator: &'a str,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub published: bool,
    pub draft: bool,
    pub date: DateTime<Utc>,
    pub layout: String,
    pub content: String,
    pub rendered: Option<String>,
    pub excerpt: String,
    pub excerpted: bool,
    pub excerpt_extracted: bool,
    pub categories: Vec<CategoryId>,
    pub tags: Vec<TagId>,
    pub next: Option<PostId>,
    pub previous: Option<PostId>,
    pub related: Option<Vec<PostId>>,
    pub source: SourceEntry,
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl Post {
    /// 由解析后的源文件构造文章。
    ///
    /// 引用到的分类和标签不存在时立即创建并登记到 `taxonomy`，
    /// 同时把 `index` 追加到它们的文章列表。
    pub fn new(
        index: PostId,
        source: SourceEntry,
        parsed: ParsedSource,
        taxonomy: &mut Taxonomy,
        options: &PostOptions<'_>,
    ) -> Result<Self, SiteError> {
        let fm = parsed.front_matter;

        let raw_date = fm.date.as_deref().ok_or_else(|| SiteError::MissingDate {
            file: source.file(),
        })?;
        let date = frontmatter::parse_date(raw_date).ok_or_else(|| SiteError::InvalidDate {
            file: source.file(),
            value: raw_date.to_string(),
        })?;

        let mut categories = Vec::new();
        for name in fm.category_names() {
            let id = taxonomy.category_or_create(&name, index);
            if !categories.contains(&id) {
                categories.push(id);
            }
        }
        let mut tags = Vec::new();
        for name in fm.tag_names() {
            let id = taxonomy.tag_or_create(&name, index);
            if !tags.contains(&id) {
                tags.push(id);
            }
        }

        let url = fm
            .url
            .clone()
            .unwrap_or_else(|| format!("{}/{}/", source.path, source.base_name()));

        let excerpt = Excerpt::resolve(fm.excerpt.as_deref(), &parsed.body, options.excerpt_separator);

        Ok(Self {
            id: url.clone(),
            url,
            title: fm.title,
            published: fm.published.unwrap_or(true),
            draft: fm.published == Some(false),
            date,
            layout: fm.layout.unwrap_or_else(|| "post".into()),
            content: parsed.body,
            rendered: None,
            excerpt: excerpt.text,
            excerpted: excerpt.excerpted,
            excerpt_extracted: excerpt.extracted,
            categories,
            tags,
            next: None,
            previous: None,
            related: None,
            source,
            meta: fm.extra,
        })
    }

    /// 正文只转换一次；从正文提取的摘要需要单独再转换
    pub fn convert(&mut self, converter: &dyn Converter) {
        self.content = converter.convert(&self.content);
        if self.excerpt_extracted {
            self.excerpt = converter.convert(&self.excerpt);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub title: Option<String>,
    pub layout: Option<String>,
    pub content: String,
    pub rendered: Option<String>,
    /// 生成器创建的页面没有源文件
    pub source: Option<SourceEntry>,
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl Page {
    pub fn from_source(source: SourceEntry, parsed: ParsedSource) -> Self {
        let fm = parsed.front_matter;
        let url = fm.url.clone().unwrap_or_else(|| default_page_url(&source));
        Self {
            url,
            title: fm.title,
            layout: fm.layout,
            content: parsed.body,
            rendered: None,
            source: Some(source),
            meta: fm.extra,
        }
    }

    /// 生成器追加的页面，`meta` 中的数据会并入模板上下文
    pub fn synthetic(
        url: impl Into<String>,
        layout: impl Into<String>,
        title: impl Into<String>,
        meta: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            url: url.into(),
            title: Some(title.into()),
            layout: Some(layout.into()),
            content: String::new(),
            rendered: None,
            source: None,
            meta,
        }
    }

    pub fn convert(&mut self, converter: &dyn Converter) {
        self.content = converter.convert(&self.content);
    }
}

/// Markdown 页面输出为同名 .html，其他扩展名保持原文件名
fn default_page_url(source: &SourceEntry) -> String {
    match source.extension() {
        Some("md" | "markdown") => format!("{}/{}.html", source.path, source.base_name()),
        _ => format!("{}/{}", source.path, source.name),
    }
}

/// 没有 Front Matter 的文件，原样复制
#[derive(Debug, Clone)]
pub struct StaticFile {
    pub source: SourceEntry,
}

/// Post、Page、StaticFile 共同的输出约定，写入和清理都依赖同一个输出路径
pub trait OutputUnit {
    fn output_path(&self, dest: &Path) -> PathBuf;

    fn contents(&self) -> Result<Cow<'_, [u8]>>;

    fn write(&self, dest: &Path) -> Result<PathBuf> {
        let path = self.output_path(dest);
        write_file(&path, &self.contents()?)?;
        Ok(path)
    }
}

impl OutputUnit for Post {
    fn output_path(&self, dest: &Path) -> PathBuf {
        url_to_path(dest, &self.url)
    }

    fn contents(&self) -> Result<Cow<'_, [u8]>> {
        self.rendered
            .as_deref()
            .map(|s| Cow::Borrowed(s.as_bytes()))
            .with_context(|| format!("文章尚未渲染：{}", self.source.file().display()))
    }
}

impl OutputUnit for Page {
    fn output_path(&self, dest: &Path) -> PathBuf {
        url_to_path(dest, &self.url)
    }

    fn contents(&self) -> Result<Cow<'_, [u8]>> {
        self.rendered
            .as_deref()
            .map(|s| Cow::Borrowed(s.as_bytes()))
            .with_context(|| format!("页面尚未渲染：{}", self.url))
    }
}

impl OutputUnit for StaticFile {
    fn output_path(&self, dest: &Path) -> PathBuf {
        let mut path = dest.to_path_buf();
        for segment in self.source.path.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(&self.source.name);
        path
    }

    fn contents(&self) -> Result<Cow<'_, [u8]>> {
        self.source.read().map(Cow::Owned)
    }
}

/// 以 / 结尾的 URL 输出为 index.html，`.` 与 `..` 段被忽略，输出始终落在目标目录内
pub fn url_to_path(dest: &Path, url: &str) -> PathBuf {
    let mut path = dest.to_path_buf();
    for segment in url
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
    {
        path.push(segment);
    }
    if url.ends_with('/') || url.is_empty() {
        path.push("index.html");
    }
    path
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("创建目录失败：{}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("写入失败：{}", path.display()))
}
