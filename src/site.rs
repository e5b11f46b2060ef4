pub mod taxonomy;

use crate::config::{SiteConfig, SiteDirs};
use crate::content::{CategoryId, OutputUnit, Page, Post, PostId, StaticFile, TagId};
use crate::error::SiteError;
use crate::source::SourceFilter;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use taxonomy::Taxonomy;

/// 一次构建的全部内容，每次构建重新创建
#[derive(Debug)]
pub struct Site {
    pub config: SiteConfig,
    pub dirs: SiteDirs,
    pub time: DateTime<Utc>,
    pub posts: Vec<Post>,
    pub pages: Vec<Page>,
    pub static_files: Vec<StaticFile>,
    pub taxonomy: Taxonomy,
}

impl Site {
    pub fn new(config: SiteConfig, dirs: SiteDirs) -> Result<Self, SiteError> {
        let taxonomy = Taxonomy::from_config(&config.category_names, &config.tag_names)?;
        let time = config.build_time()?;
        Ok(Self {
            config,
            dirs,
            time,
            posts: Vec::new(),
            pages: Vec::new(),
            static_files: Vec::new(),
            taxonomy,
        })
    }

    /// 规范化后的 URL 前缀（"" 或 "/xxx"）
    pub fn root(&self) -> &str {
        &self.config.root
    }

    pub fn filter(&self) -> SourceFilter {
        SourceFilter::new(self.config.includes.clone(), self.config.excludes.clone())
    }

    pub fn post(&self, id: PostId) -> &Post {
        &self.posts[id.0]
    }

    pub fn category_url(&self, id: CategoryId) -> String {
        format!(
            "/{}/{}/",
            self.config.category_dir.trim_matches('/'),
            self.taxonomy.category_url_path(id)
        )
    }

    pub fn tag_url(&self, id: TagId) -> String {
        format!(
            "/{}/{}/",
            self.config.tag_dir.trim_matches('/'),
            self.taxonomy.tag(id).slug
        )
    }

    /// 所有内容单元在目标目录下的输出路径，写入与清理共用
    pub fn output_paths(&self, dest: &Path) -> Vec<PathBuf> {
        let posts = self.posts.iter().map(|p| p.output_path(dest));
        let pages = self.pages.iter().map(|p| p.output_path(dest));
        let statics = self.static_files.iter().map(|s| s.output_path(dest));
        posts.chain(pages).chain(statics).collect()
    }

    fn category_value(&self, id: CategoryId) -> Value {
        let category = self.taxonomy.category(id);
        json!({
            "name": category.name,
            "nicename": category.nicename,
            "path": category.path,
            "url": self.category_url(id),
            "count": category.posts.len(),
        })
    }

    fn tag_value(&self, id: TagId) -> Value {
        let tag = self.taxonomy.tag(id);
        json!({
            "name": tag.name,
            "slug": tag.slug,
            "url": self.tag_url(id),
            "count": tag.posts.len(),
        })
    }

    /// 文章的简要信息，用于列表、上下篇和相关文章
    pub fn post_summary(&self, id: PostId) -> Value {
        let post = self.post(id);
        json!({
            "id": post.id,
            "url": post.url,
            "title": post.title,
            "date": post.date.to_rfc3339(),
            "excerpt": post.excerpt,
            "excerpted": post.excerpted,
            "draft": post.draft,
            "categories": post.categories.iter().map(|c| self.category_value(*c)).collect::<Vec<_>>(),
            "tags": post.tags.iter().map(|t| self.tag_value(*t)).collect::<Vec<_>>(),
        })
    }

    /// 渲染单篇文章时的 page 对象
    pub fn post_value(&self, id: PostId) -> Value {
        let post = self.post(id);
        let mut value = self.post_summary(id);
        if let Some(map) = value.as_object_mut() {
            for (k, v) in &post.meta {
                map.entry(k.clone()).or_insert_with(|| v.clone());
            }
            map.insert("layout".into(), json!(post.layout));
            map.insert("published".into(), json!(post.published));
            map.insert("content".into(), json!(post.content));
            map.insert("next".into(), json!(post.next.map(|n| self.post_summary(n))));
            map.insert(
                "previous".into(),
                json!(post.previous.map(|p| self.post_summary(p))),
            );
        }
        value
    }

    pub fn related_value(&self, id: PostId) -> Value {
        match &self.post(id).related {
            Some(related) => json!(related.iter().map(|r| self.post_summary(*r)).collect::<Vec<_>>()),
            None => Value::Null,
        }
    }

    pub fn page_value(&self, page: &Page) -> Value {
        let mut map = serde_json::Map::new();
        for (k, v) in &page.meta {
            map.insert(k.clone(), v.clone());
        }
        map.insert("url".into(), json!(page.url));
        map.insert("title".into(), json!(page.title));
        map.insert("layout".into(), json!(page.layout));
        map.insert("content".into(), json!(page.content));
        Value::Object(map)
    }

    /// 模板中的 site 对象
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (k, v) in &self.config.extra {
            if let Ok(v) = serde_json::to_value(v) {
                map.insert(k.clone(), v);
            }
        }
        map.insert("title".into(), json!(self.config.title));
        map.insert("url".into(), json!(self.config.url));
        map.insert("description".into(), json!(self.config.description));
        map.insert("root".into(), json!(self.root()));
        map.insert("time".into(), json!(self.time.to_rfc3339()));
        map.insert(
            "posts".into(),
            json!((0..self.posts.len()).map(|i| self.post_summary(PostId(i))).collect::<Vec<_>>()),
        );
        map.insert(
            "categories".into(),
            json!((0..self.taxonomy.categories().len())
                .map(|i| self.category_value(CategoryId(i)))
                .collect::<Vec<_>>()),
        );
        map.insert(
            "tags".into(),
            json!((0..self.taxonomy.tags().len())
                .map(|i| self.tag_value(TagId(i)))
                .collect::<Vec<_>>()),
        );
        Value::Object(map)
    }
}
