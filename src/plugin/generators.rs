use super::Generator;
use crate::content::{CategoryId, Page, PostId, TagId};
use crate::site::Site;
use anyhow::Result;
use serde_json::json;
use std::collections::BTreeMap;

/// 每个有文章的分类生成一个归档页
pub struct CategoryPagesGenerator;

impl Generator for CategoryPagesGenerator {
    fn name(&self) -> &'static str {
        "category_pages"
    }

    fn generate(&self, site: &mut Site) -> Result<()> {
        let mut pages = Vec::new();
        for (i, category) in site.taxonomy.categories().iter().enumerate() {
            if category.posts.is_empty() {
                continue;
            }
            let id = CategoryId(i);
            let meta = BTreeMap::from([
                ("category".to_string(), json!(category.name)),
                ("posts".to_string(), summaries(site, &category.posts)),
            ]);
            pages.push(Page::synthetic(
                site.category_url(id),
                "category",
                format!("分类：{}", category.name),
                meta,
            ));
        }
        tracing::debug!("生成了 {} 个分类页", pages.len());
        site.pages.extend(pages);
        Ok(())
    }
}

/// 每个有文章的标签生成一个归档页
pub struct TagPagesGenerator;

impl Generator for TagPagesGenerator {
    fn name(&self) -> &'static str {
        "tag_pages"
    }

    fn generate(&self, site: &mut Site) -> Result<()> {
        let mut pages = Vec::new();
        for (i, tag) in site.taxonomy.tags().iter().enumerate() {
            if tag.posts.is_empty() {
                continue;
            }
            let meta = BTreeMap::from([
                ("tag".to_string(), json!(tag.name)),
                ("posts".to_string(), summaries(site, &tag.posts)),
            ]);
            pages.push(Page::synthetic(
                site.tag_url(TagId(i)),
                "tag",
                format!("标签：{}", tag.name),
                meta,
            ));
        }
        tracing::debug!("生成了 {} 个标签页", pages.len());
        site.pages.extend(pages);
        Ok(())
    }
}

/// 首页及分页：/、/page/2/、/page/3/ ...
pub struct PaginationGenerator {
    pub per_page: usize,
}

impl PaginationGenerator {
    fn page_url(num: usize) -> String {
        if num == 1 { "/".into() } else { format!("/page/{num}/") }
    }
}

impl Generator for PaginationGenerator {
    fn name(&self) -> &'static str {
        "paginate"
    }

    fn generate(&self, site: &mut Site) -> Result<()> {
        let has_index = site
            .pages
            .iter()
            .any(|p| p.url == "/" || p.url == "/index.html");
        if has_index {
            tracing::warn!("source 中已有首页，跳过分页首页生成");
        }

        let total_posts = site.posts.len();
        let total_pages = total_posts.div_ceil(self.per_page).max(1);
        let mut pages = Vec::new();

        for num in 1..=total_pages {
            if num == 1 && has_index {
                continue;
            }
            let start = (num - 1) * self.per_page;
            let end = (start + self.per_page).min(total_posts);
            let ids: Vec<_> = (start..end).map(PostId).collect();

            let pagination = json!({
                "current": num,
                "total_pages": total_pages,
                "total_posts": total_posts,
                "prev": (num > 1).then(|| Self::page_url(num - 1)),
                "next": (num < total_pages).then(|| Self::page_url(num + 1)),
            });
            let meta = BTreeMap::from([
                ("posts".to_string(), summaries(site, &ids)),
                ("pagination".to_string(), pagination),
            ]);
            let title = if num == 1 {
                site.config.title.clone()
            } else {
                format!("第 {num} 页")
            };
            pages.push(Page::synthetic(Self::page_url(num), "index", title, meta));
        }

        tracing::debug!("生成了 {} 个分页", pages.len());
        site.pages.extend(pages);
        Ok(())
    }
}

fn summaries(site: &Site, ids: &[PostId]) -> serde_json::Value {
    json!(ids.iter().map(|id| site.post_summary(*id)).collect::<Vec<_>>())
}
