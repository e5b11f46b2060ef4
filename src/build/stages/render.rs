use crate::content::PostId;
use crate::plugin::Registry;
use crate::site::Site;
use crate::template::{Renderer, RootContext};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::json;

/// 转换正文：Markdown 等 → HTML，文章和页面并行处理
pub fn convert(site: &mut Site, registry: &Registry) {
    site.posts
        .par_iter_mut()
        .for_each(|post| post.convert(registry.converter_for(Some(&post.source))));
    site.pages
        .par_iter_mut()
        .for_each(|page| page.convert(registry.converter_for(page.source.as_ref())));
    tracing::debug!(
        "已转换 {} 篇文章，{} 个页面",
        site.posts.len(),
        site.pages.len()
    );
}

/// 渲染后的文章输出
struct RenderedPost {
    content: String,
    excerpt: String,
    rendered: String,
}

/// 先转换全部正文，再基于同一个根上下文依次渲染文章和页面
pub fn render(site: &mut Site, registry: &Registry, renderer: &dyn Renderer) -> Result<()> {
    convert(site, registry);

    let root = RootContext::new(site, registry);

    let mut posts = Vec::with_capacity(site.posts.len());
    for i in 0..site.posts.len() {
        posts.push(render_post(site, &root, renderer, PostId(i))?);
    }
    for (post, out) in site.posts.iter_mut().zip(posts) {
        post.content = out.content;
        post.excerpt = out.excerpt;
        post.rendered = Some(out.rendered);
    }

    let mut pages = Vec::with_capacity(site.pages.len());
    for page in &site.pages {
        let page_value = site.page_value(page);
        let ctx = root.with([("page", page_value)]);
        let content = if renderer.is_render_required(&page.content) {
            renderer
                .render_content(&page.content, &ctx)
                .with_context(|| format!("渲染页面内容失败：{}", page.url))?
        } else {
            page.content.clone()
        };
        let rendered = match page.layout.as_deref() {
            Some(layout) => {
                let mut page_value = site.page_value(page);
                page_value["content"] = json!(content);
                renderer
                    .render_layout(layout, &root.with([("page", page_value)]))
                    .with_context(|| format!("渲染页面失败：{}", page.url))?
            }
            None => content,
        };
        pages.push(rendered);
    }
    for (page, rendered) in site.pages.iter_mut().zip(pages) {
        page.rendered = Some(rendered);
    }

    tracing::info!(
        "渲染完成，共 {} 篇文章，{} 个页面",
        site.posts.len(),
        site.pages.len()
    );

    for hook in registry.hooks() {
        hook.post_render(site)?;
    }
    Ok(())
}

fn render_post(
    site: &Site,
    root: &RootContext,
    renderer: &dyn Renderer,
    id: PostId,
) -> Result<RenderedPost> {
    let post = site.post(id);
    let file = post.source.file();
    let related = site.related_value(id);

    let mut page = site.post_value(id);
    let content = if renderer.is_render_required(&post.content) {
        let ctx = root.with([("page", page.clone()), ("related", related.clone())]);
        renderer
            .render_content(&post.content, &ctx)
            .with_context(|| format!("渲染文章内容失败：{}", file.display()))?
    } else {
        post.content.clone()
    };

    page["content"] = json!(content);
    let ctx = root.with([("page", page), ("related", related)]);
    let rendered = renderer
        .render_layout(&post.layout, &ctx)
        .with_context(|| format!("渲染文章失败：{}", file.display()))?;

    // 摘要只有在含模板语法时才需要再渲染
    let excerpt = if renderer.is_render_required(&post.excerpt) {
        renderer
            .render_content(&post.excerpt, &ctx)
            .with_context(|| format!("渲染摘要失败：{}", file.display()))?
    } else {
        post.excerpt.clone()
    };

    Ok(RenderedPost {
        content,
        excerpt,
        rendered,
    })
}
