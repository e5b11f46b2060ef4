use super::link::link_posts;
use crate::content::frontmatter::parse_source;
use crate::content::{Page, Post, PostId, PostOptions, StaticFile};
use crate::error::SiteError;
use crate::plugin::Registry;
use crate::site::Site;
use crate::source::{self, SourceEntry};
use anyhow::Result;

/// 源文件的分类结果
enum Classified {
    Post(Box<Post>),
    Draft,
    Page(Page),
    Static(StaticFile),
}

/// 读取 source 目录，构造文章、页面和静态文件，然后排序并建立链接
pub fn read(site: &mut Site, registry: &Registry) -> Result<()> {
    let entries = source::load_entries(&site.dirs.source, &site.filter())?;
    tracing::debug!("source 目录中共 {} 个文件", entries.len());

    let mut skipped = 0;
    for entry in entries {
        match classify(site, entry)? {
            Classified::Post(post) => site.posts.push(*post),
            Classified::Draft => skipped += 1,
            Classified::Page(page) => site.pages.push(page),
            Classified::Static(file) => site.static_files.push(file),
        }
    }

    tracing::info!(
        "读取完成：{} 篇文章，{} 个页面，{} 个静态文件",
        site.posts.len(),
        site.pages.len(),
        site.static_files.len()
    );
    if skipped > 0 {
        tracing::info!("跳过 {skipped} 篇草稿（show_drafts = false）");
    }

    link_posts(&mut site.posts, &mut site.taxonomy, site.config.related_posts);

    for hook in registry.hooks() {
        hook.post_read(site)?;
    }
    Ok(())
}

fn classify(site: &mut Site, entry: SourceEntry) -> Result<Classified> {
    let bytes = entry.read()?;
    // Front Matter 必须位于文件开头
    if !bytes.starts_with(b"---") {
        return Ok(Classified::Static(StaticFile { source: entry }));
    }
    let Ok(text) = String::from_utf8(bytes) else {
        return Ok(Classified::Static(StaticFile { source: entry }));
    };

    let parsed = match parse_source(&text) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => return Ok(Classified::Static(StaticFile { source: entry })),
        Err(_) => return Err(SiteError::InvalidFrontMatter { file: entry.file() }.into()),
    };

    if !parsed.front_matter.is_post() {
        return Ok(Classified::Page(Page::from_source(entry, parsed)));
    }
    if parsed.front_matter.is_draft() && !site.config.show_drafts {
        tracing::debug!("跳过草稿：{}", entry.file().display());
        return Ok(Classified::Draft);
    }

    let options = PostOptions {
        excerpt_separator: &site.config.excerpt_separator,
    };
    let index = PostId(site.posts.len());
    let post = Post::new(index, entry, parsed, &mut site.taxonomy, &options)?;
    Ok(Classified::Post(Box::new(post)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn classifies_sources() {
        let fixture = SiteFixture::new();
        fixture.config("");
        fixture.write_source("posts/hello.md", "---\nlayout: post\ndate: 2024-01-01\n---\nHi");
        fixture.write_source("about.md", "---\ntitle: About\n---\nMe");
        fixture.write_source("css/site.css", "body {}");
        fixture.write_source("_private.md", "---\nlayout: post\ndate: 2024-01-01\n---\n");
        fixture.write_source("notes.txt~", "backup");

        let site = fixture.read_site();
        assert_eq!(site.posts.len(), 1);
        assert_eq!(site.posts[0].url, "/posts/hello/");
        assert_eq!(site.pages.len(), 1);
        assert_eq!(site.pages[0].url, "/about.html");
        assert_eq!(site.static_files.len(), 1);
        assert_eq!(site.static_files[0].source.name, "site.css");
    }

    #[test]
    fn empty_front_matter_makes_a_page() {
        let fixture = SiteFixture::new();
        fixture.config("");
        fixture.write_source("e.md", "---\n---\n# Title");
        let site = fixture.read_site();
        assert_eq!(site.pages.len(), 1);
        assert!(site.static_files.is_empty());
        assert_eq!(site.pages[0].url, "/e.html");
    }

    #[test]
    fn binary_files_are_static() {
        let fixture = SiteFixture::new();
        fixture.config("");
        fixture.write_source_bytes("img.bin", &[b'-', b'-', b'-', 0xff, 0xfe, 0x00]);
        let site = fixture.read_site();
        assert_eq!(site.static_files.len(), 1);
    }

    #[test]
    fn drafts_follow_show_drafts() {
        let fixture = SiteFixture::new();
        fixture.config("");
        fixture.write_source("d.md", "---\nlayout: post\ndate: 2024-01-01\npublished: false\n---\n");
        assert!(fixture.read_site().posts.is_empty());

        fixture.config("show_drafts = true\n");
        let site = fixture.read_site();
        assert_eq!(site.posts.len(), 1);
        assert!(site.posts[0].draft);
        assert!(!site.posts[0].published);
    }

    #[test]
    fn missing_date_aborts_with_file_name() {
        let fixture = SiteFixture::new();
        fixture.config("");
        fixture.write_source("broken.md", "---\nlayout: post\ntitle: x\n---\n");
        let mut site = fixture.site();
        let err = read(&mut site, &Registry::new()).unwrap_err();
        match err.downcast_ref::<SiteError>() {
            Some(SiteError::MissingDate { file }) => assert!(file.ends_with("broken.md")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_front_matter_is_fatal() {
        let fixture = SiteFixture::new();
        fixture.config("");
        fixture.write_source("bad.md", "---\nlayout: post\ndate: [unclosed\n---\n");
        let mut site = fixture.site();
        let err = read(&mut site, &Registry::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiteError>(),
            Some(SiteError::InvalidFrontMatter { .. })
        ));
    }
}
