use crate::plugin::Registry;
use crate::site::Site;
use anyhow::{Context, Result};

/// 依次运行所有已注册的生成器，它们只能向站点追加页面
pub fn generate(site: &mut Site, registry: &Registry) -> Result<()> {
    let before = site.pages.len();
    for generator in registry.generators() {
        generator
            .generate(site)
            .with_context(|| format!("生成器 {} 执行失败", generator.name()))?;
    }
    tracing::info!("生成了 {} 个页面", site.pages.len() - before);

    for hook in registry.hooks() {
        hook.post_generate(site)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{Generator, SiteHook};
    use crate::content::Page;
    use crate::test_helpers::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Archive;

    impl Generator for Archive {
        fn name(&self) -> &'static str {
            "archive"
        }

        fn generate(&self, site: &mut Site) -> Result<()> {
            let page = Page::synthetic("/archive/", "page", "Archive", BTreeMap::new());
            site.pages.push(page);
            Ok(())
        }
    }

    struct Counter(Arc<AtomicUsize>);

    impl SiteHook for Counter {
        fn post_generate(&self, site: &mut Site) -> Result<()> {
            self.0.store(site.pages.len(), Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn runs_generators_then_hooks() {
        let fixture = SiteFixture::new();
        fixture.config("");
        let mut site = fixture.read_site();

        let seen = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::new();
        registry.register_generator(Box::new(Archive));
        registry.register_hook(Box::new(Counter(seen.clone())));

        generate(&mut site, &registry).unwrap();
        assert_eq!(site.pages.len(), 1);
        assert_eq!(site.pages[0].url, "/archive/");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
