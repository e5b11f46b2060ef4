pub mod converter;
pub mod generators;
pub mod registry;

use crate::site::Site;
use crate::source::SourceEntry;
use anyhow::Result;

pub use registry::Registry;

/// 正文转换器（Markdown → HTML 等）
pub trait Converter: Send + Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, entry: &SourceEntry) -> bool;

    fn convert(&self, text: &str) -> String;
}

/// 生成阶段的插件，向站点追加页面
pub trait Generator: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(&self, site: &mut Site) -> Result<()>;
}

/// 构建各阶段完成后的钩子，每个阶段无条件调用一次
pub trait SiteHook: Send + Sync {
    fn post_read(&self, _site: &mut Site) -> Result<()> {
        Ok(())
    }

    fn post_generate(&self, _site: &mut Site) -> Result<()> {
        Ok(())
    }

    fn post_render(&self, _site: &Site) -> Result<()> {
        Ok(())
    }

    fn post_cleanup(&self, _site: &Site) -> Result<()> {
        Ok(())
    }

    fn post_write(&self, _site: &Site) -> Result<()> {
        Ok(())
    }
}
