use super::converter::{IdentityConverter, MarkdownConverter};
use super::generators::{CategoryPagesGenerator, PaginationGenerator, TagPagesGenerator};
use super::{Converter, Generator, SiteHook};
use crate::config::SiteConfig;
use crate::source::SourceEntry;
use std::collections::BTreeMap;

static IDENTITY: IdentityConverter = IdentityConverter;

type GeneratorFactory = fn(&SiteConfig) -> Box<dyn Generator>;

/// 可通过 cpress.toml 的 plugins 列表按名称启用的内置生成器
const BUILTIN_GENERATORS: &[(&str, GeneratorFactory)] = &[
    ("category_pages", category_pages),
    ("tag_pages", tag_pages),
    ("paginate", paginate),
];

fn category_pages(_config: &SiteConfig) -> Box<dyn Generator> {
    Box::new(CategoryPagesGenerator)
}

fn tag_pages(_config: &SiteConfig) -> Box<dyn Generator> {
    Box::new(TagPagesGenerator)
}

fn paginate(config: &SiteConfig) -> Box<dyn Generator> {
    Box::new(PaginationGenerator {
        per_page: config.paginate.max(1),
    })
}

/// 插件注册表：启动时填充，构建期间只读
#[derive(Default)]
pub struct Registry {
    converters: Vec<Box<dyn Converter>>,
    generators: Vec<Box<dyn Generator>>,
    hooks: Vec<Box<dyn SiteHook>>,
    template_values: BTreeMap<String, serde_json::Value>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置 Markdown 转换器 + 配置中启用的内置生成器
    pub fn with_defaults(config: &SiteConfig) -> Self {
        let mut registry = Self::new();
        registry.register_converter(Box::new(MarkdownConverter));

        for name in &config.plugins {
            match BUILTIN_GENERATORS.iter().find(|(n, _)| *n == name.as_str()) {
                Some((_, factory)) => {
                    tracing::debug!("启用插件：{name}");
                    registry.register_generator(factory(config));
                }
                None => tracing::warn!("未知插件 '{name}'，已忽略"),
            }
        }
        registry
    }

    pub fn is_builtin(name: &str) -> bool {
        BUILTIN_GENERATORS.iter().any(|(n, _)| *n == name)
    }

    pub fn register_converter(&mut self, converter: Box<dyn Converter>) {
        self.converters.push(converter);
    }

    pub fn register_generator(&mut self, generator: Box<dyn Generator>) {
        self.generators.push(generator);
    }

    pub fn register_hook(&mut self, hook: Box<dyn SiteHook>) {
        self.hooks.push(hook);
    }

    /// 注册模板辅助值，渲染时并入根上下文
    pub fn register_template_value(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.template_values.insert(name.into(), value);
    }

    /// 按注册顺序匹配，没有匹配时原样输出
    pub fn converter_for(&self, entry: Option<&SourceEntry>) -> &dyn Converter {
        match entry.and_then(|e| self.converters.iter().find(|c| c.matches(e))) {
            Some(converter) => converter.as_ref(),
            None => &IDENTITY,
        }
    }

    pub fn generators(&self) -> &[Box<dyn Generator>] {
        &self.generators
    }

    pub fn hooks(&self) -> &[Box<dyn SiteHook>] {
        &self.hooks
    }

    pub fn template_values(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.template_values
    }
}
