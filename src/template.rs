use crate::content::frontmatter::parse_date;
use crate::plugin::Registry;
use crate::site::Site;
use anyhow::{Context, Result};
use minijinja::{Environment, Value};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static TEMPLATE_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[{%#]").unwrap());

/// 模板渲染器接口，渲染阶段只依赖这几个操作
pub trait Renderer {
    /// 用 `<layout>.html` 渲染整页
    fn render_layout(&self, layout: &str, ctx: &Value) -> Result<String>;

    /// 把一段文本本身当作模板渲染
    fn render_content(&self, text: &str, ctx: &Value) -> Result<String>;

    /// 文本中是否出现模板语法，没有则无需渲染
    fn is_render_required(&self, text: &str) -> bool {
        TEMPLATE_SYNTAX.is_match(text)
    }

    fn has_layout(&self, layout: &str) -> bool;
}

/// 基于 MiniJinja 的渲染器，模板从 templates 目录按需加载
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new(templates_dir: &Path, site: &Site) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(templates_dir));
        // 正文已是 HTML，模板输出不做转义
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        register_filters(&mut env, &site.config.url, site.root());
        Self { env }
    }
}

impl Renderer for TemplateRenderer {
    fn render_layout(&self, layout: &str, ctx: &Value) -> Result<String> {
        let name = format!("{layout}.html");
        let tmpl = self
            .env
            .get_template(&name)
            .with_context(|| format!("模板 {name} 不存在"))?;
        tmpl.render(ctx)
            .with_context(|| format!("渲染模板 {name} 失败"))
    }

    fn render_content(&self, text: &str, ctx: &Value) -> Result<String> {
        Ok(self.env.render_str(text, ctx)?)
    }

    fn has_layout(&self, layout: &str) -> bool {
        self.env.get_template(&format!("{layout}.html")).is_ok()
    }
}

/// 渲染阶段共享的根上下文，构建一次后只读
pub struct RootContext {
    site: Value,
    root_url: String,
    helpers: BTreeMap<String, Value>,
}

impl RootContext {
    pub fn new(site: &Site, registry: &Registry) -> Self {
        let helpers = registry
            .template_values()
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_serialize(v)))
            .collect();
        Self {
            site: Value::from_serialize(site.to_value()),
            root_url: site.root().to_string(),
            helpers,
        }
    }

    /// 根上下文加上当前单元的 page 等变量
    pub fn with(&self, vars: impl IntoIterator<Item = (&'static str, serde_json::Value)>) -> Value {
        let mut map: BTreeMap<String, Value> = self.helpers.clone();
        map.insert("site".into(), self.site.clone());
        map.insert("root_url".into(), Value::from(self.root_url.as_str()));
        for (k, v) in vars {
            map.insert(k.into(), Value::from_serialize(v));
        }
        Value::from_serialize(&map)
    }
}

fn register_filters(env: &mut Environment<'static>, site_url: &str, root: &str) {
    env.add_filter("slugify", filter_slugify);
    env.add_filter("titlecase", filter_titlecase);
    env.add_filter("date", filter_date);

    let base = format!("{}{}", site_url.trim_end_matches('/'), root);
    env.add_filter("abs_url", move |path: String| filter_abs_url(&base, &path));
}

pub fn filter_slugify(value: String) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn filter_titlecase(value: String) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn filter_date(value: Value, format: Option<String>) -> Result<String, minijinja::Error> {
    let raw = value.to_string();
    let date = parse_date(&raw).ok_or_else(|| {
        minijinja::Error::new(
            minijinja::ErrorKind::InvalidOperation,
            format!("无法解析日期：{raw}"),
        )
    })?;
    Ok(date.format(format.as_deref().unwrap_or("%Y-%m-%d")).to_string())
}

fn filter_abs_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{base}/{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use serde_json::json;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(filter_slugify("Hello,  World!".into()), "hello-world");
        assert_eq!(filter_slugify("Rust 编程".into()), "rust-编程");
    }

    #[test]
    fn titlecase_capitalizes_words() {
        assert_eq!(filter_titlecase("hello big world".into()), "Hello Big World");
    }

    #[test]
    fn date_filter_formats() {
        let out = filter_date(Value::from("2024-03-05T10:00:00+00:00"), None).unwrap();
        assert_eq!(out, "2024-03-05");
        let out = filter_date(Value::from("2024-03-05"), Some("%Y/%m".into())).unwrap();
        assert_eq!(out, "2024/03");
        assert!(filter_date(Value::from("soon"), None).is_err());
    }

    #[test]
    fn abs_url_joins_site_url_and_root() {
        assert_eq!(filter_abs_url("https://a.com/blog", "/x/"), "https://a.com/blog/x/");
        assert_eq!(filter_abs_url("", "x.css"), "/x.css");
        assert_eq!(filter_abs_url("https://a.com", "https://b.com/"), "https://b.com/");
    }

    #[test]
    fn detects_template_syntax() {
        let fixture = SiteFixture::new();
        fixture.config("");
        let site = fixture.site();
        let renderer = TemplateRenderer::new(&site.dirs.templates, &site);
        assert!(renderer.is_render_required("Hi {{ site.title }}"));
        assert!(renderer.is_render_required("{% if x %}{% endif %}"));
        assert!(renderer.is_render_required("{# note #}"));
        assert!(!renderer.is_render_required("plain { text }"));
    }

    #[test]
    fn renders_layout_with_root_context() {
        let fixture = SiteFixture::new();
        fixture.config("title = \"Demo\"\nroot = \"/blog\"\n");
        fixture.write_template("note.html", "{{ site.title }}|{{ root_url }}|{{ page.title }}|{{ greeting }}");
        let site = fixture.site();
        let renderer = TemplateRenderer::new(&site.dirs.templates, &site);

        let mut registry = Registry::new();
        registry.register_template_value("greeting", json!("hi"));
        let root = RootContext::new(&site, &registry);
        let ctx = root.with([("page", json!({ "title": "Note" }))]);

        assert!(renderer.has_layout("note"));
        assert!(!renderer.has_layout("missing"));
        let out = renderer.render_layout("note", &ctx).unwrap();
        assert_eq!(out, "Demo|/blog|Note|hi");
        assert!(renderer.render_layout("missing", &ctx).is_err());
    }

    #[test]
    fn renders_content_strings() {
        let fixture = SiteFixture::new();
        fixture.config("title = \"Demo\"\n");
        let site = fixture.site();
        let renderer = TemplateRenderer::new(&site.dirs.templates, &site);
        let root = RootContext::new(&site, &Registry::new());
        let out = renderer
            .render_content("<p>{{ site.title | upper }}</p>", &root.with([("page", json!({}))]))
            .unwrap();
        assert_eq!(out, "<p>DEMO</p>");
    }
}
