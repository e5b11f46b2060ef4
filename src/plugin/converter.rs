use super::Converter;
use crate::content::markdown;
use crate::source::SourceEntry;

pub struct MarkdownConverter;

impl Converter for MarkdownConverter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn matches(&self, entry: &SourceEntry) -> bool {
        matches!(entry.extension(), Some("md" | "markdown"))
    }

    fn convert(&self, text: &str) -> String {
        markdown::render_markdown(text)
    }
}

/// 兜底转换器，内容原样输出
pub struct IdentityConverter;

impl Converter for IdentityConverter {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn matches(&self, _entry: &SourceEntry) -> bool {
        true
    }

    fn convert(&self, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_matches_by_extension() {
        let md = SourceEntry::new("/s", "", "a.md");
        let html = SourceEntry::new("/s", "", "a.html");
        assert!(MarkdownConverter.matches(&md));
        assert!(!MarkdownConverter.matches(&html));
        assert!(IdentityConverter.matches(&html));
    }

    #[test]
    fn identity_keeps_text() {
        assert_eq!(IdentityConverter.convert("<b>x</b>"), "<b>x</b>");
    }
}
