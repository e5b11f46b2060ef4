/// 摘要提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    pub text: String,
    /// 正文是否被截断（或使用了显式摘要）
    pub excerpted: bool,
    /// 摘要是否从正文中提取，提取的摘要需要单独转换
    pub extracted: bool,
}

impl Excerpt {
    /// 显式摘要非空白时原样使用，否则按分隔符从正文提取
    pub fn resolve(explicit: Option<&str>, body: &str, separator: &str) -> Self {
        match explicit {
            Some(text) if !text.trim().is_empty() => Self {
                text: text.to_string(),
                excerpted: true,
                extracted: false,
            },
            _ => {
                let (text, excerpted) = split_excerpt(body, separator);
                Self {
                    text: text.to_string(),
                    excerpted,
                    extracted: true,
                }
            }
        }
    }
}

/// 在分隔符处截断正文；找不到分隔符时返回整篇正文
pub fn split_excerpt<'a>(body: &'a str, separator: &str) -> (&'a str, bool) {
    if separator.is_empty() {
        return (body, false);
    }
    match body.find(separator) {
        Some(idx) => (&body[..idx], true),
        None => (body, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_separator() {
        assert_eq!(split_excerpt("A<!--more-->B", "<!--more-->"), ("A", true));
        assert_eq!(split_excerpt("A B", "<!--more-->"), ("A B", false));
    }

    #[test]
    fn custom_separator() {
        assert_eq!(split_excerpt("intro\n---8<---\nrest", "---8<---"), ("intro\n", true));
    }

    #[test]
    fn explicit_excerpt_is_used_verbatim() {
        let ex = Excerpt::resolve(Some("Teaser"), "A<!--more-->B", "<!--more-->");
        assert_eq!(
            ex,
            Excerpt {
                text: "Teaser".into(),
                excerpted: true,
                extracted: false
            }
        );
    }

    #[test]
    fn blank_explicit_excerpt_falls_back_to_body() {
        let ex = Excerpt::resolve(Some("   "), "A B", "<!--more-->");
        assert_eq!(ex.text, "A B");
        assert!(!ex.excerpted);
        assert!(ex.extracted);
    }
}
