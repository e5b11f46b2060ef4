use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// 单个字符串或字符串列表
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
    pub layout: Option<String>,
    pub published: Option<bool>,
    pub categories: Option<OneOrMany>,
    pub category: Option<String>,
    pub tags: Option<OneOrMany>,
    pub tag: Option<String>,
    pub excerpt: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FrontMatter {
    pub fn is_post(&self) -> bool {
        self.layout.as_deref() == Some("post")
    }

    /// 只有显式写了 published: false 才算草稿
    pub fn is_draft(&self) -> bool {
        self.published == Some(false)
    }

    pub fn category_names(&self) -> Vec<String> {
        string_list(self.categories.clone(), self.category.clone())
    }

    pub fn tag_names(&self) -> Vec<String> {
        string_list(self.tags.clone(), self.tag.clone())
    }
}

/// 复数键非空时优先，否则退回单数键
fn string_list(plural: Option<OneOrMany>, singular: Option<String>) -> Vec<String> {
    let list = plural.map(OneOrMany::into_vec).unwrap_or_default();
    if !list.is_empty() {
        return list;
    }
    singular.into_iter().collect()
}

#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Front Matter 存在但无法解析为结构体
#[derive(Debug)]
pub struct MalformedFrontMatter;

/// 分离 Front Matter 和正文。
///
/// 没有 Front Matter 时返回 `Ok(None)`，调用方据此把文件当作静态文件。
pub fn parse_source(content: &str) -> Result<Option<ParsedSource>, MalformedFrontMatter> {
    let matter = gray_matter::Matter::<gray_matter::engine::YAML>::new();
    let entity = matter.parse(content);
    if entity.data.is_none() {
        // 分隔符成对出现但块为空，仍视为带 Front Matter 的文件
        if !has_closed_block(content) {
            return Ok(None);
        }
        return Ok(Some(ParsedSource {
            front_matter: FrontMatter::default(),
            body: entity.content,
        }));
    }
    let parsed = matter
        .parse_with_struct::<FrontMatter>(content)
        .ok_or(MalformedFrontMatter)?;
    Ok(Some(ParsedSource {
        front_matter: parsed.data,
        body: parsed.content,
    }))
}

fn has_closed_block(content: &str) -> bool {
    let Some((first, rest)) = content.split_once('\n') else {
        return false;
    };
    first.trim_end() == "---" && rest.lines().any(|l| l.trim_end() == "---")
}

/// 解析日期字符串为 DateTime<Utc>，无法识别时返回 None
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let s = date_str.trim();

    // RFC 3339: 2024-01-15T10:30:00+08:00
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.to_utc());
    }
    // 带时间不带时区
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(dt, Utc));
        }
    }
    // 纯日期: 2024-01-15 或 2024/01/15
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(date.and_time(NaiveTime::MIN), Utc));
        }
    }
    None
}
