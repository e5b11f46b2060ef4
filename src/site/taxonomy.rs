use crate::content::{CategoryId, PostId, TagId};
use crate::error::SiteError;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
pub struct Category {
    pub nicename: String,
    pub name: String,
    /// 以 . 分隔的层级路径，站点内唯一
    pub path: String,
    pub parent: Option<CategoryId>,
    pub posts: Vec<PostId>,
}

impl Category {
    pub fn is_name_or_nicename(&self, s: &str) -> bool {
        self.name == s || self.nicename == s
    }
}

#[derive(Debug, Clone)]
pub struct Tag {
    pub slug: String,
    pub name: String,
    pub posts: Vec<PostId>,
}

impl Tag {
    pub fn is_name_or_slug(&self, s: &str) -> bool {
        self.name == s || self.slug == s
    }
}

/// 分类与标签注册表；分类和文章之间只保存下标，不持有对方
#[derive(Debug, Default)]
pub struct Taxonomy {
    categories: Vec<Category>,
    by_path: HashMap<String, CategoryId>,
    tags: Vec<Tag>,
}

impl Taxonomy {
    /// 按配置建立分类层级和标签。
    ///
    /// 分类按路径字典序处理，父路径是子路径的严格前缀，因此总是先于子分类出现；
    /// 这里仍然显式检查，父分类缺失直接报错。
    pub fn from_config(
        category_names: &BTreeMap<String, String>,
        tag_names: &BTreeMap<String, String>,
    ) -> Result<Self, SiteError> {
        let mut taxonomy = Self::default();

        for (path, name) in category_names {
            let (nicename, parent_path) = match path.rfind('.') {
                Some(idx) => (&path[idx + 1..], Some(&path[..idx])),
                None => (path.as_str(), None),
            };

            let parent = match parent_path {
                Some(parent) => match taxonomy.by_path.get(parent) {
                    Some(id) => Some(*id),
                    None if category_names.contains_key(parent) => {
                        return Err(SiteError::CategoryOrder {
                            path: path.clone(),
                            parent: parent.to_string(),
                        });
                    }
                    None => {
                        return Err(SiteError::MissingParentCategory {
                            path: path.clone(),
                            parent: parent.to_string(),
                        });
                    }
                },
                None => None,
            };

            taxonomy.insert_category(Category {
                nicename: nicename.to_string(),
                name: name.clone(),
                path: path.clone(),
                parent,
                posts: Vec::new(),
            });
        }

        for (slug, name) in tag_names {
            taxonomy.tags.push(Tag {
                slug: slug.clone(),
                name: name.clone(),
                posts: Vec::new(),
            });
        }

        tracing::debug!(
            "已从配置建立 {} 个分类、{} 个标签",
            taxonomy.categories.len(),
            taxonomy.tags.len()
        );
        Ok(taxonomy)
    }

    fn insert_category(&mut self, category: Category) -> CategoryId {
        let id = CategoryId(self.categories.len());
        self.by_path.insert(category.path.clone(), id);
        self.categories.push(category);
        id
    }

    /// 先按路径精确匹配，再按名称或 nicename 匹配
    pub fn get_category(&self, name: &str) -> Option<CategoryId> {
        if let Some(id) = self.by_path.get(name) {
            return Some(*id);
        }
        self.categories
            .iter()
            .position(|c| c.is_name_or_nicename(name))
            .map(CategoryId)
    }

    pub fn get_tag(&self, name: &str) -> Option<TagId> {
        self.tags
            .iter()
            .position(|t| t.is_name_or_slug(name))
            .map(TagId)
    }

    /// 查找或创建分类，并把文章登记到该分类
    pub fn category_or_create(&mut self, name: &str, post: PostId) -> CategoryId {
        let id = match self.get_category(name) {
            Some(id) => id,
            None => {
                let nicename = to_nicename(name);
                // 生成的 nicename 可能正好是已有分类的路径
                match self.by_path.get(&nicename) {
                    Some(id) => *id,
                    None => {
                        tracing::debug!("新建分类：{name} ({nicename})");
                        self.insert_category(Category {
                            path: nicename.clone(),
                            nicename,
                            name: name.to_string(),
                            parent: None,
                            posts: Vec::new(),
                        })
                    }
                }
            }
        };
        push_unique(&mut self.categories[id.0].posts, post);
        id
    }

    /// 查找或创建标签，并把文章登记到该标签
    pub fn tag_or_create(&mut self, name: &str, post: PostId) -> TagId {
        let id = match self.get_tag(name) {
            Some(id) => id,
            None => {
                let slug = to_nicename(name);
                match self.get_tag(&slug) {
                    Some(id) => id,
                    None => {
                        tracing::debug!("新建标签：{name} ({slug})");
                        self.tags.push(Tag {
                            slug,
                            name: name.to_string(),
                            posts: Vec::new(),
                        });
                        TagId(self.tags.len() - 1)
                    }
                }
            }
        };
        push_unique(&mut self.tags[id.0].posts, post);
        id
    }

    pub fn category(&self, id: CategoryId) -> &Category {
        &self.categories[id.0]
    }

    pub fn tag(&self, id: TagId) -> &Tag {
        &self.tags[id.0]
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// 从根到该分类的 nicename 序列，用 / 连接
    pub fn category_url_path(&self, id: CategoryId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            let category = self.category(cid);
            segments.push(category.nicename.as_str());
            current = category.parent;
        }
        segments.reverse();
        segments.join("/")
    }

    /// 文章重新排序后，按新下标改写所有反向引用
    pub fn remap_posts(&mut self, remap: &[PostId]) {
        for category in &mut self.categories {
            for post in &mut category.posts {
                *post = remap[post.0];
            }
        }
        for tag in &mut self.tags {
            for post in &mut tag.posts {
                *post = remap[post.0];
            }
        }
    }
}

fn push_unique(posts: &mut Vec<PostId>, post: PostId) {
    if !posts.contains(&post) {
        posts.push(post);
    }
}

/// 小写并把空格替换为 -
pub fn to_nicename(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}
