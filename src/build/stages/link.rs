use crate::content::{Post, PostId};
use crate::site::taxonomy::Taxonomy;
use std::collections::HashSet;

/// 读取阶段的最后一步：按时间倒序排列文章并建立上下篇与相关文章。
///
/// 排序后 `PostId` 即为新下标，分类和标签中的反向引用同步改写。
pub fn link_posts(posts: &mut Vec<Post>, taxonomy: &mut Taxonomy, max_related: usize) {
    let mut order: Vec<usize> = (0..posts.len()).collect();
    // 稳定排序，同一时间的文章保持读取顺序
    order.sort_by(|&a, &b| posts[b].date.cmp(&posts[a].date));

    let mut remap = vec![PostId(0); posts.len()];
    for (new, &old) in order.iter().enumerate() {
        remap[old] = PostId(new);
    }

    let mut slots: Vec<Option<Post>> = std::mem::take(posts).into_iter().map(Some).collect();
    *posts = order.iter().filter_map(|&old| slots[old].take()).collect();
    taxonomy.remap_posts(&remap);

    let len = posts.len();
    for (i, post) in posts.iter_mut().enumerate() {
        // 下一篇是更新的文章，上一篇是更旧的文章
        post.next = i.checked_sub(1).map(PostId);
        post.previous = (i + 1 < len).then_some(PostId(i + 1));
    }

    for i in 0..len {
        let related = related_posts(posts, taxonomy, PostId(i), max_related);
        posts[i].related = related;
    }
}

/// 与 `id` 共享任一分类或标签的其他文章，按时间倒序，最多 `max` 篇。
///
/// `max == 0` 或文章既无分类也无标签时返回 `None`。
pub fn related_posts(
    posts: &[Post],
    taxonomy: &Taxonomy,
    id: PostId,
    max: usize,
) -> Option<Vec<PostId>> {
    if max == 0 {
        return None;
    }
    let post = &posts[id.0];
    if post.categories.is_empty() && post.tags.is_empty() {
        return None;
    }

    let from_categories = post
        .categories
        .iter()
        .flat_map(|c| taxonomy.category(*c).posts.iter());
    let from_tags = post.tags.iter().flat_map(|t| taxonomy.tag(*t).posts.iter());

    let mut seen = HashSet::from([id]);
    let mut candidates: Vec<PostId> = Vec::new();
    for &other in from_categories.chain(from_tags) {
        if seen.insert(other) {
            candidates.push(other);
        }
    }

    candidates.sort_by(|a, b| posts[b.0].date.cmp(&posts[a.0].date));
    candidates.truncate(max);
    Some(candidates)
}
