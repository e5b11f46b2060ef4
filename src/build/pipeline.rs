use crate::build::BuildStats;
use crate::build::stage::Stage;
use crate::build::stages;
use crate::plugin::Registry;
use crate::site::Site;
use crate::template::Renderer;
use anyhow::{Context, Result};
use std::time::Instant;

/// 按 read → generate → render → cleanup → write 顺序执行构建。
///
/// 每个阶段处理完全部内容后才进入下一阶段，任一阶段出错即中止。
pub fn execute(site: &mut Site, registry: &Registry, renderer: &dyn Renderer) -> Result<BuildStats> {
    tracing::info!("开始构建...");
    let start = Instant::now();

    run_stage(Stage::Read, || stages::read::read(site, registry))?;
    run_stage(Stage::Generate, || stages::generate::generate(site, registry))?;
    run_stage(Stage::Render, || stages::render::render(site, registry, renderer))?;
    let deleted = run_stage(Stage::Cleanup, || stages::cleanup::cleanup(site, registry))?;
    let written = run_stage(Stage::Write, || stages::write::write(site, registry))?;

    let stats = BuildStats {
        posts: site.posts.len(),
        pages: site.pages.len(),
        static_files: site.static_files.len(),
        written: written.written,
        unchanged: written.unchanged,
        deleted,
    };
    tracing::info!(
        "构建完成，耗时 {:.2}s（{} 篇文章，{} 个页面，{} 个静态文件；写入 {}，未变 {}，清理 {}）",
        start.elapsed().as_secs_f64(),
        stats.posts,
        stats.pages,
        stats.static_files,
        stats.written,
        stats.unchanged,
        stats.deleted,
    );
    Ok(stats)
}

fn run_stage<T>(stage: Stage, f: impl FnOnce() -> Result<T>) -> Result<T> {
    tracing::debug!("阶段 {stage} 开始");
    let start = Instant::now();
    let out = f().with_context(|| format!("{stage} 阶段失败"))?;
    tracing::debug!("阶段 {stage} 完成，耗时 {:?}", start.elapsed());
    Ok(out)
}
