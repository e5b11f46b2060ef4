use std::path::PathBuf;
use thiserror::Error;

/// 构建过程中的致命错误，均指明出错的源文件或路径
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("文章缺少 date 字段：{}", file.display())]
    MissingDate { file: PathBuf },

    #[error("无法解析日期 '{value}'：{}", file.display())]
    InvalidDate { file: PathBuf, value: String },

    #[error("Front Matter 解析失败：{}", file.display())]
    InvalidFrontMatter { file: PathBuf },

    #[error("分类 '{path}' 的父分类 '{parent}' 未定义")]
    MissingParentCategory { path: String, parent: String },

    #[error("分类 '{path}' 排在父分类 '{parent}' 之前")]
    CategoryOrder { path: String, parent: String },

    #[error("站点目录不存在或不可读：{}", .0.display())]
    SiteDirMissing(PathBuf),

    #[error("source 目录不存在或不可读：{}", .0.display())]
    SourceDirMissing(PathBuf),

    #[error("站点和 source 目录下都没有可用的模板目录：{}", .0.display())]
    TemplatesDirMissing(PathBuf),

    #[error("目标目录不能等于或包含 source 目录：{} ⊇ {}", dest.display(), src.display())]
    DestinationContainsSource { dest: PathBuf, src: PathBuf },

    #[error("配置错误：{0}")]
    Config(String),
}
