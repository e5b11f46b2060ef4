//! 测试用的站点目录夹具

use crate::build::{self, BuildStats};
use crate::build::stages::read::read;
use crate::config::{CONFIG_FILE, SiteConfig, SiteDirs};
use crate::plugin::Registry;
use crate::site::Site;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BASE_CONFIG: &str = "destination = \"../out\"\nworking_dir = \"../work\"\ntime = \"2024-06-01\"\n";

const TEMPLATES: &[(&str, &str)] = &[
    ("post.html", "<article><h1>{{ page.title }}</h1>{{ page.content }}</article>"),
    ("page.html", "<main>{{ page.content }}</main>"),
    ("index.html", "{% for p in page.posts %}<a href=\"{{ p.url }}\">{{ p.title }}</a>{% endfor %}"),
    ("category.html", "<h1>{{ page.category }}</h1>{% for p in page.posts %}{{ p.url }} {% endfor %}"),
    ("tag.html", "<h1>{{ page.tag }}</h1>{% for p in page.posts %}{{ p.url }} {% endfor %}"),
];

/// 临时目录中的站点：`<tmp>/blog/{source,templates}`，输出到 `<tmp>/out`
pub struct SiteFixture {
    tmp: TempDir,
    root: PathBuf,
}

impl SiteFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("blog");
        std::fs::create_dir_all(root.join("source")).unwrap();
        std::fs::create_dir_all(root.join("templates")).unwrap();
        let fixture = Self { tmp, root };
        for (name, body) in TEMPLATES {
            fixture.write_template(name, body);
        }
        fixture
    }

    /// 写入 cpress.toml，`extra` 追加在基础配置之后
    pub fn config(&self, extra: &str) {
        let content = format!("{BASE_CONFIG}{extra}");
        std::fs::write(self.root.join(CONFIG_FILE), content).unwrap();
    }

    pub fn write_source(&self, rel: &str, content: &str) {
        self.write_source_bytes(rel, content.as_bytes());
    }

    pub fn write_source_bytes(&self, rel: &str, content: &[u8]) {
        write(&self.root.join("source").join(rel), content);
    }

    pub fn write_template(&self, name: &str, content: &str) {
        write(&self.root.join("templates").join(name), content.as_bytes());
    }

    pub fn write_asset(&self, rel: &str, content: &str) {
        write(&self.root.join("assets").join(rel), content.as_bytes());
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dest(&self) -> PathBuf {
        self.tmp.path().join("out")
    }

    /// 读取配置后的空站点
    pub fn site(&self) -> Site {
        let config = SiteConfig::load(&self.root).unwrap();
        let dirs = SiteDirs::resolve(&self.root, &config).unwrap();
        Site::new(config, dirs).unwrap()
    }

    /// 执行完读取阶段的站点
    pub fn read_site(&self) -> Site {
        let mut site = self.site();
        read(&mut site, &Registry::new()).unwrap();
        site
    }

    pub fn build(&self) -> anyhow::Result<BuildStats> {
        build::run(&self.root, build::BuildOptions::default())
    }
}

fn write(path: &Path, content: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}
