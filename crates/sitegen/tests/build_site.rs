//! Site build integration tests
//!
//! Builds a small project in a temp directory and checks the written output:
//! passthrough copy, global data, layouts, permalinks, and the `date` filter.

use anyhow::Result;
use sitegen::{CONFIG_FILE, SiteBuilder, SiteConfig};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn put(root: &Path, relative: &str, content: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn sample_project(root: &Path) -> Result<()> {
    put(
        root,
        CONFIG_FILE,
        r#"
dates:
  locale: "{{ locale | default(value='en-US') }}"
  time_zone: "UTC"
"#,
    )?;
    put(root, "src/assets/site.css", "body { margin: 0 }")?;
    put(root, "src/assets/img/logo.svg", "<svg/>")?;
    put(
        root,
        "src/_includes/base.html",
        "<html><head><title>{{ title }} | {{ site.name }}</title></head><body>{{ content | safe }}</body></html>",
    )?;
    put(root, "src/_data/site.json", r#"{"name": "Estuary Notes", "date_options": {"dateStyle": "medium"}}"#)?;
    put(root, "src/_data/dates.yaml", "launch: \"2024-03-07\"\n")?;
    put(
        root,
        "src/index.md",
        r#"---
title: Home
layout: base.html
date: 2024-03-07
---
# Welcome

Posted {{ page.date | date(locale="en-GB", style="long") }}.
Launched {{ dates.launch | date(format="LL/dd/yyyy") }}.
"#,
    )?;
    put(
        root,
        "src/posts/first-post.md",
        r#"---
title: First
layout: base.html
date: "2024-03-07T15:45:00Z"
---
Written {{ page.date | date(options=site.date_options) }} at {{ page.url }}
"#,
    )?;
    put(
        root,
        "src/feed.html",
        r#"---
permalink: "/{{ page.file_slug }}.xml"
---
<feed updated="{{ page.date | date(format='yyyy-LL-dd') }}"/>"#,
    )?;
    put(root, "src/draft.md", "---\npermalink: false\n---\nNot yet")?;
    Ok(())
}

fn build(root: &Path, vars: &[(&str, &str)]) -> Result<sitegen::BuildReport> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = SiteConfig::load(&root.join(CONFIG_FILE), &vars)?;
    Ok(SiteBuilder::new(root, config).build()?)
}

#[test]
fn test_build_writes_pages_and_assets() -> Result<()> {
    let tmp = tempdir()?;
    let root = tmp.path();
    sample_project(root)?;

    let report = build(root, &[])?;
    assert_eq!(report.files_copied, 2);
    assert_eq!(report.pages_skipped, vec![PathBuf::from("draft.md")]);
    assert_eq!(
        report.pages_written,
        vec![
            PathBuf::from("feed.xml"),
            PathBuf::from("index.html"),
            PathBuf::from("posts/first-post/index.html"),
        ]
    );

    let site = root.join("_site");
    assert_eq!(fs::read_to_string(site.join("assets/site.css"))?, "body { margin: 0 }");
    assert!(site.join("assets/img/logo.svg").exists());
    assert!(!site.join("draft").exists());
    Ok(())
}

#[test]
fn test_layout_data_and_date_filter() -> Result<()> {
    let tmp = tempdir()?;
    let root = tmp.path();
    sample_project(root)?;
    build(root, &[])?;

    let index = fs::read_to_string(root.join("_site/index.html"))?;
    assert!(index.starts_with("<html><head><title>Home | Estuary Notes</title>"), "{index}");
    assert!(index.contains("<h1 id=\"welcome\">Welcome</h1>"), "{index}");
    assert!(index.contains("Posted 7 March 2024."), "{index}");
    assert!(index.contains("Launched 03/07/2024."), "{index}");

    let post = fs::read_to_string(root.join("_site/posts/first-post/index.html"))?;
    assert!(post.contains("Written Mar 7, 2024 at /posts/first-post/"), "{post}");

    let feed = fs::read_to_string(root.join("_site/feed.xml"))?;
    assert!(feed.contains("updated=\"20"), "{feed}");
    Ok(())
}

#[test]
fn test_config_variables_reach_date_settings() -> Result<()> {
    let tmp = tempdir()?;
    let root = tmp.path();
    sample_project(root)?;
    put(root, "src/plain.md", "---\ndate: 2024-03-07\n---\n{{ page.date | date(style=\"long\") }}")?;

    build(root, &[("locale", "en-GB")])?;
    let plain = fs::read_to_string(root.join("_site/plain/index.html"))?;
    assert!(plain.contains("7 March 2024"), "{plain}");
    Ok(())
}

#[test]
fn test_unparseable_date_renders_empty() -> Result<()> {
    let tmp = tempdir()?;
    let root = tmp.path();
    put(root, "src/index.html", "---\ndate: someday\n---\n[{{ page.date | date }}]")?;

    let mut config = SiteConfig::default();
    config.dates.locale = Some("en-US".to_string());
    config.dates.time_zone = Some("UTC".to_string());
    SiteBuilder::new(root, config).build()?;

    assert_eq!(fs::read_to_string(root.join("_site/index.html"))?, "[]");
    Ok(())
}

#[test]
fn test_template_error_names_page() -> Result<()> {
    let tmp = tempdir()?;
    let root = tmp.path();
    put(root, "src/broken.md", "{{ unclosed ")?;

    let err = SiteBuilder::new(root, SiteConfig::default())
        .build()
        .expect_err("broken template must fail");
    let text = err.to_string();
    assert!(text.contains("broken.md"), "{text}");
    Ok(())
}
