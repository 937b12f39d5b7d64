//! Site initialization.
//!
//! Creates a new guides site with a default config and one example guide.

use crate::config::SiteConfig;
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Files to write ignore patterns to
const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

/// Default config filename
const CONFIG_FILE: &str = "guidepress.toml";

/// Default site directory structure
const SITE_DIRS: &[&str] = &["content/nestjs", "assets/images"];

const EXAMPLE_GUIDE_PATH: &str = "content/nestjs/intro.md";

const EXAMPLE_GUIDE: &str = r#"---
title: "NestJS 소개"
description: "NestJS의 핵심 개념과 프로젝트 구조를 살펴봅니다"
date: "2025-01-15"
category: "nestjs"
---

## NestJS란?

NestJS는 효율적이고 확장 가능한 Node.js 서버 애플리케이션을 만들기 위한 프레임워크입니다.

## 설치

```bash
npm i -g @nestjs/cli
nest new project-name
```

### 프로젝트 구조

| 파일 | 역할 |
|------|------|
| `main.ts` | 애플리케이션 진입점 |
| `app.module.ts` | 루트 모듈 |
"#;

/// Create a new site with default structure
pub fn new_site(config: &'static SiteConfig, has_name: bool) -> Result<()> {
    let root = config.get_root();

    // init in the current directory requires it to be empty
    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `guidepress init <SITE_NAME>` to create in a subdirectory."
        );
    }

    init_site_structure(root)?;
    init_default_config(root)?;
    fs::write(root.join(EXAMPLE_GUIDE_PATH), EXAMPLE_GUIDE)
        .with_context(|| format!("Failed to write {EXAMPLE_GUIDE_PATH}"))?;

    let output = config.build.output.strip_prefix(root).unwrap_or(&config.build.output);
    init_ignored_files(root, &[output])?;

    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

/// Write default configuration file with placeholders for the required fields
fn init_default_config(root: &Path) -> Result<()> {
    let mut config = SiteConfig::default();
    config.base.title = "<SITE_TITLE>".into();
    config.base.description = "<SITE_DESCRIPTION>".into();
    config.base.url = Some("https://example.com".into());

    let content = toml::to_string_pretty(&config)?;
    fs::write(root.join(CONFIG_FILE), content)?;
    Ok(())
}

/// Create site directory structure
fn init_site_structure(root: &Path) -> Result<()> {
    for dir in SITE_DIRS {
        let path = root.join(dir);
        if path.exists() {
            bail!(
                "Path `{}` already exists. Try `guidepress init <SITE_NAME>` instead.",
                path.display()
            );
        }
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}

/// Initialize .gitignore and .ignore files with specified paths
fn init_ignored_files(root: &Path, paths: &[&Path]) -> Result<()> {
    let content = paths
        .iter()
        .filter_map(|p| p.to_str())
        .collect::<Vec<_>>()
        .join("\n");

    for filename in IGNORE_FILES {
        let path = root.join(filename);
        if !path.exists() {
            fs::write(&path, &content)?;
        }
    }

    Ok(())
}
