use crate::config::plugin_config::{AssetDefinition, AssetSpec, PathPatterns};
use crate::utils::error::Result;
use crate::utils::template::TemplateContext;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 展開資產設定中的 glob，回傳每個檔案一筆的資產定義
pub fn collect_assets(
    cwd: &Path,
    specs: &[AssetSpec],
    tpl: &TemplateContext,
) -> Result<Vec<AssetDefinition>> {
    let mut collected = Vec::new();
    let mut seen_paths = HashSet::new();

    for spec in specs {
        let definition = spec.definition();

        if definition.url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
            collected.push(definition);
            continue;
        }

        let Some(path) = &definition.path else {
            continue;
        };

        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        for pattern in path.patterns() {
            let rendered = tpl.render(pattern)?;
            match rendered.strip_prefix('!') {
                Some(negated) => excludes.push(glob::Pattern::new(negated)?),
                None => includes.push(rendered),
            }
        }

        let mut matches = Vec::new();
        for pattern in &includes {
            for file in expand_pattern(cwd, pattern)? {
                if excludes.iter().any(|ex| ex.matches_path(&file)) || matches.contains(&file) {
                    continue;
                }
                matches.push(file);
            }
        }

        let expanded: Vec<AssetDefinition> = match matches.len() {
            0 => {
                // 保留原始路徑，讓發佈階段回報「無法讀取」並略過
                tracing::debug!("No file matches asset pattern(s) {:?}", includes);
                match includes.first() {
                    Some(first) => vec![with_path(&definition, first.clone(), true)],
                    None => Vec::new(),
                }
            }
            1 => vec![with_path(&definition, display_path(&matches[0]), true)],
            n => {
                // 多個檔案無法共用同一個 label
                tracing::debug!("Asset pattern(s) {:?} matched {} files", includes, n);
                matches
                    .iter()
                    .map(|file| with_path(&definition, display_path(file), false))
                    .collect()
            }
        };

        for asset in expanded {
            let key = asset.first_path().unwrap_or_default().to_string();
            if seen_paths.insert(key) {
                collected.push(asset);
            }
        }
    }

    Ok(collected)
}

fn expand_pattern(cwd: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    // cwd 本身可能含有 `[`、`*` 等字元，只有使用者的 pattern 才是 glob 語法
    let base = glob::Pattern::escape(&cwd.to_string_lossy());
    let full_pattern = Path::new(&base).join(pattern);
    let mut files = Vec::new();

    for entry in glob::glob(&full_pattern.to_string_lossy())? {
        match entry {
            Ok(found) => {
                let relative = found.strip_prefix(cwd).map(Path::to_path_buf).unwrap_or(found);
                files.push(relative);
            }
            Err(e) => tracing::warn!("⚠️ Skipping unreadable path while globbing: {}", e),
        }
    }

    Ok(files)
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn with_path(definition: &AssetDefinition, path: String, keep_label: bool) -> AssetDefinition {
    AssetDefinition {
        path: Some(PathPatterns::One(path)),
        label: if keep_label {
            definition.label.clone()
        } else {
            None
        },
        ..definition.clone()
    }
}
