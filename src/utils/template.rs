use crate::domain::model::ReleaseContext;
use crate::utils::error::{ReleaseError, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}").expect("valid placeholder regex")
});

/// 發佈上下文的模板變數，例如 `${nextRelease.version}`、`${env.CI_COMMIT_SHA}`
#[derive(Debug, Clone)]
pub struct TemplateContext {
    values: HashMap<String, String>,
    env: HashMap<String, String>,
}

impl TemplateContext {
    pub fn from_release(context: &ReleaseContext) -> Self {
        let next = &context.next_release;
        let mut values = HashMap::new();
        values.insert("nextRelease.version".to_string(), next.version.clone());
        values.insert("nextRelease.gitTag".to_string(), next.git_tag.clone());
        values.insert("nextRelease.gitHead".to_string(), next.git_head.clone());
        values.insert(
            "nextRelease.name".to_string(),
            next.name.clone().unwrap_or_default(),
        );
        values.insert(
            "nextRelease.notes".to_string(),
            next.notes.clone().unwrap_or_default(),
        );
        values.insert(
            "nextRelease.channel".to_string(),
            next.channel.clone().unwrap_or_default(),
        );
        values.insert("branch.name".to_string(), context.branch.name.clone());

        Self {
            values,
            env: context.env.clone(),
        }
    }

    fn lookup(&self, key: &str) -> Option<String> {
        if let Some(var) = key.strip_prefix("env.") {
            // 未設定的環境變數視為空字串
            return Some(self.env.get(var).cloned().unwrap_or_default());
        }
        self.values.get(key).cloned()
    }

    pub fn render(&self, template: &str) -> Result<String> {
        let mut unresolved = Vec::new();
        let rendered = PLACEHOLDER_RE.replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            match self.lookup(key) {
                Some(value) => value,
                None => {
                    unresolved.push(key.to_string());
                    caps[0].to_string()
                }
            }
        });

        if !unresolved.is_empty() {
            tracing::error!("Unresolved placeholders in '{}': {:?}", template, unresolved);
            return Err(ReleaseError::TemplateError {
                message: format!(
                    "Unresolved placeholder(s) {} in '{}'",
                    unresolved.join(", "),
                    template
                ),
            });
        }

        Ok(rendered.into_owned())
    }

    pub fn render_opt(&self, template: Option<&str>) -> Result<Option<String>> {
        template.map(|t| self.render(t)).transpose()
    }
}
