//! Renderer module
//!
//! Renders ResultSet to different output formats: jsonl, json, md, raw

use crate::core::model::{Kind, ResultItem, ResultSet};
use std::io::Write;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
        }
    }

    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for result sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            config: RenderConfig::new(format),
        }
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a result set to a string
    pub fn render(&self, result_set: &ResultSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(result_set),
            OutputFormat::Json => self.render_json(result_set),
            OutputFormat::Markdown => self.render_markdown(result_set),
            OutputFormat::Raw => self.render_raw(result_set),
        }
    }

    /// Render to a writer, followed by a newline when output is non-empty
    pub fn render_to<W: Write>(
        &self,
        result_set: &ResultSet,
        mut writer: W,
    ) -> std::io::Result<()> {
        let output = self.render(result_set);
        writer.write_all(output.as_bytes())?;
        if !output.is_empty() && !output.ends_with('\n') {
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, result_set: &ResultSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown
    fn render_markdown(&self, result_set: &ResultSet) -> String {
        let mut output = String::new();

        let errors: Vec<_> = result_set
            .items
            .iter()
            .flat_map(|item| item.errors.iter())
            .collect();
        if !errors.is_empty() {
            output.push_str("## Errors\n\n");
            for error in errors {
                output.push_str(&format!("- **{}**: {}\n", error.code, error.message));
            }
            output.push('\n');
        }

        for item in &result_set.items {
            self.render_item_md(&mut output, item);
        }

        output
    }

    fn render_item_md(&self, output: &mut String, item: &ResultItem) {
        let title = match item.kind {
            Kind::Entry => "Hit",
            Kind::Miss => "Miss",
            Kind::Saved => "Saved",
            Kind::Prune => "Prune",
            Kind::Status => "Status",
        };
        output.push_str(&format!("## {}", title));
        if let Some(digest) = &item.digest {
            output.push_str(&format!(" `{}`", digest));
        }
        output.push('\n');

        if let Some(size) = item.meta.size {
            output.push_str(&format!("\n- size: {} bytes\n", size));
        }
        if let Some(tier) = item.meta.tier {
            output.push_str(&format!("- tier: {:?}\n", tier).to_lowercase());
        }

        if let Some(excerpt) = &item.excerpt {
            output.push_str("\n```\n");
            output.push_str(excerpt);
            if !excerpt.ends_with('\n') {
                output.push('\n');
            }
            output.push_str("```\n");
        }

        if item.meta.lossy {
            output.push_str("\n> Content is not valid UTF-8; shown lossily\n");
        }

        output.push('\n');
    }

    /// Render as raw output: excerpts only
    fn render_raw(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| item.excerpt.clone())
            .collect::<Vec<_>>()
            .join("\n---\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CacheIssue, ResultItem, Tier};

    #[test]
    fn test_render_jsonl() {
        let mut result_set = ResultSet::new();
        result_set.push(ResultItem::miss("ab01cd"));
        result_set.push(ResultItem::saved("ab01ce", 3));

        let renderer = Renderer::new(OutputFormat::Jsonl);
        let output = renderer.render(&result_set);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"miss\""));
        assert!(lines[1].contains("\"saved\""));
    }

    #[test]
    fn test_render_json_array() {
        let mut result_set = ResultSet::new();
        result_set.push(ResultItem::miss("ab01cd"));

        let output = Renderer::new(OutputFormat::Json).render(&result_set);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_render_markdown_sections() {
        let mut result_set = ResultSet::new();
        result_set.push(ResultItem::entry("ab01cd", b"warning: x", Tier::Index));
        result_set.push(ResultItem::miss("ab01ce").with_error(CacheIssue::new("E", "bad")));

        let output = Renderer::new(OutputFormat::Markdown).render(&result_set);
        assert!(output.starts_with("## Errors"));
        assert!(output.contains("## Hit `ab01cd`"));
        assert!(output.contains("- tier: index"));
        assert!(output.contains("warning: x"));
    }

    #[test]
    fn test_render_raw_excerpts_only() {
        let mut result_set = ResultSet::new();
        result_set.push(ResultItem::entry("ab01cd", b"hello", Tier::Sharded));
        result_set.push(ResultItem::miss("ab01ce"));

        let output = Renderer::new(OutputFormat::Raw).render(&result_set);
        assert_eq!(output, "hello");
    }

    #[test]
    fn test_render_to_appends_newline() {
        let mut result_set = ResultSet::new();
        result_set.push(ResultItem::miss("ab01cd"));

        let mut buf = Vec::new();
        Renderer::with_config(RenderConfig::with_pretty(OutputFormat::Jsonl, false))
            .render_to(&result_set, &mut buf)
            .unwrap();
        assert!(buf.ends_with(b"\n"));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
