//! Markdown renderer implementation.

use super::{quality_report, RenderOptions};
use crate::model::{SanctionDocument, TargetSanction, SENTINEL};

/// Markdown renderer.
#[derive(Debug)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Creates a new renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renders a document to a Markdown string.
    pub fn render(&self, document: &SanctionDocument) -> String {
        let mut output = String::new();

        if self.options.include_frontmatter {
            self.render_frontmatter(document, &mut output);
        }

        output.push_str(&format!("# {}\n\n", self.text(&display(&document.institution))));
        output.push_str(&format!("- 제재조치일: {}\n", display(&document.sanction_date)));
        output.push_str(&format!("- 형식: {}\n", document.layout));
        output.push_str(&format!("- 추출방식: {}\n\n", document.source));

        output.push_str("## 제재조치내용\n\n");
        self.render_pairs(&document.pairs, &mut output);

        if self.options.include_details && !document.sanction_details.is_empty() {
            output.push_str("```text\n");
            output.push_str(&document.sanction_details);
            output.push_str("\n```\n\n");
        }

        output.push_str("## 제재대상사실\n\n");
        self.render_incidents(document, &mut output);

        if self.options.include_quality {
            self.render_quality(document, &mut output);
        }

        output
    }

    /// Renders YAML frontmatter.
    fn render_frontmatter(&self, document: &SanctionDocument, output: &mut String) {
        output.push_str("---\n");

        if !document.institution.is_empty() {
            output.push_str(&format!("institution: \"{}\"\n", escape_yaml(&document.institution)));
        }
        if !document.sanction_date.is_empty() {
            output.push_str(&format!("date: \"{}\"\n", document.sanction_date));
        }
        let subjects = crate::alias::unique_subjects(&document.pairs);
        if !subjects.is_empty() {
            output.push_str("subjects:\n");
            for subject in &subjects {
                output.push_str(&format!("  - \"{}\"\n", escape_yaml(subject)));
            }
        }
        output.push_str(&format!("incidents: {}\n", document.incidents.len()));
        output.push_str(&format!("layout: \"{}\"\n", document.layout));
        output.push_str(&format!("source: \"{}\"\n", document.source));

        output.push_str("---\n\n");
    }

    /// Renders the pairs as a two-column table.
    fn render_pairs(&self, pairs: &[TargetSanction], output: &mut String) {
        output.push_str("| 제재대상 | 제재내용 |\n");
        output.push_str("| --- | --- |\n");

        if pairs.is_empty() {
            output.push_str(&format!("| {} | {} |\n\n", SENTINEL, SENTINEL));
            return;
        }

        for pair in pairs {
            output.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&pair.subject),
                escape_cell(&pair.content)
            ));
        }
        output.push('\n');
    }

    fn render_incidents(&self, document: &SanctionDocument, output: &mut String) {
        if document.incidents.is_empty() {
            output.push_str(SENTINEL);
            output.push_str("\n\n");
            return;
        }

        let marker = "#".repeat(self.options.incident_heading_level as usize);
        for (i, incident) in document.incidents.iter().enumerate() {
            output.push_str(&format!(
                "{} {}. {}\n\n",
                marker,
                i + 1,
                self.text(&display(&incident.title))
            ));

            if self.options.include_bodies && !incident.body.is_empty() {
                output.push_str(&self.text(&incident.body));
                output.push_str("\n\n");
            }
        }
    }

    fn render_quality(&self, document: &SanctionDocument, output: &mut String) {
        let report = quality_report(document);
        output.push_str("## 품질 점검\n\n");

        if report.is_clean() {
            output.push_str("- 이상 없음\n");
            return;
        }
        if !report.missing_fields.is_empty() {
            output.push_str(&format!("- 누락필드: {}\n", report.missing_fields.join(", ")));
        }
        for issue in &report.issues {
            output.push_str(&format!("- {}\n", issue));
        }
    }

    fn text(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

fn display(value: &str) -> &str {
    if value.trim().is_empty() {
        SENTINEL
    } else {
        value
    }
}

/// Escapes special Markdown characters.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '\\' | '`' | '*' | '_' | '{' | '}' | '[' | ']' | '#' | '+' | '!' | '|' => {
                result.push('\\');
                result.push(ch);
            }
            _ => result.push(ch),
        }
    }

    result
}

/// Keeps a value inside one table cell.
fn escape_cell(text: &str) -> String {
    display(text).replace('|', "\\|").replace('\n', "<br>")
}

/// Escapes special characters for YAML strings.
fn escape_yaml(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Incident, Layout};

    fn document() -> SanctionDocument {
        SanctionDocument {
            institution: "테스트은행".into(),
            sanction_date: "2024-05-15".into(),
            pairs: vec![
                TargetSanction::new("기관", "기관경고, 과태료 1억원"),
                TargetSanction::new("임원|직원", "주의 2명"),
            ],
            incidents: vec![
                Incident::new("고객정보 관리 부적정", "내부통제기준을 위반하였다."),
                Incident::new("보고의무 위반", ""),
            ],
            layout: Layout::Tabular,
            sanction_details: "기관 기관경고".into(),
            ..SanctionDocument::default()
        }
    }

    #[test]
    fn test_render_pairs_and_incidents() {
        let output = MarkdownRenderer::new(RenderOptions::default()).render(&document());

        assert!(output.starts_with("# 테스트은행\n"));
        assert!(output.contains("- 제재조치일: 2024-05-15"));
        assert!(output.contains("| 기관 | 기관경고, 과태료 1억원 |"));
        assert!(output.contains("| 임원\\|직원 | 주의 2명 |"));
        assert!(output.contains("### 1. 고객정보 관리 부적정\n\n내부통제기준을 위반하였다."));
        assert!(output.contains("### 2. 보고의무 위반\n"));
        assert!(!output.contains("```text"));
    }

    #[test]
    fn test_render_frontmatter() {
        let options = RenderOptions::new().with_frontmatter();
        let output = MarkdownRenderer::new(options).render(&document());

        assert!(output.starts_with("---\ninstitution: \"테스트은행\"\n"));
        assert!(output.contains("subjects:\n  - \"기관\"\n  - \"임원\"\n  - \"직원\"\n"));
        assert!(output.contains("layout: \"tabular\""));
    }

    #[test]
    fn test_render_without_bodies() {
        let options = RenderOptions::new().without_bodies().with_incident_heading_level(2);
        let output = MarkdownRenderer::new(options).render(&document());

        assert!(output.contains("## 1. 고객정보 관리 부적정\n\n## 2."));
        assert!(!output.contains("내부통제기준"));
    }

    #[test]
    fn test_render_details() {
        let output = MarkdownRenderer::new(RenderOptions::new().with_details()).render(&document());
        assert!(output.contains("```text\n기관 기관경고\n```"));
    }

    #[test]
    fn test_render_empty_document() {
        let output = MarkdownRenderer::new(RenderOptions::new().with_quality_report())
            .render(&SanctionDocument::default());

        assert!(output.starts_with("# -\n"));
        assert!(output.contains("| - | - |"));
        assert!(output.contains("## 제재대상사실\n\n-\n"));
        assert!(output.contains("- 누락필드: 금융회사명"));
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("*bold*"), "\\*bold\\*");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
        assert_eq!(escape_markdown("1. 항목 - 설명"), "1. 항목 - 설명");
    }

    #[test]
    fn test_escape_yaml() {
        assert_eq!(escape_yaml("a \"b\"\nc"), "a \\\"b\\\"\\nc");
    }
}
