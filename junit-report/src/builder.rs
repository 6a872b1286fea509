//! Report building
//!
//! Turns parsed test suites into an HTML document: a summary table with one
//! row per suite, followed by one feature section per suite listing its test
//! cases. The built document is decorated unless the configuration says
//! otherwise.

use crate::config::ReportConfig;
use crate::decorator::{ReportDecorator, FEATURE_CLASS, HEADER_ROW_CLASS, SUMMARY_ID};
use crate::dom::{Document, NodeId};
use crate::types::{Result, TestCase, TestStatus, TestSuite, Timestamp};
use chrono::Utc;
use std::path::Path;

/// Stylesheet used when no stylesheet file is configured
pub const DEFAULT_STYLESHEET: &str = "\
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; margin-bottom: 2em; }
td { border: 1px solid #ccc; padding: 4px 8px; vertical-align: top; }
tr.table_header td { background-color: #eee; font-weight: bold; }
#summary tr td:first-child { cursor: pointer; text-decoration: underline; }
.feature td:last-child { white-space: pre-wrap; }
.generated { color: #888; font-size: small; }
";

const SUMMARY_HEADERS: &[&str] = &[
    "Test Suite",
    "Tests Executed",
    "Failures",
    "Errors",
    "Percent Passing",
];

const CASE_HEADERS: &[&str] = &[
    "Test Case",
    "Status",
    "Time (sec)",
    "Failure/Error Type",
    "Message",
];

const STEPS_HEADER: &str = "Steps";

/// Builds report documents from test suites
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    config: ReportConfig,
    generated_at: Option<Timestamp>,
}

impl ReportBuilder {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            generated_at: None,
        }
    }

    /// Builder method: fix the generation time shown in the footer
    pub fn with_generated_at(mut self, generated_at: Timestamp) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Build and serialize a report
    pub fn build_html(&self, suites: &[TestSuite]) -> Result<String> {
        Ok(self.build(suites)?.to_html())
    }

    /// Build the report document, decorating it if configured
    pub fn build(&self, suites: &[TestSuite]) -> Result<Document> {
        log::info!("Building report for {} suites", suites.len());

        let mut doc = Document::new();
        let doctype = doc.create_doctype("html", "", "");
        doc.append_child(doc.root(), doctype);
        let html = doc.append_element(doc.root(), "html");

        self.build_head(&mut doc, html)?;

        let body = doc.append_element(html, "body");
        build_summary(&mut doc, body, suites);
        for suite in suites {
            self.build_suite_section(&mut doc, body, suite);
        }

        let generated_at = self.generated_at.unwrap_or_else(Utc::now);
        let footer = doc.append_element(body, "p");
        doc.set_attr(footer, "class", "generated");
        doc.append_text(
            footer,
            &format!("Generated {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        );

        if self.config.decorate {
            ReportDecorator::new()
                .with_summary_links(self.config.summary_links)
                .decorate(&mut doc);
        }

        Ok(doc)
    }

    fn build_head(&self, doc: &mut Document, html: NodeId) -> Result<()> {
        let head = doc.append_element(html, "head");
        let meta = doc.append_element(head, "meta");
        doc.set_attr(meta, "charset", "utf-8");

        let title = doc.append_element(head, "title");
        doc.append_text(title, &self.config.title);

        let css = match &self.config.stylesheet {
            Some(path) => read_asset(path, "stylesheet")?,
            None => DEFAULT_STYLESHEET.to_string(),
        };
        let style = doc.append_element(head, "style");
        doc.append_text(style, &css);

        if let Some(path) = &self.config.script {
            let js = read_asset(path, "script")?;
            let script = doc.append_element(head, "script");
            doc.set_attr(script, "type", "text/javascript");
            doc.append_text(script, &js);
        }
        Ok(())
    }

    fn build_suite_section(&self, doc: &mut Document, body: NodeId, suite: &TestSuite) {
        let div = doc.append_element(body, "div");
        doc.set_attr(div, "class", FEATURE_CLASS);

        let anchor = doc.append_element(div, "a");
        doc.set_attr(anchor, "id", &suite.name);

        let h2 = doc.append_element(div, "h2");
        doc.append_text(h2, &suite.name);

        if let Some(timestamp) = suite.timestamp {
            let started = doc.append_element(div, "p");
            doc.append_text(
                started,
                &format!("Started {}", timestamp.format("%Y-%m-%d %H:%M:%S")),
            );
        }

        let table = doc.append_element(div, "table");
        let mut headers: Vec<&str> = CASE_HEADERS.to_vec();
        if self.config.steps_column {
            headers.push(STEPS_HEADER);
        }
        append_row(doc, table, Some(HEADER_ROW_CLASS), &headers);

        let mut skipped = 0;
        for case in &suite.cases {
            if case.status == TestStatus::Skipped {
                skipped += 1;
                continue;
            }
            let mut cells = case_cells(case);
            if !self.config.steps_column {
                cells.pop();
            }
            let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
            append_row(doc, table, None, &cells);
        }
        log::debug!(
            "Suite '{}': {} rows, {} skipped",
            suite.name,
            suite.cases.len() - skipped,
            skipped
        );
    }
}

fn build_summary(doc: &mut Document, body: NodeId, suites: &[TestSuite]) {
    let div = doc.append_element(body, "div");
    doc.set_attr(div, "id", SUMMARY_ID);

    let h1 = doc.append_element(div, "h1");
    doc.append_text(h1, "Summary");

    let table = doc.append_element(div, "table");
    append_row(doc, table, Some(HEADER_ROW_CLASS), SUMMARY_HEADERS);

    for suite in suites {
        let summary = suite.summary();
        let executed = summary.executed.to_string();
        let failures = summary.failures.to_string();
        let errors = summary.errors.to_string();
        let percent = summary.percent_label();
        append_row(
            doc,
            table,
            None,
            &[
                summary.name.as_str(),
                executed.as_str(),
                failures.as_str(),
                errors.as_str(),
                percent.as_str(),
            ],
        );
    }
}

/// Row cells for one case: name, status, time, type, message, steps
fn case_cells(case: &TestCase) -> Vec<String> {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    match case.status {
        TestStatus::Passed => vec![
            case.name.clone(),
            case.status.to_string(),
            text(&case.time),
            String::new(),
            String::new(),
            String::new(),
        ],
        TestStatus::Failed | TestStatus::Error => {
            let failure = case.failure.clone().unwrap_or_default();
            vec![
                case.name.clone(),
                case.status.to_string(),
                text(&case.time),
                text(&failure.kind),
                text(&failure.message),
                text(&case.system_out),
            ]
        }
        TestStatus::Skipped | TestStatus::Other(_) => vec![
            String::new(),
            case.status.to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
        ],
    }
}

fn append_row(doc: &mut Document, table: NodeId, class: Option<&str>, cells: &[&str]) -> NodeId {
    let tr = doc.append_element(table, "tr");
    if let Some(class) = class {
        doc.set_attr(tr, "class", class);
    }
    for &text in cells {
        let td = doc.append_element(tr, "td");
        if !text.is_empty() {
            doc.append_text(td, text);
        }
    }
    tr
}

fn read_asset(path: &Path, what: &str) -> Result<String> {
    log::debug!("Embedding {} from {:?}", what, path);
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorator::{FAIL_STYLE, PASS_STYLE, STEP_STYLE};
    use crate::types::Failure;
    use chrono::TimeZone;

    fn case(name: &str, status: TestStatus) -> TestCase {
        TestCase {
            name: name.to_string(),
            classname: None,
            time: Some("0.5".to_string()),
            status,
            failure: None,
            system_out: Some("Given something".to_string()),
        }
    }

    fn login_suite() -> TestSuite {
        let mut failed = case("Wrong password", TestStatus::Failed);
        failed.failure = Some(Failure {
            kind: Some("AssertionError".to_string()),
            message: Some("expected 200".to_string()),
        });
        TestSuite {
            name: "LoginTest".to_string(),
            tests: 4,
            failures: 1,
            errors: 0,
            skipped: 1,
            timestamp: None,
            cases: vec![
                case("Valid user", TestStatus::Passed),
                failed,
                case("Later", TestStatus::Skipped),
                case("Odd", TestStatus::Other("untested".to_string())),
            ],
        }
    }

    fn builder(config: ReportConfig) -> ReportBuilder {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        ReportBuilder::new(config).with_generated_at(at)
    }

    /// `div` regions of the report: the summary, or every feature section
    fn regions(doc: &Document, summary: bool) -> Vec<NodeId> {
        doc.descendants(doc.root())
            .into_iter()
            .filter(|&n| doc.element_name(n) == Some("div"))
            .filter(|&n| {
                if summary {
                    doc.attr(n, "id") == Some(SUMMARY_ID)
                } else {
                    doc.has_class(n, FEATURE_CLASS)
                }
            })
            .collect()
    }

    /// Cell texts of every `tr` inside the summary or the feature sections
    fn row_texts(doc: &Document, summary: bool) -> Vec<Vec<String>> {
        regions(doc, summary)
            .into_iter()
            .flat_map(|div| doc.descendants(div))
            .filter(|&n| doc.element_name(n) == Some("tr"))
            .map(|tr| {
                doc.children(tr)
                    .iter()
                    .map(|&td| doc.text_content(td))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_summary_table() {
        let doc = builder(ReportConfig::new()).build(&[login_suite()]).unwrap();
        let rows = row_texts(&doc, true);
        assert_eq!(
            rows,
            vec![
                vec!["Test Suite", "Tests Executed", "Failures", "Errors", "Percent Passing"],
                vec!["LoginTest", "3", "1", "0", "66.7%"],
            ]
        );
    }

    #[test]
    fn test_feature_table_rows() {
        let doc = builder(ReportConfig::new()).build(&[login_suite()]).unwrap();
        let rows = row_texts(&doc, false);
        assert_eq!(rows.len(), 4, "header + 3 non-skipped cases");
        assert_eq!(rows[0].last().map(String::as_str), Some("Steps"));
        assert_eq!(rows[1], vec!["Valid user", "passed", "0.5", "", "", ""]);
        assert_eq!(
            rows[2],
            vec![
                "Wrong password",
                "failed",
                "0.5",
                "AssertionError",
                "expected 200",
                "Given something"
            ]
        );
        assert_eq!(rows[3], vec!["", "untested", "", "", "", ""]);
        let anchor = doc.id_map()["LoginTest"];
        assert_eq!(doc.element_name(anchor), Some("a"));
    }

    #[test]
    fn test_without_steps_column() {
        let config = ReportConfig::new().with_steps_column(false);
        let doc = builder(config).build(&[login_suite()]).unwrap();
        for row in row_texts(&doc, false) {
            assert_eq!(row.len(), CASE_HEADERS.len());
        }
    }

    #[test]
    fn test_built_report_is_decorated() {
        let doc = builder(ReportConfig::new()).build(&[login_suite()]).unwrap();
        let cells = ReportDecorator::collect(&doc);
        let status_cells: Vec<_> = cells
            .feature
            .into_iter()
            .filter(|&td| matches!(doc.text_content(td).as_str(), "passed" | "failed"))
            .collect();
        assert_eq!(doc.attr(status_cells[0], "style"), Some(PASS_STYLE));
        assert_eq!(doc.attr(status_cells[1], "style"), Some(FAIL_STYLE));

        let summary_first = cells.summary[SUMMARY_HEADERS.len()];
        assert_eq!(
            doc.attr(summary_first, "onclick"),
            Some("document.getElementById('LoginTest').scrollIntoView()")
        );

        let html = doc.to_html();
        assert!(html.contains(STEP_STYLE));
        assert!(html.starts_with("<!DOCTYPE html><html><head>"));
        assert!(html.contains("<title>Test Results</title>"));
        assert!(html.contains("Generated 2024-03-01 12:00:00 UTC"));
    }

    #[test]
    fn test_undecorated_report() {
        let config = ReportConfig::new().with_decoration(false);
        let html = builder(config).build_html(&[login_suite()]).unwrap();
        assert!(!html.contains("style=\""));
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn test_missing_stylesheet_is_an_error() {
        let config = ReportConfig::new().with_stylesheet("does/not/exist.css");
        assert!(builder(config).build(&[]).is_err());
    }

    #[test]
    fn test_empty_report() {
        let doc = builder(ReportConfig::new()).build(&[]).unwrap();
        assert_eq!(row_texts(&doc, true).len(), 1);
        assert!(regions(&doc, false).is_empty());
    }
}
