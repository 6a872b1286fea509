//! Report decoration
//!
//! Applies the presentation rules of a test report to its document tree:
//! result cells are colored by status, the step column of feature tables is
//! set in a monospace font, and the first cell of every summary row becomes
//! a link that scrolls to the suite's section.
//!
//! Decoration only sets attributes on existing nodes. Running it twice on the
//! same document leaves the attributes exactly as one run would.

use crate::dom::{Document, NodeId};

/// Class of the `div` elements holding per-suite tables
pub const FEATURE_CLASS: &str = "feature";
/// Id of the `div` holding the summary table
pub const SUMMARY_ID: &str = "summary";
/// Class attribute value that marks table header rows
pub const HEADER_ROW_CLASS: &str = "table_header";

/// Style for `failed` and `error` cells
pub const FAIL_STYLE: &str = "background-color:#faa";
/// Style for `passed` cells
pub const PASS_STYLE: &str = "background-color:#afa";
/// Style for the step-detail column
pub const STEP_STYLE: &str = "font-family: monospace";

/// Cells the decorator works on, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportCells {
    /// `td` elements inside `div.feature`
    pub feature: Vec<NodeId>,
    /// `td` elements inside `div#summary`
    pub summary: Vec<NodeId>,
}

/// Counts of the attributes set by one decoration pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecorationStats {
    pub passed_cells: usize,
    pub failed_cells: usize,
    pub step_cells: usize,
    pub summary_links: usize,
}

/// Applies status colors, step fonts and summary links to a report
#[derive(Debug, Clone)]
pub struct ReportDecorator {
    summary_links: bool,
}

impl ReportDecorator {
    /// Create a decorator with every rule enabled
    pub fn new() -> Self {
        Self {
            summary_links: true,
        }
    }

    /// Builder method: enable or disable summary navigation links
    pub fn with_summary_links(mut self, enabled: bool) -> Self {
        self.summary_links = enabled;
        self
    }

    /// Run the full pass: collect, colorize, update step fonts, add links
    pub fn decorate(&self, doc: &mut Document) -> DecorationStats {
        let cells = Self::collect(doc);
        log::debug!(
            "Decorating report: {} feature cells, {} summary cells",
            cells.feature.len(),
            cells.summary.len()
        );

        let (passed_cells, failed_cells) = Self::colorize(doc, &cells.feature);
        let step_cells = Self::update_steps_font(doc, &cells.feature);
        let summary_links = if self.summary_links {
            Self::add_links(doc, &cells.summary)
        } else {
            0
        };

        let stats = DecorationStats {
            passed_cells,
            failed_cells,
            step_cells,
            summary_links,
        };
        log::debug!("Decoration complete: {:?}", stats);
        stats
    }

    /// Find the feature and summary cells of a report
    pub fn collect(doc: &Document) -> ReportCells {
        let mut cells = ReportCells::default();
        for node in doc.descendants(doc.root()) {
            if doc.element_name(node) != Some("td") {
                continue;
            }
            if has_div_ancestor(doc, node, |d, n| d.has_class(n, FEATURE_CLASS)) {
                cells.feature.push(node);
            }
            if has_div_ancestor(doc, node, |d, n| d.attr(n, "id") == Some(SUMMARY_ID)) {
                cells.summary.push(node);
            }
        }
        cells
    }

    /// Color cells whose markup is exactly `passed`, `failed` or `error`
    ///
    /// Returns the number of (passed, failed) cells colored.
    pub fn colorize(doc: &mut Document, cells: &[NodeId]) -> (usize, usize) {
        let mut passed = 0;
        let mut failed = 0;
        for &cell in cells {
            match doc.inner_html(cell).as_str() {
                "failed" | "error" => {
                    doc.set_style_declaration(cell, FAIL_STYLE);
                    failed += 1;
                }
                "passed" => {
                    doc.set_style_declaration(cell, PASS_STYLE);
                    passed += 1;
                }
                _ => {}
            }
        }
        (passed, failed)
    }

    /// Set the monospace font on the last cell of every non-header row
    pub fn update_steps_font(doc: &mut Document, cells: &[NodeId]) -> usize {
        let mut updated = 0;
        for &cell in cells {
            if doc.next_sibling(cell).is_some() {
                continue;
            }
            let row_class = doc.parent(cell).and_then(|row| doc.attr(row, "class"));
            if row_class == Some(HEADER_ROW_CLASS) {
                continue;
            }
            doc.set_style_declaration(cell, STEP_STYLE);
            updated += 1;
        }
        updated
    }

    /// Make the first cell of every summary row scroll to its section
    pub fn add_links(doc: &mut Document, cells: &[NodeId]) -> usize {
        let ids = doc.id_map();
        let mut linked = 0;
        for &cell in cells {
            if doc.prev_sibling(cell).is_some() {
                continue;
            }
            let target = doc.text_content(cell);
            if !ids.contains_key(&target) {
                log::log!(
                    missing_target_level(doc, cell),
                    "Summary link target not found in report: {:?}",
                    target
                );
            }
            doc.set_attr(cell, "onclick", &scroll_handler(&target));
            linked += 1;
        }
        linked
    }
}

impl Default for ReportDecorator {
    fn default() -> Self {
        Self::new()
    }
}

/// JavaScript click handler that scrolls to the element with id `target`
pub fn scroll_handler(target: &str) -> String {
    let escaped = target.replace('\\', "\\\\").replace('\'', "\\'");
    format!("document.getElementById('{}').scrollIntoView()", escaped)
}

/// Level for a missing link target: `Debug` in header rows, `Warn` elsewhere
fn missing_target_level(doc: &Document, cell: NodeId) -> log::Level {
    match doc.parent(cell).and_then(|row| doc.attr(row, "class")) {
        Some(HEADER_ROW_CLASS) => log::Level::Debug,
        _ => log::Level::Warn,
    }
}

fn has_div_ancestor(
    doc: &Document,
    node: NodeId,
    matches: impl Fn(&Document, NodeId) -> bool,
) -> bool {
    let mut current = doc.parent(node);
    while let Some(ancestor) = current {
        if doc.element_name(ancestor) == Some("div") && matches(doc, ancestor) {
            return true;
        }
        current = doc.parent(ancestor);
    }
    false
}
