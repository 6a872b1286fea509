//! JUnit XML parser
//!
//! Reads JUnit result files into [`TestSuite`] values. The suite numbers
//! (`tests`, `failures`, `errors`, `skipped`) come from the first
//! `<testsuite>` element; test cases are collected from the whole file.

use crate::types::{Failure, ReportError, Result, TestCase, TestStatus, TestSuite};
use chrono::NaiveDateTime;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Timestamp layouts seen in `<testsuite timestamp="...">`
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a JUnit XML file
pub fn parse_junit_file(path: &Path) -> Result<TestSuite> {
    log::info!("Parsing JUnit file: {:?}", path);

    let content = std::fs::read_to_string(path)?;
    let suite = parse_junit_str(&content).map_err(|e| match e {
        ReportError::XmlParse(msg) => ReportError::XmlParse(format!("{:?}: {}", path, msg)),
        other => other,
    })?;

    log::info!(
        "Parsed suite '{}' with {} test cases from {:?}",
        suite.name,
        suite.cases.len(),
        path
    );
    Ok(suite)
}

/// List the `*.xml` files of a directory, sorted by file name
pub fn find_junit_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("xml") {
            files.push(path);
        } else {
            log::trace!("Skipping non-JUnit entry: {:?}", path);
        }
    }
    files.sort();
    log::debug!("Found {} JUnit files in {:?}", files.len(), dir);
    Ok(files)
}

/// Parse every JUnit file in a directory
pub fn load_junit_dir(dir: &Path) -> Result<Vec<TestSuite>> {
    find_junit_files(dir)?
        .iter()
        .map(|path| parse_junit_file(path))
        .collect()
}

/// Where text events are currently being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Error,
    Failure,
    SystemOut,
}

/// Accumulates one `<testcase>` while its children are read
#[derive(Debug, Default)]
struct CaseBuilder {
    name: String,
    classname: Option<String>,
    time: Option<String>,
    status: Option<String>,
    error: Option<(Option<String>, String)>,
    failure: Option<(Option<String>, String)>,
    skipped: bool,
    system_out: Option<String>,
}

impl CaseBuilder {
    fn new(mut attrs: HashMap<String, String>) -> Self {
        Self {
            name: attrs.remove("name").unwrap_or_default(),
            classname: attrs.remove("classname"),
            time: attrs.remove("time"),
            status: attrs.remove("status"),
            ..Self::default()
        }
    }

    fn finish(self) -> TestCase {
        let status = match &self.status {
            Some(status) => TestStatus::from_attr(status),
            None if self.error.is_some() => TestStatus::Error,
            None if self.failure.is_some() => TestStatus::Failed,
            None if self.skipped => TestStatus::Skipped,
            None => TestStatus::Passed,
        };

        let failure = self.error.or(self.failure).map(|(kind, message)| {
            let message = message.trim();
            Failure {
                kind,
                message: (!message.is_empty()).then(|| message.to_string()),
            }
        });

        let system_out = self
            .system_out
            .map(|out| out.trim().to_string())
            .filter(|out| !out.is_empty());

        TestCase {
            name: self.name,
            classname: self.classname,
            time: self.time,
            status,
            failure,
            system_out,
        }
    }
}

/// Parse JUnit XML from a string
pub fn parse_junit_str(xml: &str) -> Result<TestSuite> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut suite: Option<TestSuite> = None;
    let mut cases = Vec::new();
    let mut current: Option<CaseBuilder> = None;
    let mut capture = Capture::None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            ReportError::XmlParse(format!("at byte {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"testsuite" => {
                        if suite.is_none() {
                            suite = Some(suite_from_attrs(attributes(e)?)?);
                        }
                    }
                    b"testcase" => {
                        let builder = CaseBuilder::new(attributes(e)?);
                        if is_empty {
                            cases.push(builder.finish());
                        } else {
                            current = Some(builder);
                        }
                    }
                    b"error" | b"failure" => {
                        if let Some(case) = current.as_mut() {
                            let kind = attributes(e)?.remove("type");
                            if e.local_name().as_ref() == b"error" {
                                case.error = Some((kind, String::new()));
                                capture = Capture::Error;
                            } else {
                                case.failure = Some((kind, String::new()));
                                capture = Capture::Failure;
                            }
                            if is_empty {
                                capture = Capture::None;
                            }
                        }
                    }
                    b"skipped" => {
                        if let Some(case) = current.as_mut() {
                            case.skipped = true;
                        }
                    }
                    b"system-out" => {
                        if let Some(case) = current.as_mut() {
                            case.system_out = Some(String::new());
                            if !is_empty {
                                capture = Capture::SystemOut;
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                let text = e
                    .unescape()
                    .map_err(|err| ReportError::XmlParse(err.to_string()))?;
                append_text(current.as_mut(), capture, &text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                append_text(current.as_mut(), capture, &text);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"testcase" => {
                    if let Some(case) = current.take() {
                        cases.push(case.finish());
                    }
                    capture = Capture::None;
                }
                b"error" | b"failure" | b"system-out" => capture = Capture::None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let mut suite = suite.ok_or_else(|| ReportError::MissingElement("testsuite".to_string()))?;
    suite.cases = cases;
    Ok(suite)
}

fn append_text(case: Option<&mut CaseBuilder>, capture: Capture, text: &str) {
    let Some(case) = case else {
        return;
    };
    let target = match capture {
        Capture::Error => case.error.as_mut().map(|(_, message)| message),
        Capture::Failure => case.failure.as_mut().map(|(_, message)| message),
        Capture::SystemOut => case.system_out.as_mut(),
        Capture::None => None,
    };
    if let Some(target) = target {
        target.push_str(text);
    }
}

fn attributes(e: &BytesStart) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ReportError::XmlParse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| ReportError::XmlParse(err.to_string()))?
            .to_string();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn suite_from_attrs(mut attrs: HashMap<String, String>) -> Result<TestSuite> {
    let timestamp = attrs.remove("timestamp").and_then(|raw| {
        let parsed = TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok());
        if parsed.is_none() {
            log::warn!("Ignoring unrecognised suite timestamp: {:?}", raw);
        }
        parsed
    });

    Ok(TestSuite {
        tests: count_attr(&attrs, "tests")?,
        failures: count_attr(&attrs, "failures")?,
        errors: count_attr(&attrs, "errors")?,
        skipped: count_attr(&attrs, "skipped")?,
        name: attrs.remove("name").unwrap_or_default(),
        timestamp,
        cases: Vec::new(),
    })
}

/// A non-negative count attribute; missing means zero
fn count_attr(attrs: &HashMap<String, String>, name: &str) -> Result<u32> {
    match attrs.get(name) {
        None => Ok(0),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ReportError::InvalidAttribute {
                name: name.to_string(),
                value: value.clone(),
            }),
    }
}
