//! Decorate an existing HTML test report in place
//!
//! Usage:
//!   decorate_report <report.html> [<output.html>]

use junit_report::{html_import, ReportDecorator};
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <report.html> [<output.html>]", args[0]);
        std::process::exit(1);
    }

    let input = PathBuf::from(&args[1]);
    let output = args.get(2).map(PathBuf::from).unwrap_or_else(|| input.clone());

    let mut doc = match html_import::read_html_file(&input) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error reading {:?}: {}", input, e);
            std::process::exit(1);
        }
    };

    let stats = ReportDecorator::new().decorate(&mut doc);
    println!("Passed cells:  {}", stats.passed_cells);
    println!("Failed cells:  {}", stats.failed_cells);
    println!("Step cells:    {}", stats.step_cells);
    println!("Summary links: {}", stats.summary_links);

    if let Err(e) = std::fs::write(&output, doc.to_html()) {
        eprintln!("Error writing {:?}: {}", output, e);
        std::process::exit(1);
    }
    println!("Wrote {:?}", output);
}
