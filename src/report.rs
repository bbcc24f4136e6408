//! Text report of a lookup run.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Local};

use crate::api::QueryResult;

pub const DEFAULT_REPORT_FILE: &str = "insee_api_results.txt";

const TITLE: &str = "INSEE SIRENE API TEST RESULTS";
const NO_DATA: &str = "ERROR: No data returned";
const RULE_WIDTH: usize = 80;

#[derive(Debug)]
pub struct Report {
    generated_at: DateTime<Local>,
    results: Vec<QueryResult>,
}

impl Report {
    pub fn new(generated_at: DateTime<Local>) -> Self {
        Self {
            generated_at,
            results: vec![],
        }
    }

    pub fn push(&mut self, result: QueryResult) {
        self.results.push(result);
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Writes the header, then one block per result in insertion order.
    pub fn write_report<W: Write>(&self, mut out: W) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(out, "{}", rule)?;
        writeln!(out, "{}", TITLE)?;
        writeln!(
            out,
            "Generated on: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(out, "{}\n", rule)?;

        for result in &self.results {
            writeln!(out, "\n{}", rule)?;
            writeln!(out, "Query Type: {}", result.query_type)?;
            writeln!(out, "Query Value: {}", result.query_value)?;
            writeln!(out, "{}\n", rule)?;

            match &result.payload {
                Some(data) => serde_json::to_writer_pretty(&mut out, data)?,
                None => writeln!(out, "{}", NO_DATA)?,
            }

            write!(out, "\n\n")?;
        }

        out.flush()
    }

    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_report(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Creates (or truncates) `path` and writes the UTF-8 report to it.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_report(BufWriter::new(file))
    }
}
