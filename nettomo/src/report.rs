//! The files an analysis produces.
//!
//! Reports are rendered in memory and only written once the whole
//! analysis succeeded, so a failing run leaves no partial output.

use anyhow::Context as _;
use nettomo_core::{compare::LinkComparison, link::LinkId};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

pub const SUMMARY_FILE: &str = "summary.txt";
const CSV_HEADER: &str = "measure,theory";

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    files: Vec<(String, String)>,
}

impl Report {
    pub fn new(comparisons: &[LinkComparison]) -> Self {
        let mut files = Vec::with_capacity(comparisons.len() * 2 + 1);
        for comparison in comparisons {
            files.push((
                file_name("delay", comparison.link),
                delay_csv(&comparison.delay_rows),
            ));
            files.push((
                file_name("loss", comparison.link),
                loss_csv(&comparison.loss_rows),
            ));
        }
        files.push((SUMMARY_FILE.to_owned(), summary(comparisons)));

        Self { files }
    }

    /// the `(file name, content)` of every file of the report.
    pub fn files(&self) -> &[(String, String)] {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(file, _)| file == name)
            .map(|(_, content)| content.as_str())
    }

    pub fn write_to(&self, directory: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(directory)
            .with_context(|| format!("failed to create {}", directory.display()))?;

        for (name, content) in &self.files {
            let path = directory.join(name);
            fs::write(&path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        info!(
            files = self.files.len(),
            directory = %directory.display(),
            "reports written"
        );
        Ok(())
    }
}

/// `<log>.ans`, next to the log.
pub fn default_output(log: &Path) -> PathBuf {
    let mut name = log.as_os_str().to_owned();
    name.push(".ans");
    PathBuf::from(name)
}

fn file_name(kind: &str, link: LinkId) -> String {
    let (a, b) = link.into_nodes();
    format!("{kind}_{a}_{b}.csv")
}

fn delay_csv(rows: &[(f64, f64)]) -> String {
    let mut csv = format!("{CSV_HEADER}\n");
    for (measure, theory) in rows {
        csv.push_str(&format!("{measure},{theory}\n"));
    }
    csv
}

fn loss_csv(rows: &[(Option<f64>, f64)]) -> String {
    let mut csv = format!("{CSV_HEADER}\n");
    for (measure, theory) in rows {
        match measure {
            Some(measure) => csv.push_str(&format!("{measure},{theory}\n")),
            None => csv.push_str(&format!(",{theory}\n")),
        }
    }
    csv
}

fn percent(error: Option<f64>) -> String {
    match error {
        Some(error) => format!("{:.4}", error * 100.0),
        None => "n/a".to_owned(),
    }
}

fn summary(comparisons: &[LinkComparison]) -> String {
    comparisons
        .iter()
        .map(|comparison| {
            format!(
                "{link} delay_error:{delay} loss_error:{loss}\n",
                link = comparison.link,
                delay = percent(comparison.delay_error),
                loss = percent(comparison.loss_error),
            )
        })
        .collect()
}
