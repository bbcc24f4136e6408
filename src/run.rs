use std::path::PathBuf;

use chrono::Local;
use tracing::info;

use crate::api::sirene::Sirene;
use crate::api::QueryResult;
use crate::config::Settings;
use crate::error::RunError;
use crate::report::Report;
use crate::SireneApi;

#[derive(Debug)]
pub struct RunSummary {
    /// Every lookup attempt, in call order
    pub results: Vec<QueryResult>,
    pub report_path: PathBuf,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }
}

fn banner(title: &str) {
    let rule = "=".repeat(80);
    println!("{}\n{}\n{}", rule, title, rule);
}

/// Authenticates, looks up the configured SIREN then SIRET, and writes the
/// successful answers to the report file.
///
/// Nothing is requested from the registry when authentication fails. A
/// failed lookup does not stop the other one.
pub fn run(settings: &Settings) -> Result<RunSummary, RunError> {
    banner("Testing INSEE Sirene API");

    println!("\n1. {}", settings.authenticator.describe());
    let mut api = SireneApi::new(settings.authenticator.clone())
        .with_base_url(settings.base_url.clone());
    api.authenticate()?;

    let sirene = Sirene::new(&api);
    let mut results = Vec::with_capacity(2);

    println!("\n2. Fetching data for SIREN: {}", settings.siren);
    let siren = sirene.lookup_by_siren(&settings.siren);
    if siren.is_success() {
        println!("✓ SIREN data retrieved");
    } else {
        println!("   Error fetching SIREN data");
    }
    results.push(siren);

    println!("\n3. Fetching data for SIRET: {}", settings.siret);
    let siret = sirene.lookup_by_siret(&settings.siret);
    if siret.is_success() {
        println!("✓ SIRET data retrieved");
    } else {
        println!("   Error fetching SIRET data");
    }
    results.push(siret);

    let mut report = Report::new(Local::now());
    for result in results.iter().filter(|r| r.is_success()) {
        report.push(result.clone());
    }

    if report.is_empty() {
        println!("\n✗ No data retrieved. Check your credentials and API subscription.");
        return Err(RunError::NoResults {
            attempted: results.len(),
        });
    }

    println!("\n4. Saving results to file...");
    report
        .write_to(&settings.output)
        .map_err(|source| RunError::Report {
            path: settings.output.clone(),
            source,
        })?;
    info!(path = %settings.output.display(), records = report.len(), "report written");
    println!("\nResults saved to: {}", settings.output.display());
    println!("\n✓ Test complete!");

    Ok(RunSummary {
        results,
        report_path: settings.output.clone(),
    })
}
