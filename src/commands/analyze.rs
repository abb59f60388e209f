//! Analyze command - One-off company analysis printed to stdout.
//!
//! Runs the full research and framework pipeline against the configured
//! language model and search API without touching the database.

use std::fmt::Write as _;
use std::sync::Arc;

use uuid::Uuid;

use crate::cli::args::AnalyzeArgs;
use crate::config::Config;
use crate::domain::{BcgQuadrant, PestelAnalysis, PorterFiveForces, UserAnalysis};
use crate::errors::{AppError, AppResult};
use crate::infra::RepositorySet;
use crate::services::{Backends, ServiceContainer, Services};

/// Execute the analyze command
pub async fn execute(args: AnalyzeArgs, config: Config) -> AppResult<()> {
    let backends = Backends::from_config(&config)?;
    let services = Services::build(Arc::new(RepositorySet::ephemeral()), config, backends);

    tracing::info!(company = %args.company, "Analyzing company");
    let analysis = services
        .analyses()
        .analyze_company(Uuid::nil(), &args.company)
        .await?;

    let output = if args.json {
        serde_json::to_string_pretty(&analysis)
            .map_err(|e| AppError::internal(format!("Failed to encode analysis: {}", e)))?
    } else {
        digest(&analysis)
    };
    println!("{}", output);

    Ok(())
}

/// Human-readable summary of an analysis; charts are listed by title only.
fn digest(analysis: &UserAnalysis) -> String {
    let report = &analysis.report;
    let mut out = String::new();

    let _ = writeln!(out, "{}", analysis.company_name);
    let _ = writeln!(out, "{}", "=".repeat(analysis.company_name.chars().count()));

    if let Some(swot) = &report.swot {
        let _ = writeln!(
            out,
            "SWOT: {} strengths, {} weaknesses, {} opportunities, {} threats (balance {:+})",
            swot.strengths.len(),
            swot.weaknesses.len(),
            swot.opportunities.len(),
            swot.threats.len(),
            swot.balance()
        );
    }

    if let Some(pestel) = &report.pestel {
        let impacts = PestelAnalysis::LABELS
            .iter()
            .zip(pestel.dimensions())
            .map(|(label, dimension)| format!("{} {}", label, dimension.impact))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "PESTEL impact: {}", impacts);
    }

    if let Some(porter) = &report.porter {
        let forces = PorterFiveForces::LABELS
            .iter()
            .zip(porter.forces())
            .map(|(label, force)| format!("{} {}", label, force.intensity))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "Five Forces: {} (average {:.1})",
            forces,
            porter.average_intensity()
        );
    }

    if let Some(bcg) = &report.bcg {
        let quadrants = [
            BcgQuadrant::Star,
            BcgQuadrant::CashCow,
            BcgQuadrant::QuestionMark,
            BcgQuadrant::Dog,
        ]
        .iter()
        .map(|q| format!("{} {}", q, bcg.count(*q)))
        .collect::<Vec<_>>()
        .join(", ");
        let _ = writeln!(out, "BCG: {}", quadrants);
    }

    if let Some(mckinsey) = &report.mckinsey {
        let _ = writeln!(out, "Strategy: {}", mckinsey.strategy);
    }

    if let Some(sentiment) = &report.sentiment {
        let _ = writeln!(
            out,
            "LinkedIn sentiment: {:+.2} ({:.0}% positive, {:.0}% negative)",
            sentiment.overall_score, sentiment.positive, sentiment.negative
        );
    }

    for failure in &report.failures {
        let _ = writeln!(out, "Failed: {} ({})", failure.framework, failure.message);
    }

    if !analysis.charts.is_empty() {
        let titles = analysis
            .charts
            .iter()
            .map(|c| c.title.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "Charts: {}", titles);
    }

    if !report.sources.is_empty() {
        let _ = writeln!(out, "Sources:");
        for source in &report.sources {
            let _ = writeln!(out, "  {}", source);
        }
    }

    out
}
