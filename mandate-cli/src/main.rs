use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::*;
use mandate_protocol::{BusinessProfile, EvaluationReport, ProfileViolation};
use mandate_rules::{load_catalog, RuleEngine};

mod client;

use client::{CliError, ServiceClient};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "mandate")]
#[command(about = "Mandate - regulatory obligations for US small businesses", long_about = None)]
struct Cli {
    #[arg(long, global = true, env = "MANDATE_SERVER_URL")]
    server: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a business profile and print its obligations
    Evaluate(EvaluateArgs),
    /// List rules stored on the server
    Rules(RulesArgs),
    /// Validate a profile file without evaluating it
    Check(CheckArgs),
    /// Show version information
    Version,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Path to the business profile JSON file
    #[arg(long)]
    profile: PathBuf,
    /// Evaluate locally against rule packs at this path instead of a server
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Idempotency key forwarded to the server
    #[arg(long)]
    key: Option<String>,
    /// Print the raw JSON report instead of the summary
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args)]
struct RulesArgs {
    /// Maximum number of rules to list
    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Args)]
struct CheckArgs {
    /// Path to the business profile JSON file
    #[arg(long)]
    profile: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let server = cli
        .server
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

    match cli.command {
        Commands::Evaluate(args) => evaluate(args, &server).await,
        Commands::Rules(args) => rules(args, &server).await,
        Commands::Check(args) => check(args),
        Commands::Version => {
            println!("Mandate v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn evaluate(args: EvaluateArgs, server: &str) -> Result<(), CliError> {
    let profile = load_profile(&args.profile)?;

    if let Err(err) = profile.validate() {
        print_violations(&err.violations);
        return Err(CliError::Validation("profile failed validation".into()));
    }

    if let Some(catalog_path) = &args.catalog {
        if args.key.is_some() {
            return Err(CliError::Validation(
                "an idempotency key only applies when evaluating against a server".into(),
            ));
        }
        let report = evaluate_locally(&profile, catalog_path)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report, false);
        }
        return Ok(());
    }

    let client = ServiceClient::new(server)?;
    let (results, replayed) = client.evaluate(&profile, args.key.as_deref()).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        match serde_json::from_value::<EvaluationReport>(results.clone()) {
            Ok(report) => print_report(&report, replayed),
            Err(_) => println!("{}", serde_json::to_string_pretty(&results)?),
        }
    }
    Ok(())
}

fn evaluate_locally(
    profile: &BusinessProfile,
    catalog_path: &Path,
) -> Result<EvaluationReport, CliError> {
    let catalog = load_catalog(catalog_path).map_err(|err| CliError::Catalog(err.to_string()))?;
    let engine = RuleEngine::new(catalog);
    Ok(engine.evaluate(profile))
}

async fn rules(args: RulesArgs, server: &str) -> Result<(), CliError> {
    let client = ServiceClient::new(server)?;
    let rules = client.list_rules(args.limit).await?;

    if rules.is_empty() {
        println!("{}", "No rules stored on the server.".yellow());
        return Ok(());
    }

    for rule in &rules {
        let title = rule["title"].as_str().unwrap_or("(untitled)");
        let jurisdiction = rule["jurisdiction"].as_str().unwrap_or("?");
        let version = rule["version"].as_i64().unwrap_or(1);
        println!(
            "• {} {} v{version}",
            title.bold(),
            format!("[{jurisdiction}]").cyan()
        );
    }
    Ok(())
}

fn check(args: CheckArgs) -> Result<(), CliError> {
    let profile = load_profile(&args.profile)?;
    match profile.validate() {
        Ok(()) => {
            println!("{} profile is valid", "✔".green().bold());
            Ok(())
        }
        Err(err) => {
            print_violations(&err.violations);
            Err(CliError::Validation("profile failed validation".into()))
        }
    }
}

fn load_profile(path: &Path) -> Result<BusinessProfile, CliError> {
    let raw = fs::read_to_string(path)
        .map_err(|err| CliError::Io(format!("{}: {err}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|err| CliError::Validation(format!("invalid profile JSON: {err}")))
}

fn print_violations(violations: &[ProfileViolation]) {
    println!("{} {} violation(s):", "✘".red().bold(), violations.len());
    for violation in violations {
        println!("  {}: {}", violation.field.bold(), violation.message);
    }
}

fn print_report(report: &EvaluationReport, replayed: bool) {
    if replayed {
        println!("{}", "(replayed stored result)".dimmed());
    }

    if report.hits.is_empty() {
        println!("{}", "No obligations matched this profile.".yellow());
        return;
    }

    println!(
        "{} {} rule(s) matched, {} obligation(s)",
        "✔".green().bold(),
        report.hits.len(),
        report.obligations.len()
    );
    println!();
    println!("{}", "Rules hit:".bold());
    for hit in &report.hits {
        println!("  {} {}", hit.rule_id.cyan(), hit.title);
    }
    println!();
    println!("{}", "Obligations:".bold());
    for obligation in &report.obligations {
        println!("  • {}", obligation.action.bold());
        if !obligation.description.is_empty() {
            println!("    {}", obligation.description);
        }
        println!("    {}", obligation.rule_id.dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write file");
        path
    }

    fn sample_profile_json() -> serde_json::Value {
        json!({
            "as_of_date": "2025-01-15",
            "entity": { "legal_form": "llc" },
            "industry": { "naics_codes": ["722511"] },
            "locations": { "primary": { "country": "US", "state": "IL" } },
            "size": { "employee_count_total": 12 }
        })
    }

    #[test]
    fn loads_a_profile_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "profile.json", &sample_profile_json().to_string());

        let profile = load_profile(&path).expect("load profile");
        assert_eq!(profile.size.employee_count_total, 12);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_profile_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "broken.json", "{ nope");
        assert!(matches!(load_profile(&path), Err(CliError::Validation(_))));
    }

    #[test]
    fn evaluates_locally_against_rule_packs() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(
            &dir,
            "10_rules.json",
            &json!({ "rules": [{
                "title": "Ten Or More",
                "jurisdiction": "federal",
                "condition": { "var": "derived.thresholds.gte_10" },
                "obligations": [{ "action": "Keep records", "description": "" }]
            }] })
            .to_string(),
        );

        let profile: BusinessProfile =
            serde_json::from_value(sample_profile_json()).expect("profile");

        let report = evaluate_locally(&profile, dir.path()).expect("evaluate");
        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[0].rule_id, "federal:general:ten_or_more");
        assert_eq!(report.obligations[0].action, "Keep records");
    }
}
