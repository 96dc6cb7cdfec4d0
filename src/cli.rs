//! Command line entry point.
//!
//! ```sh
//! owl2graph -o data/disciplines.owl -o data/fairsharing.owl -d var/graph.db
//! ```

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize;

use crate::{
    boot::{self, RunSummary},
    config::Config,
    logger,
    mapping::MappingReport,
    Result,
};

#[derive(Parser, Debug)]
#[command(name = "owl2graph", version, about, long_about = None)]
pub struct Cli {
    /// Ontology file to map. Repeat to map several, in the given order.
    #[arg(short = 'o', long = "ontology-path", required = true, value_parser = trimmed_path)]
    pub ontology_paths: Vec<PathBuf>,

    /// Directory of the graph store. Deleted and recreated on every run.
    #[arg(short = 'd', long = "db-path", value_parser = trimmed_path)]
    pub db_path: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Print the run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

fn trimmed_path(value: &str) -> std::result::Result<PathBuf, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("path must not be empty".to_string());
    }
    Ok(PathBuf::from(value))
}

/// Parses the command line and runs the mapping.
///
/// Exits with `1` on invalid arguments or a fatal error, `0` otherwise, even
/// when single ontologies were aborted.
pub async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // help and version requests print to stdout and are not failures
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };

    let json = cli.json;
    let printed = match run(cli).await {
        Ok(summary) if json => render_json(&summary).map(|text| println!("{text}")),
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(err) => Err(err),
    };

    match printed {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(err.msg = %err, err.detail = ?err, "mapping_run_failed");
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let _guard = logger::init(&config.logger)?;

    let db_path = cli.db_path.unwrap_or_else(|| config.database.path.clone());
    boot::run(&config, &cli.ontology_paths, &db_path).await
}

fn render_json(summary: &RunSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

fn print_summary(summary: &RunSummary) {
    for report in &summary.reports {
        println!("{}", render_report(report));
    }
    println!(
        "{} nodes, {} relationships",
        summary.nodes.to_string().bold(),
        summary.relationships.to_string().bold()
    );
}

fn render_report(report: &MappingReport) -> String {
    if report.is_committed() {
        format!(
            "{} {} [{}] {} classes, {} new nodes, {} isA, {} partOf",
            "✔".green(),
            report.source,
            report.category,
            report.stats.classes,
            report.stats.nodes_created,
            report.stats.is_a,
            report.stats.part_of,
        )
    } else {
        format!(
            "{} {} [{}] {}: {}",
            "✘".red(),
            report.source,
            report.category,
            report.state.to_string().red(),
            report.failure.as_deref().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::{render_json, Cli};
    use crate::{
        boot::RunSummary,
        mapping::{Category, MappingReport, MappingState, MappingStats},
    };

    #[test]
    fn ontology_paths_repeat_in_order() {
        let cli = Cli::try_parse_from([
            "owl2graph",
            "-o",
            " data/disciplines.owl ",
            "--ontology-path",
            "data/taxon.owl",
            "-d",
            "var/test.db",
        ])
        .expect("arguments");
        assert_eq!(
            cli.ontology_paths,
            vec![
                PathBuf::from("data/disciplines.owl"),
                PathBuf::from("data/taxon.owl")
            ]
        );
        assert_eq!(cli.db_path, Some(PathBuf::from("var/test.db")));
        assert_eq!(cli.config, None);
        assert!(!cli.json);
    }

    #[test]
    fn ontology_path_is_required() {
        let err = Cli::try_parse_from(["owl2graph", "-d", "var/test.db"]).expect_err("missing");
        assert!(err.use_stderr());
    }

    #[test]
    fn help_is_not_an_error() {
        let err = Cli::try_parse_from(["owl2graph", "--help"]).expect_err("help");
        assert!(!err.use_stderr());
    }

    #[test]
    fn json_summary_lists_each_report() {
        let summary = RunSummary {
            reports: vec![MappingReport {
                source: "data/ncbitaxon.owl".to_string(),
                category: Category::Species,
                state: MappingState::Committed,
                stats: MappingStats {
                    classes: 2,
                    nodes_created: 2,
                    is_a: 1,
                    part_of: 1,
                },
                failure: None,
            }],
            nodes: 3,
            relationships: 2,
        };

        let value: serde_json::Value =
            serde_json::from_str(&render_json(&summary).expect("json")).expect("valid json");
        assert_eq!(value["nodes"], 3);
        assert_eq!(value["reports"][0]["category"], "SPECIES");
        assert_eq!(value["reports"][0]["state"], "committed");
        assert_eq!(value["reports"][0]["stats"]["part_of"], 1);
        assert!(value["reports"][0]["failure"].is_null());
    }
}
