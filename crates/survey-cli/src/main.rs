use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use survey_cli::commands::describe::{describe_file, group_file};
use survey_cli::commands::run::{config_from_arguments, run_pipeline};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("SURVEY_LOG", "error,survey=info"))
        .init();

    let matches = Command::new("survey")
        .version(clap::crate_version!())
        .author("Justin Sing <justincsing@gmail.com>")
        .about("\u{1F6A2} Survey CLI - Descriptive statistics and charts for the Titanic manifest")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run the full report: summary, charts and HTML report")
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON pipeline configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .help(
                            "Path to the manifest CSV/TSV. Overrides the data path \
                             specified in the configuration file.",
                        )
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .help(
                            "Directory charts and the report are written to. \
                             Overrides the directory specified in the configuration file.",
                        )
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .help("Chart output format: png, jpeg, webp, svg, pdf or html")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("bins")
                        .short('b')
                        .long("bins")
                        .help("Number of histogram bins")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("style")
                        .long("style")
                        .help("Chart style preset")
                        .value_parser(["default", "dark", "minimal"]),
                )
                .arg(
                    Arg::new("no_report")
                        .long("no-report")
                        .help("Skip the HTML report.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("describe")
                .about("Print descriptive statistics for a manifest")
                .arg(
                    Arg::new("data")
                        .help("Path to the manifest CSV/TSV")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the summary as JSON.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("group")
                .about("Print passenger counts grouped by one or more columns")
                .arg(
                    Arg::new("data")
                        .help("Path to the manifest CSV/TSV")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("by")
                        .long("by")
                        .help("Column to group by; repeat for a cross-product")
                        .required(true)
                        .action(ArgAction::Append)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("normalize")
                        .long("normalize")
                        .help("Show each row as percentages summing to 100.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("run", sub_m)) => handle_run(sub_m),
        Some(("describe", sub_m)) => handle_describe(sub_m),
        Some(("group", sub_m)) => handle_group(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_run(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    match config_path {
        Some(path) => log::info!("[Survey::Run] Using config: {:?}", path),
        None => log::info!("[Survey::Run] No config provided; using defaults."),
    }

    let config = config_from_arguments(config_path, matches)?;
    if config_path.is_none() {
        let default_json = serde_json::to_string_pretty(&config).unwrap_or_default();
        eprintln!("[Survey::Run] Effective config:\n{}", default_json);
    }

    match run_pipeline(&config) {
        Ok(outcome) => {
            eprintln!(
                "[Survey::Run] Wrote {} charts to {}",
                outcome.charts.len(),
                config.output_dir.display()
            );
            if let Some(report) = outcome.report {
                eprintln!("[Survey::Run] Report: {}", report.display());
            }
            Ok(())
        }
        Err(e) => {
            log::error!("Report run failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_describe(matches: &ArgMatches) -> Result<()> {
    let data: &PathBuf = matches
        .get_one("data")
        .ok_or_else(|| anyhow::anyhow!("missing data path"))?;
    let output = describe_file(data, matches.get_flag("json"))?;
    println!("{}", output);
    Ok(())
}

fn handle_group(matches: &ArgMatches) -> Result<()> {
    let data: &PathBuf = matches
        .get_one("data")
        .ok_or_else(|| anyhow::anyhow!("missing data path"))?;
    let keys: Vec<String> = matches
        .get_many::<String>("by")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let output = group_file(data, &keys, matches.get_flag("normalize"))?;
    println!("{}", output);
    Ok(())
}
