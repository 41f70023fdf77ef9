use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use fe_tool::{
    EvalConfig, VisConfig, color_from_code, print_summary, run_evaluation, run_visualization,
    write_json_summary,
};
use tracing::{Level, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Evaluation,
    Visualization,
}

#[derive(Parser, Debug)]
#[command(name = "flow_eval")]
#[command(about = "Score or visualize optical-flow results against a dataset")]
struct Cli {
    /// Root directory holding one result sub-directory per case
    #[arg(long = "resultsDir", visible_alias = "results-dir")]
    results_dir: Option<PathBuf>,

    /// Root directory holding the ground truth, same sub-directory names
    #[arg(long = "datasetDir", visible_alias = "dataset-dir")]
    dataset_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Mode::Evaluation)]
    mode: Mode,

    /// Invert candidate masks when the foreground label looks swapped
    #[arg(
        long = "autoFlip",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "false"
    )]
    auto_flip: bool,

    /// Output sub-directory for visualization, inside each case directory
    #[arg(long = "visSubDir", default_value = "")]
    vis_sub_dir: String,

    /// Image background as decimal RRRGGGBBB
    #[arg(long = "bgColor")]
    bg_color: Option<u32>,

    /// Flow-map background as decimal RRRGGGBBB
    #[arg(long = "flbgColor")]
    flbg_color: Option<u32>,

    /// Number of accuracy thresholds (1%, 2%, ... of the image size)
    #[arg(long, default_value_t = 50)]
    thresholds: usize,

    /// Also write the evaluation summary as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    let (Some(results_dir), Some(dataset_dir)) = (cli.results_dir.clone(), cli.dataset_dir.clone())
    else {
        eprintln!("Please specify --resultsDir and --datasetDir.\n");
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    };

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    match run(&cli, results_dir, dataset_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, results_dir: PathBuf, dataset_dir: PathBuf) -> Result<()> {
    info!("results root: {}", results_dir.display());
    info!("dataset root: {}", dataset_dir.display());

    match cli.mode {
        Mode::Evaluation => {
            let cfg = EvalConfig {
                auto_flip: cli.auto_flip,
                num_thresholds: cli.thresholds,
                ..EvalConfig::default()
            };
            let summary = run_evaluation(&results_dir, &dataset_dir, &cfg)
                .with_context(|| format!("evaluating results in {}", results_dir.display()))?;
            print_summary(&summary.average);

            if let Some(path) = &cli.json {
                write_json_summary(path, &summary)
                    .with_context(|| format!("writing summary {}", path.display()))?;
            }
        }
        Mode::Visualization => {
            let defaults = VisConfig::default();
            let cfg = VisConfig {
                sub_dir: cli.vis_sub_dir.clone(),
                image_bg: cli.bg_color.map_or(defaults.image_bg, color_from_code),
                flow_bg: cli.flbg_color.map_or(defaults.flow_bg, color_from_code),
                auto_flip: cli.auto_flip,
            };
            let [r, g, b] = cfg.image_bg;
            info!("image background: (R:{r:03}, G:{g:03}, B:{b:03})");
            let [r, g, b] = cfg.flow_bg;
            info!("flow background: (R:{r:03}, G:{g:03}, B:{b:03})");
            info!("output sub-directory: {:?}", cfg.sub_dir);

            run_visualization(&results_dir, &dataset_dir, &cfg)
                .with_context(|| format!("visualizing results in {}", results_dir.display()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Mode};

    #[test]
    fn camel_case_flags_and_aliases() {
        let cli = Cli::try_parse_from([
            "flow_eval",
            "--resultsDir",
            "res",
            "--dataset-dir",
            "data",
            "--mode",
            "visualization",
            "--autoFlip",
            "1",
            "--bgColor",
            "255255000",
        ])
        .expect("valid arguments");

        assert_eq!(cli.results_dir.as_deref(), Some(std::path::Path::new("res")));
        assert_eq!(cli.dataset_dir.as_deref(), Some(std::path::Path::new("data")));
        assert_eq!(cli.mode, Mode::Visualization);
        assert!(cli.auto_flip);
        assert_eq!(cli.bg_color, Some(255_255_000));
        assert_eq!(cli.thresholds, 50);
    }

    #[test]
    fn directories_are_optional_at_parse_time() {
        let cli = Cli::try_parse_from(["flow_eval"]).expect("parses");
        assert!(cli.results_dir.is_none() && cli.dataset_dir.is_none());
        assert_eq!(cli.mode, Mode::Evaluation);
        assert!(!cli.auto_flip);
    }
}
