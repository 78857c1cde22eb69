/*!
Command line interface of Rumma. Evaluates a predicted morpheme analysis file against a gold
standard file and prints the scores, optionally persisting the label assignment and the
substituted predictions next to the prediction file.
*/
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use rumma::{evaluation_report_files, EvalConfigBuilder};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "rumma", version, about = "Evaluate a morpheme analysis against a gold standard")]
struct Cli {
    /// Gold standard analysis file
    #[arg(short, long)]
    gold: PathBuf,
    /// Predicted analysis file
    #[arg(short, long)]
    pred: PathBuf,
    /// Write the label assignment to <pred>.assignment
    #[arg(short = 'a', long)]
    save_assignment: bool,
    /// Write the substituted predictions to <pred>.result
    #[arg(short = 'r', long)]
    save_result: bool,
    /// Log the per-word contributions and the label assignment
    #[arg(short, long)]
    verbose: bool,
    /// Print the scores as a single precision<TAB>recall<TAB>fmeasure line
    #[arg(short = 's', long)]
    short: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut logger = Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();
    let config = EvalConfigBuilder::new()
        .save_assignment(cli.save_assignment)
        .save_result(cli.save_result)
        .verbose(cli.verbose)
        .terse(cli.short)
        .build();
    let report = match evaluation_report_files(&cli.gold, &cli.pred, &config) {
        Ok(report) => report,
        Err(computation_err) => {
            eprintln!("rumma: {}", computation_err);
            return ExitCode::FAILURE;
        }
    };
    if config.terse {
        println!("{}", report.scores.to_tsv());
    } else {
        println!();
        println!("RESULT:");
        println!("=======");
        println!("gold standard: {}", cli.gold.display());
        println!("prediction   : {}", cli.pred.display());
        println!("{}", report.scores);
    }
    ExitCode::SUCCESS
}
