use std::{collections::BTreeSet, error::Error, path::PathBuf, process::ExitCode};

use clap::Parser;
use loop_sampling::{
    analyze_loop_behavior,
    core::event_data::case_centric::{io::FileLogSource, UnknownCasePolicy},
    full_pipeline, ImportOptions, LogSource, PipelineConfig,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Detect loop activities in a case log, sample cases and count follow relations
#[derive(Parser, Debug)]
#[command(name = "loop-sampling")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Case log (`.json`, `.json.gz` or `.csv`)
    log: PathBuf,

    /// Pipeline configuration (JSON)
    #[arg(long, env = "LOOP_SAMPLING_CONFIG")]
    config: Option<PathBuf>,

    /// Number of cases to sample
    #[arg(long)]
    sample_count: Option<usize>,

    /// Seed for sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Source activities for follow counting
    #[arg(long, value_delimiter = ',')]
    group1: Option<Vec<String>>,

    /// Target activities for follow counting
    #[arg(long, value_delimiter = ',')]
    group2: Option<Vec<String>>,

    /// Give every case without identifier its own surrogate identifier
    #[arg(long)]
    surrogate_unknown_cases: bool,

    /// Only print the sampled cases
    #[arg(long)]
    sample_only: bool,

    /// Render the loop successor graph to this file
    #[arg(long)]
    dfg_image: Option<PathBuf>,

    /// Render the indirect follow counts to this file
    #[arg(long)]
    indirect_image: Option<PathBuf>,
}

impl Cli {
    /// Configuration file (if any) overridden by command line flags
    fn pipeline_config(&self) -> Result<PipelineConfig, loop_sampling::PipelineError> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_path(path)?,
            None => PipelineConfig::default(),
        };
        if self.sample_count.is_some() {
            config.desired_sample_count = self.sample_count;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        let to_set = |g: &Vec<String>| g.iter().cloned().collect::<BTreeSet<_>>();
        if let Some(g) = &self.group1 {
            config.group1 = Some(to_set(g));
        }
        if let Some(g) = &self.group2 {
            config.group2 = Some(to_set(g));
        }
        Ok(config)
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("loop_sampling=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.pipeline_config()?;
    let mut rng = config.rng();
    let unknown_case_policy = if cli.surrogate_unknown_cases {
        UnknownCasePolicy::Surrogate
    } else {
        UnknownCasePolicy::Merge
    };
    let source = FileLogSource::new(&cli.log).with_options(ImportOptions {
        unknown_case_policy,
    });

    if cli.sample_only {
        let sample = full_pipeline(&source, None, config.desired_sample_count, &mut rng)?;
        println!("{}", serde_json::to_string_pretty(&sample)?);
        return Ok(());
    }

    let log = source.load_case_log()?;
    info!(cases = log.len(), path = %cli.log.display(), "Loaded case log");
    let analysis = analyze_loop_behavior(&log, &config, &mut rng);

    if let Some(path) = &cli.dfg_image {
        analysis.loop_dfg.export_image(path, &config.render)?;
        info!(path = %path.display(), "Rendered loop successor graph");
    }
    if let Some(path) = &cli.indirect_image {
        analysis
            .follow_counts
            .indirect_graph()
            .export_image(path, &config.render)?;
        info!(path = %path.display(), "Rendered indirect follow counts");
    }

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
