use std::env;
use std::process::ExitCode;

use docsim_cli::{collect_inputs, init_tracing, parse_args, USAGE};
use docsim_core::config::Config;
use docsim_core::Error;
use docsim_extract::FileExtractor;
use docsim_pipeline::SimilarityOrchestrator;
use tracing::info;

fn main() -> ExitCode {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let settings = match Config::load().map_err(|e| Error::InvalidConfig(e.to_string())).and_then(|c| c.settings()) {
        Ok(settings) => settings,
        Err(e) => return report(&e),
    };
    init_tracing(&settings.logging.filter);

    let inputs = collect_inputs(&args);
    if inputs.len() < 2 {
        return report(&Error::TooFewDocuments(inputs.len()));
    }
    info!(documents = inputs.len(), "comparing documents");

    let orchestrator = SimilarityOrchestrator::from_settings(&settings);
    info!(models = ?orchestrator.semantic().available_models(), "semantic models");
    let bundle = match orchestrator.run_files(&FileExtractor::default(), &inputs) {
        Ok(bundle) => bundle,
        Err(e) => return report(&e),
    };

    let json = if args.compact { serde_json::to_string(&bundle) } else { serde_json::to_string_pretty(&bundle) };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => report(&Error::internal("output", "Serialization", e)),
    }
}

fn report(err: &Error) -> ExitCode {
    eprintln!("Error: {err}");
    ExitCode::from(if err.is_client_error() { 2 } else { 1 })
}
