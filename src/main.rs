use anyhow::{Context, Result};
use tracing::info;

use carvewrap::{cli, config, logging, manifest, pipeline, recovery, util};

fn main() -> Result<()> {
    logging::init_logging();

    let cli_opts = cli::parse();
    let mut loaded = config::load_config(cli_opts.config_path.as_deref())?;
    if let Some(timeout_secs) = cli_opts.timeout_secs {
        loaded.config.recovery_timeout_secs = timeout_secs;
    }
    if let Some(binary) = &cli_opts.tool_binary {
        loaded.config.tool_binary = binary.clone();
    }
    if cli_opts.keep_workspaces {
        loaded.config.keep_workspaces = true;
    }

    util::ensure_output_dir(&cli_opts.output)?;

    let inputs = manifest::load_manifest(&cli_opts.inputs)?;
    info!(
        "loaded {} input(s) from {}",
        inputs.len(),
        cli_opts.inputs.display()
    );

    let options = recovery::RecoveryOptions {
        everything: cli_opts.everything,
        jpg: cli_opts.jpg,
    };

    let result = pipeline::run_task(
        &loaded,
        inputs,
        &cli_opts.output,
        &cli_opts.workflow_id,
        options,
        cli_opts.workers,
    )?;

    let json = result.to_json().context("serializing result envelope")?;
    match &cli_opts.result {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing result envelope to {}", path.display()))?;
            info!("result envelope written to {}", path.display());
        }
        None => println!("{json}"),
    }

    info!("carvewrap run finished");
    Ok(())
}
