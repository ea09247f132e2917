use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// JSON manifest listing the input file descriptors to process
    #[arg(short, long)]
    pub inputs: PathBuf,

    /// Destination directory for output files
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Workflow identifier recorded in the result envelope
    #[arg(long)]
    pub workflow_id: String,

    /// Optional path to config file (YAML)
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Recover every supported file-type family
    #[arg(long)]
    pub everything: bool,

    /// Recover the jpeg family
    #[arg(long)]
    pub jpg: bool,

    /// Number of worker threads
    #[arg(long, default_value_t = num_cpus::get())]
    pub workers: usize,

    /// Recovery timeout, in seconds (overrides config when set)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Override the recovery tool binary
    #[arg(long)]
    pub tool_binary: Option<String>,

    /// Keep per-input workspaces after the run instead of deleting them
    #[arg(long)]
    pub keep_workspaces: bool,

    /// Write the result envelope JSON to this file instead of stdout
    #[arg(long)]
    pub result: Option<PathBuf>,
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}

#[cfg(test)]
mod tests {
    use super::CliOptions;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        CliOptions::command().debug_assert();
    }
}
