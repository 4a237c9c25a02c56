use std::path::PathBuf;

use clap::Parser;

/// Command-line surface of the demo node.
#[derive(Debug, Parser)]
#[command(
    name = "gantry-demo",
    about = "Boots a gantry demo node: races to own the shared registry, seeds workload definitions once, then launches instances."
)]
pub struct Cli {
    /// Engine configuration to run: 'default' (co-located cache) or 'distributed'.
    pub mode: String,

    /// How many workload definitions to deploy if the registry is unseeded.
    /// Asked for on the console when omitted.
    #[arg(long, value_name = "N")]
    pub definitions: Option<u32>,

    /// How many workload instances to start. Asked for on the console when
    /// omitted.
    #[arg(long, value_name = "N")]
    pub instances: Option<u32>,

    /// Well-known address of the shared definition registry.
    #[arg(long, env = "GANTRY_REGISTRY_ADDR", default_value = "127.0.0.1:7315")]
    pub registry_addr: String,

    /// Replace the embedded workload template with a file on disk.
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,
}
