use anyhow::Result;
use clap::Parser;
use cnscribe::{self, cli::Cli, io};
use env_logger::{Builder, Env};
use log::info;
use rayon::{prelude::*, ThreadPoolBuilder};

fn main() -> Result<()> {
    // Initialize the logger. If the log level is not set via `RUST_LOG`, set it to 'info' by default
    Builder::from_env(Env::default().default_filter_or("info")).init();

    // parse command line and validate inputs where possible
    let config = Cli::parse();
    let prefix = config.get_output_prefix()?;
    let params = cnscribe::CallParams {
        threshold: config.threshold,
        focal_threshold: config.focal_threshold,
    };

    // read arm and gene tables, then consolidate segments into per-sample profiles
    let (mut profiles, karyotype, gene_table) =
        io::load_inputs(&config.segments, &config.arms, &config.genes, config.log2)?;

    ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build_global()?;
    let chunksize = profiles.len() / config.threads + 1;

    info!("Starting event calling");
    profiles.par_chunks_mut(chunksize).try_for_each(|profiles| {
        // Main work happens in this parallel iterator
        let tidx = rayon::current_thread_index().unwrap_or(0);
        cnscribe::run(profiles, &karyotype, &gene_table, &params, tidx)
    })?;
    info!("Finished event calling");

    io::output::write_gene_events(
        &profiles,
        &config.outdir.join(format!("{prefix}_cnv_gene.tsv")),
    )?;
    io::output::write_arm_events(
        &profiles,
        &config.outdir.join(format!("{prefix}_cnv_arm.tsv")),
    )?;
    io::output::write_ploidy(&profiles, &config.outdir.join(format!("{prefix}_ploidy.tsv")))?;

    Ok(())
}
