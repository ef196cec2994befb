use clap::Parser;
use sensorplace_io::cli::{
    run_generate_command, run_place_command, run_sweep_command, Cli, Commands, PlaceArgs,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sensorplace=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Place {
            tree,
            budget,
            criterion,
            prior,
            method,
            delay,
            delay_param,
            seed,
            root,
            parallel,
            out,
        } => {
            run_place_command(PlaceArgs {
                tree,
                budget,
                criterion,
                prior,
                method,
                delay,
                delay_param,
                seed,
                root,
                parallel,
                out,
            })?;
        }
        Commands::Generate {
            nodes,
            kind,
            seed,
            out,
            prior_out,
            max_weight,
        } => {
            run_generate_command(nodes, kind, seed, out, prior_out, max_weight)?;
        }
        Commands::Sweep {
            tree,
            criterion,
            prior,
            out,
        } => {
            run_sweep_command(tree, criterion, prior, out)?;
        }
    }

    Ok(())
}
