use clap::Parser;

use road_seg::cli::AppArgs;
use road_seg::run_app;

fn main() -> anyhow::Result<()> {
    let args = AppArgs::parse();
    run_app(args)
}
