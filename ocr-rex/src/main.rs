use clap::Parser;
use tracing_subscriber::EnvFilter;

use ocr_rex::{build_store, load_settings, shell, Args, World};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = args.apply(load_settings(args.config.as_deref())?);
    tracing::debug!(?settings, "starting");

    let world = World::live(&settings);
    let store = build_store(&world, &settings);

    if args.once {
        if !shell::run_once(&store, args.json).await? {
            std::process::exit(1);
        }
        return Ok(());
    }
    shell::run_interactive(store, args.json).await
}
