use clap::{Parser, Subcommand};
use georisk_models::ImageSpec;
use georisk_packaging::{
    dockerfile, verify_missing_port_fails, verify_port_binding, AssembleOutcome, PackagingService,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "georisk-package")]
#[command(about = "Assemble and verify the GeoRisk runtime image")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Build context (the workspace root)
    #[arg(long, default_value = ".")]
    context: PathBuf,

    /// Image reference to build or verify
    #[arg(long, default_value = "georisk:latest")]
    tag: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage the context and build the runtime image
    Build,
    /// Print the rendered recipe without building anything
    PrintDockerfile,
    /// Check the startup contract of a built image
    Verify {
        /// Port to inject through the PORT environment variable
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Seconds to wait for the listener (and for the no-PORT exit)
        #[arg(long, default_value = "60")]
        window_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let spec = ImageSpec::for_workspace(&cli.context);

    match cli.command {
        Commands::Build => {
            let cache_dir = cli.context.join("target").join("image-cache");
            let mut service = PackagingService::new(cache_dir)?;
            match service.assemble(&spec, &cli.tag).await? {
                AssembleOutcome::Cached { image_ref } => {
                    info!("Inputs unchanged; image already built as {}", image_ref);
                }
                AssembleOutcome::Built { image_ref, digest } => {
                    info!("Built {} from context digest {}", image_ref, digest);
                }
            }
        }
        Commands::PrintDockerfile => {
            print!("{}", dockerfile::render(&spec));
        }
        Commands::Verify { port, window_secs } => {
            let window = Duration::from_secs(window_secs);
            verify_port_binding(&cli.tag, port, window).await?;
            info!("Port binding verified on PORT={}", port);
            verify_missing_port_fails(&cli.tag, window).await?;
            info!("Startup without PORT fails as required");
        }
    }

    Ok(())
}
