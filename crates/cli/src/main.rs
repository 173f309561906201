use anyhow::Context;
use clap::{Parser, Subcommand};
use recipe_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "recipe", version, about = "Recipe API command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the merged OpenAPI document
    Openapi {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().with_context(|| "failed to load recipe-api settings")?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            recipe_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "recipe CLI serving");
            recipe_api::run(settings).await
        }
        Command::Openapi { pretty } => {
            let registry = recipe_api::build_registry()?;
            let document = recipe_http::router::openapi_document(&registry);
            let rendered = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{rendered}");
            Ok(())
        }
    }
}
