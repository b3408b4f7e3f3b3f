use anyhow::Context;
use clap::Parser;
use kibana_sample_data::{Client, load_sample_data, logger};

/// Asks a Kibana instance to install its "logs" sample data set.
#[derive(Debug, Parser)]
#[command(name = "load-sample-data", version)]
struct Cli {
    /// Base URL of the Kibana service
    #[arg(long, default_value = "http://localhost:5601")]
    url: String,

    /// Basic-auth user name
    #[arg(long, default_value = "elastic")]
    username: String,

    /// Basic-auth password
    #[arg(long, default_value = "default", hide_default_value = true)]
    password: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::debug!("loading sample data into {}", cli.url);

    let client = Client::new();
    load_sample_data(&client, &cli.url, &cli.username, &cli.password)
        .await
        .with_context(|| format!("sample data load against {} did not complete", cli.url))?;

    Ok(())
}
