//! GraphQL Subscribe Binary
//!
//! Streams subscription events from the configured endpoint to stdout until
//! the server completes the subscription or Ctrl+C cancels it.
//!
//! Usage:
//!   gql-subscribe '<subscription>' ['<variables-json>']

use anyhow::{bail, Result};
use futures::StreamExt;
use graphql::{GraphQLClient, Variables};
use graphql_request::bin_common::{
    init_tracing, load_client_config, load_config_from_env, parse_args, parse_variables,
    BinaryRunner, ConfigType, RunConfig,
};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// How long to wait for the server after cancelling
const CANCEL_GRACE: Duration = Duration::from_secs(5);

struct SubscribeApp {
    run_config: RunConfig,
    client: GraphQLClient,
    query: String,
    variables: Option<Variables>,
    received: usize,
    errors: usize,
}

impl BinaryRunner for SubscribeApp {
    async fn run(&mut self) -> Result<()> {
        info!("Subscribing at {}", self.client.endpoint());
        let mut stream = self
            .client
            .subscribe_stream(&self.query, self.variables.clone());

        loop {
            tokio::select! {
                item = stream.next() => match item {
                    Some(Ok(payload)) => {
                        self.received += 1;
                        println!("{}", payload);
                    }
                    Some(Err(e)) => {
                        self.errors += 1;
                        error!("Subscription error: {}", e);
                    }
                    None => {
                        info!("Subscription closed");
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal (Ctrl+C), cancelling subscription");
                    stream.cancel();
                    if timeout(CANCEL_GRACE, stream.handle().closed()).await.is_err() {
                        warn!("Server did not close the subscription within {:?}", CANCEL_GRACE);
                    }
                    break;
                }
            }
        }

        Ok(())
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }

    async fn execute(&mut self) -> Result<()> {
        self.print_banner();
        let result = self.run().await;
        let stats = format!("Received {} events, {} errors", self.received, self.errors);
        self.print_shutdown(Some(&stats));
        result
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = parse_args();
    let Some(query) = args.first().cloned() else {
        bail!("Usage: gql-subscribe '<subscription>' ['<variables-json>']");
    };
    let variables = parse_variables(args.get(1).map(String::as_str))?;

    // Load config
    let config_path = load_config_from_env(ConfigType::Client);
    let config = load_client_config(&config_path)?;

    // Initialize logging
    init_tracing(&config.log_level);

    let mut app = SubscribeApp {
        run_config: RunConfig::new("gql-subscribe", config_path),
        client: GraphQLClient::from_config(&config),
        query,
        variables,
        received: 0,
        errors: 0,
    };

    app.execute().await
}
