//! GraphQL Request Binary
//!
//! Posts one operation to the configured endpoint and prints its data.
//!
//! Usage:
//!   gql-request '<query>' ['<variables-json>']
//!   GRAPHQL_ENDPOINT=https://api.example.com/graphql gql-request '{ viewer { login } }'

use anyhow::{bail, Result};
use graphql::{Error, GraphQLClient, Variables};
use graphql_request::bin_common::{
    init_tracing, load_client_config, load_config_from_env, parse_args, parse_variables,
    BinaryRunner, ConfigType, RunConfig,
};
use serde_json::Value;
use tracing::{error, info};

struct RequestApp {
    run_config: RunConfig,
    client: GraphQLClient,
    query: String,
    variables: Option<Variables>,
}

impl BinaryRunner for RequestApp {
    async fn run(&mut self) -> Result<()> {
        info!("Posting to {}", self.client.endpoint());

        match self
            .client
            .request::<Value>(&self.query, self.variables.clone())
            .await
        {
            Ok(data) => {
                println!("{}", serde_json::to_string_pretty(&data)?);
                Ok(())
            }
            Err(Error::Response(e)) => {
                error!("GraphQL request failed: {}", e.message());
                println!("{}", serde_json::to_string_pretty(&e.response.to_json())?);
                bail!("request failed with status {}", e.response.status)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = parse_args();
    let Some(query) = args.first().cloned() else {
        bail!("Usage: gql-request '<query>' ['<variables-json>']");
    };
    let variables = parse_variables(args.get(1).map(String::as_str))?;

    // Load config
    let config_path = load_config_from_env(ConfigType::Client);
    let config = load_client_config(&config_path)?;

    // Initialize logging
    init_tracing(&config.log_level);

    let mut app = RequestApp {
        run_config: RunConfig::new("gql-request", config_path),
        client: GraphQLClient::from_config(&config),
        query,
        variables,
    };

    app.execute().await
}
