//! GraphQL Request - Main Library
//!
//! Re-exports the workspace libraries and the shared code of the command
//! line binaries.
//!
//! ## Architecture
//!
//! - **graphql**: Requests, subscriptions and the client facade (re-exported from workspace)
//! - **hypersockets**: Persistent connection transport (re-exported from workspace)
//! - **bin_common**: Common utilities for binary executables (CLI, logging, runners)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use graphql_request::bin_common::{load_config_from_env, ConfigType};
//! use graphql_request::graphql::GraphQLClient;
//! ```

// Re-export workspace libraries for convenience
pub use graphql;
pub use hypersockets;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod logging;
    pub mod runner;

    pub use cli::{load_config_from_env, parse_args, parse_variables, ConfigType};
    pub use logging::init_tracing;
    pub use runner::{load_client_config, BinaryRunner, RunConfig};
}
