//! Command line / environment configuration.
//!
//! Every option can come from a flag or an environment variable. Secrets are
//! hidden from `--help` output and these structs do not implement `Debug`.

use clap::Args;
use relay_assign::{AssignmentPolicy, FallbackPolicy, DEFAULT_CAP};
use relay_core::{Roster, RosterError};
use relay_store::notion::{DEFAULT_API_URL, DEFAULT_API_VERSION};
use relay_store::{NotionConfig, NotionSchema, StatusKind};
use std::net::SocketAddr;
use std::time::Duration;

use crate::intake::AssignFailurePolicy;

/// Ticket database connection.
#[derive(Clone, Args)]
pub struct StoreArgs {
    /// Integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true, default_value = "")]
    pub notion_token: String,

    /// Ticket database id
    #[arg(long, env = "NOTION_DATABASE_ID", default_value = "")]
    pub database_id: String,

    /// API base URL
    #[arg(long, env = "NOTION_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// API version header
    #[arg(long, env = "NOTION_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Request timeout in seconds
    #[arg(long, env = "NOTION_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Name of the status property
    #[arg(long, env = "NOTION_STATUS_PROPERTY", default_value = "Status")]
    pub status_property: String,

    /// Type of the status property (status or select)
    #[arg(long, env = "NOTION_STATUS_KIND", default_value = "status")]
    pub status_kind: StatusKind,

    /// Status option that marks a ticket as finished
    #[arg(long, env = "NOTION_DONE_STATUS", default_value = "Done")]
    pub done_status: String,

    /// Name of the people property holding the owner
    #[arg(long, env = "NOTION_ASSIGNEE_PROPERTY", default_value = "Assignee")]
    pub assignee_property: String,
}

impl StoreArgs {
    /// Build the store client config.
    pub fn notion_config(&self) -> NotionConfig {
        let mut config = NotionConfig::new(self.notion_token.clone(), self.database_id.clone());
        config.api_url = self.api_url.clone();
        config.api_version = self.api_version.clone();
        config.timeout = Duration::from_secs(self.timeout_secs);
        config.schema = NotionSchema {
            status: self.status_property.clone(),
            status_kind: self.status_kind,
            done_status: self.done_status.clone(),
            assignee: self.assignee_property.clone(),
            ..NotionSchema::default()
        };
        config
    }
}

/// Roster and assignment policy.
#[derive(Debug, Clone, Args)]
pub struct AssignArgs {
    /// Owners in rotation order, as `id:Name,id:Name`
    #[arg(long, env = "RELAY_OWNERS", default_value = "")]
    pub owners: String,

    /// Open tickets an owner may hold before being skipped
    #[arg(long, env = "RELAY_OWNER_CAP", default_value_t = DEFAULT_CAP)]
    pub cap: usize,

    /// Who gets the ticket when everyone is at the cap (first or least-loaded)
    #[arg(long, env = "RELAY_FALLBACK", default_value = "first")]
    pub fallback: FallbackPolicy,
}

impl AssignArgs {
    /// Parse the roster, keeping configured order.
    pub fn roster(&self) -> Result<Roster, RosterError> {
        Roster::parse(&self.owners)
    }

    /// Assignment policy.
    pub fn policy(&self) -> AssignmentPolicy {
        AssignmentPolicy::new()
            .with_cap(self.cap)
            .with_fallback(self.fallback)
    }
}

/// HTTP server options.
#[derive(Clone, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "RELAY_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Shared secret required as a bearer token on /v1 routes
    #[arg(long, env = "RELAY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// What to do when the load query fails (reject or unassigned)
    #[arg(long, env = "RELAY_ON_ASSIGN_FAILURE", default_value = "reject")]
    pub on_assign_failure: AssignFailurePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        assign: AssignArgs,
        #[command(flatten)]
        serve: ServeArgs,
    }

    #[test]
    fn test_flags_build_configs() {
        let cli = TestCli::try_parse_from([
            "relay",
            "--notion-token",
            "secret",
            "--database-id",
            "db1",
            "--status-kind",
            "select",
            "--done-status",
            "Closed",
            "--owners",
            "u2:Ben,u1:Ana",
            "--cap",
            "3",
            "--fallback",
            "least-loaded",
            "--on-assign-failure",
            "unassigned",
        ])
        .unwrap();

        let notion = cli.store.notion_config();
        assert_eq!(notion.token, "secret");
        assert_eq!(notion.schema.status_kind, StatusKind::Select);
        assert_eq!(notion.schema.done_status, "Closed");
        assert_eq!(notion.schema.assignee, "Assignee");

        let roster = cli.assign.roster().unwrap();
        assert_eq!(roster.ids().collect::<Vec<_>>(), vec!["u2", "u1"]);
        let policy = cli.assign.policy();
        assert_eq!(policy.cap, 3);
        assert_eq!(policy.fallback, FallbackPolicy::LeastLoaded);

        assert_eq!(cli.serve.on_assign_failure, AssignFailurePolicy::Unassigned);
        assert!(cli.serve.api_key.is_none());
    }

    #[test]
    fn test_bad_fallback_is_rejected() {
        let result = TestCli::try_parse_from(["relay", "--fallback", "random"]);
        assert!(result.is_err());
    }
}
