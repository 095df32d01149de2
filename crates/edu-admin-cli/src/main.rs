// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use edu_admin_config::{
	load_config, load_config_from_file, AdminConfig, CliOverrides, LogLevel, LoggingConfig,
	RetrySettings,
};
use edu_common_http::RetryConfig;
use edu_policy::{BearerToken, HttpPolicySource, PolicySnapshot, PolicyStore, StoreConfig};
use edu_policy_core::{route_access, AccountType, Action, PolicyDocument, Route, Scope, ScopeMatch};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Inspect the policies the education admin API grants to a token
#[derive(Parser, Debug)]
#[command(name = "edu-admin", version, about, long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	/// Admin API base URL (overrides config)
	#[arg(long, global = true)]
	base_url: Option<String>,

	/// Bearer token (or set EDU_ADMIN_TOKEN)
	#[arg(long, env = "EDU_ADMIN_TOKEN", hide_env_values = true, global = true)]
	token: Option<String>,

	/// Log level (overrides config)
	#[arg(short, long, global = true)]
	log_level: Option<String>,

	/// Output logs as JSON
	#[arg(long, global = true)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the granted scopes for every action
	Policies {
		/// Output raw JSON
		#[arg(long)]
		json: bool,
	},
	/// Check whether the token may perform an action under the given scopes
	Check {
		/// Action such as `course:write`
		action: Action,
		/// Acceptable scopes, e.g. `admin organization`
		#[arg(required = true)]
		scopes: Vec<Scope>,
		/// Require every scope instead of any one of them
		#[arg(long)]
		all: bool,
	},
	/// Show which navigation entries are visible and editable
	Nav {
		/// Account type of the signed-in principal
		#[arg(long, default_value = "user")]
		account_type: AccountType,
	},
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		Self {
			base_url: args.base_url.clone(),
			token: args.token.clone(),
			log_level: args.log_level.clone(),
		}
	}
}

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

fn init_tracing(logging: &LoggingConfig, json: bool) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(log_level_to_tracing(logging.level).to_string()));

	if json {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().with_writer(std::io::stderr))
			.init();
	}
}

fn retry_config(settings: &RetrySettings) -> RetryConfig {
	RetryConfig {
		max_attempts: settings.max_attempts,
		base_delay: settings.base_delay,
		max_delay: settings.max_delay,
		..RetryConfig::default()
	}
}

async fn build_store(config: &AdminConfig) -> Result<PolicyStore<HttpPolicySource>> {
	let token = config
		.api
		.token
		.as_ref()
		.ok_or_else(|| anyhow!("no API token: pass --token or set EDU_ADMIN_TOKEN"))?;

	let source = HttpPolicySource::builder()
		.base_url(&config.api.base_url)
		.request_timeout(config.api.request_timeout)
		.retry_config(retry_config(&config.retry))
		.build()
		.context("failed to build policy client")?;

	let store = PolicyStore::with_config(
		source,
		StoreConfig {
			stale_time: config.policies.stale_time,
		},
	);
	store.login(BearerToken::new(token.expose())).await;
	Ok(store)
}

fn render_policies(document: &PolicyDocument) -> String {
	if document.is_empty() {
		return "no actions granted\n".to_string();
	}

	let width = document
		.iter()
		.map(|(action, _)| action.as_str().len())
		.max()
		.unwrap_or(0);

	let mut out = String::new();
	for (action, grant) in document.iter() {
		let scopes: Vec<&str> = grant.scopes.iter().map(Scope::as_str).collect();
		let _ = writeln!(out, "{:<width$}  {}", action.as_str(), scopes.join(", "));
	}
	out
}

fn render_nav(document: Option<&PolicyDocument>, account_type: AccountType) -> String {
	let mut out = String::new();
	for route in Route::ALL {
		let access = route_access(*route, document, account_type);
		let _ = writeln!(
			out,
			"{:<16} {:<10} {}",
			route.path(),
			access.to_string(),
			route.label()
		);
	}
	out
}

fn check_scopes(snapshot: &PolicySnapshot, action: Action, scopes: &[Scope], all: bool) -> bool {
	let mode = if all { ScopeMatch::All } else { ScopeMatch::Any };
	snapshot.allows(action, scopes, mode)
}

async fn run(args: Args) -> Result<ExitCode> {
	let overrides = CliOverrides::from(&args);
	let config = match &args.config {
		Some(path) => load_config_from_file(path.clone(), overrides),
		None => load_config(overrides),
	}
	.context("failed to load configuration")?;

	init_tracing(&config.logging, args.json_logs);
	info!(base_url = %config.api.base_url, "starting edu-admin");

	let store = build_store(&config).await?;
	let snapshot = store.policies(true).await;
	if let PolicySnapshot::Failed { reason } = &snapshot {
		warn!(%reason, "could not load policies, all checks will be denied");
	}

	match args.command {
		Command::Policies { json } => {
			let document = match &snapshot {
				PolicySnapshot::Ready { document, .. } => document,
				PolicySnapshot::Failed { reason } => bail!("failed to fetch policies: {reason}"),
				PolicySnapshot::Idle | PolicySnapshot::Pending => {
					bail!("policies are not available")
				}
			};
			if json {
				println!("{}", serde_json::to_string_pretty(document.as_ref())?);
			} else {
				print!("{}", render_policies(document));
			}
			Ok(ExitCode::SUCCESS)
		}
		Command::Check {
			action,
			scopes,
			all,
		} => {
			if check_scopes(&snapshot, action, &scopes, all) {
				println!("allowed");
				Ok(ExitCode::SUCCESS)
			} else {
				println!("denied");
				Ok(ExitCode::from(1))
			}
		}
		Command::Nav { account_type } => {
			print!("{}", render_nav(snapshot.document(), account_type));
			Ok(ExitCode::SUCCESS)
		}
	}
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
	let args = Args::parse();
	run(args).await
}
