//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use factlens_core::{ClientConfig, DEFAULT_API_URL, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "factlens")]
#[command(about = "Fake-news detection by multi-model consensus")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Base URL of the detection API
    #[arg(long, env = "FACTLENS_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Bearer token for authenticated endpoints
    #[arg(long, env = "FACTLENS_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Whole-request HTTP timeout, in seconds
    #[arg(long, env = "FACTLENS_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// Deadline for each model switch and each analyze call, in seconds
    #[arg(long, env = "FACTLENS_MODEL_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub model_timeout_secs: u64,

    /// Deadline for each fact-check provider, in seconds
    #[arg(long, env = "FACTLENS_FACT_CHECK_TIMEOUT_SECS", default_value_t = 15, global = true)]
    pub fact_check_timeout_secs: u64,

    /// JSON consensus policy overriding the built-in thresholds
    #[arg(long, env = "FACTLENS_POLICY", global = true)]
    pub policy: Option<PathBuf>,

    /// JSON temporal rule table replacing the built-in rules
    #[arg(long, env = "FACTLENS_RULES", global = true)]
    pub rules: Option<PathBuf>,

    /// JSON rating keyword table replacing the built-in keywords
    #[arg(long, env = "FACTLENS_KEYWORDS", global = true)]
    pub keywords: Option<PathBuf>,

    /// Skip fact-check providers during analysis
    #[arg(long, global = true)]
    pub no_fact_check: bool,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,
}

impl GlobalOpts {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            token: self.token.clone(),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            model_timeout: Duration::from_secs(self.model_timeout_secs),
            fact_check_timeout: Duration::from_secs(self.fact_check_timeout_secs),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze text, URLs or files with every available model
    Analyze {
        /// Text or URL; each argument is analyzed separately
        inputs: Vec<String>,

        /// File to analyze (repeatable)
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Print the session dashboard afterwards
        #[arg(long)]
        stats: bool,
    },

    /// Analyze one input per stdin line; Ctrl-C cancels the running analysis
    Session {
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the models offered by the service
    Models,

    /// Show the service's active model
    CurrentModel,

    /// Set the service's active model
    UseModel {
        /// Model id as listed by `factlens models`
        model_id: String,
    },

    /// Look a claim up with the fact-check providers
    FactCheck {
        text: String,

        /// Source URL of the claim
        #[arg(long)]
        url: Option<String>,
    },

    /// Report the health of every service component
    Health,

    /// Probe info, health and metrics endpoints with timings
    Ping,

    /// Register a user account
    Register {
        email: String,

        #[arg(long, env = "FACTLENS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in and print an access token
    Login {
        email: String,

        #[arg(long, env = "FACTLENS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the service's usage metrics
    Metrics {
        /// Days of timeseries history
        #[arg(long)]
        days: Option<u32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("factlens").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn analyze_inputs_and_files() {
        let cli = parse(&["analyze", "Piñera murió ayer", "example.cl/nota", "-f", "a.txt", "--json"]);
        match cli.command {
            Command::Analyze { inputs, files, json, stats } => {
                assert_eq!(inputs.len(), 2);
                assert_eq!(files, vec![PathBuf::from("a.txt")]);
                assert!(json);
                assert!(!stats);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = parse(&["models", "--api-url", "http://localhost:8000", "--model-timeout-secs", "5"]);
        assert_eq!(cli.global.api_url, "http://localhost:8000");
        assert_eq!(cli.global.pipeline_config().model_timeout, Duration::from_secs(5));
        assert!(matches!(cli.command, Command::Models));
    }

    #[test]
    fn login_takes_password_flag() {
        let cli = parse(&["login", "ana@example.cl", "--password", "s3cret"]);
        match cli.command {
            Command::Login { email, password } => {
                assert_eq!(email, "ana@example.cl");
                assert_eq!(password, "s3cret");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn use_model_requires_id() {
        assert!(Cli::try_parse_from(["factlens", "use-model"]).is_err());
    }
}
