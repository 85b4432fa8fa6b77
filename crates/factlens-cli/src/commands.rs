//! Subcommand handlers.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::Local;
use factlens_ai::{
    ConsensusEngine, EvidenceGatherer, ModelCatalog, Pipeline, RatingKeywords, TemporalDetector,
    TemporalRule,
};
use factlens_client::{ApiClient, GoogleFactCheck, MultiFactCheck};
use factlens_core::{
    AnalysisError, AnalysisRequest, CancelFlag, ConsensusPolicy, FileInput, ModelService,
    load_json,
};
use factlens_store::SessionStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::cli::GlobalOpts;
use crate::display;

const RECENT_ENTRIES: usize = 10;

pub fn api_client(opts: &GlobalOpts) -> anyhow::Result<ApiClient> {
    ApiClient::new(&opts.client_config()).context("building HTTP client")
}

fn rating_keywords(opts: &GlobalOpts) -> anyhow::Result<RatingKeywords> {
    match &opts.keywords {
        Some(path) => load_json(path).context("loading rating keywords"),
        None => Ok(RatingKeywords::default()),
    }
}

/// Pipeline over the remote service with policy, rules and keywords from
/// the configured files.
pub fn build_pipeline(opts: &GlobalOpts) -> anyhow::Result<Pipeline<ApiClient>> {
    let client = api_client(opts)?;

    let policy: ConsensusPolicy = match &opts.policy {
        Some(path) => load_json(path).context("loading consensus policy")?,
        None => ConsensusPolicy::default(),
    };
    let temporal = match &opts.rules {
        Some(path) => {
            let rules: Vec<TemporalRule> = load_json(path).context("loading temporal rules")?;
            TemporalDetector::new(rules).context("compiling temporal rules")?
        }
        None => TemporalDetector::default(),
    };
    info!(rules = temporal.rule_count(), "temporal detector ready");

    let engine = ConsensusEngine::new(policy, rating_keywords(opts)?);
    let mut pipeline = Pipeline::new(client.clone(), opts.pipeline_config())
        .with_temporal(temporal)
        .with_engine(engine);
    if !opts.no_fact_check {
        pipeline = pipeline
            .with_provider(GoogleFactCheck::new(client.clone()))
            .with_provider(MultiFactCheck::new(client));
    }
    Ok(pipeline)
}

fn file_request(path: &Path) -> anyhow::Result<AnalysisRequest> {
    let file = FileInput::from_path(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(AnalysisRequest::detect("", Some(file))?)
}

/// Run one request, record it on success and print the outcome.
async fn analyze_one<S: ModelService>(
    pipeline: &Pipeline<S>,
    store: &mut SessionStore,
    request: &AnalysisRequest,
    cancel: &CancelFlag,
    json: bool,
) -> Result<(), AnalysisError> {
    let result = pipeline.run(request, cancel).await?;
    store.record(request, &result, Local::now());

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(s) => println!("{s}"),
            Err(e) => warn!(error = %e, "cannot serialise result"),
        }
    } else {
        println!("{}", display::verdict_card(request, &result));
    }
    Ok(())
}

fn print_dashboard(store: &SessionStore) {
    let recent: Vec<_> = store.recent(RECENT_ENTRIES).collect();
    println!("{}", display::dashboard(&store.stats(Local::now().date_naive()), &recent));
}

pub async fn analyze(
    opts: &GlobalOpts,
    inputs: &[String],
    files: &[PathBuf],
    json: bool,
    stats: bool,
) -> anyhow::Result<()> {
    if inputs.is_empty() && files.is_empty() {
        bail!("nothing to analyze: pass text, a URL or --file");
    }

    let pipeline = build_pipeline(opts)?;
    let mut store = SessionStore::new();
    let cancel = CancelFlag::new();
    let mut failures = 0usize;

    let mut requests = Vec::with_capacity(inputs.len() + files.len());
    for input in inputs {
        requests.push(AnalysisRequest::detect(input, None).map_err(anyhow::Error::from));
    }
    for path in files {
        requests.push(file_request(path));
    }

    for request in requests {
        let outcome = match request {
            Ok(request) => analyze_one(&pipeline, &mut store, &request, &cancel, json)
                .await
                .map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };
        if let Err(e) = outcome {
            eprintln!("error: {e:#}");
            failures += 1;
        }
    }

    if stats {
        print_dashboard(&store);
    }
    if failures > 0 {
        bail!("{failures} of {} analyses failed", inputs.len() + files.len());
    }
    Ok(())
}

/// Wait for Ctrl-C and raise the cancel flag.
async fn cancel_on_ctrl_c(cancel: CancelFlag) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received, cancelling after the current model");
        cancel.cancel();
    }
}

pub async fn session(opts: &GlobalOpts, json: bool) -> anyhow::Result<()> {
    let pipeline = build_pipeline(opts)?;
    let mut store = SessionStore::new();
    let cancel = CancelFlag::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("One text or URL per line; Ctrl-C cancels, Ctrl-D ends the session.");
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let request = match AnalysisRequest::detect(&line, None) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };

        cancel.reset();
        let watcher = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
        let outcome = analyze_one(&pipeline, &mut store, &request, &cancel, json).await;
        watcher.abort();

        match outcome {
            Ok(()) => {}
            Err(AnalysisError::UserCancelled) => eprintln!("cancelled"),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    print_dashboard(&store);
    Ok(())
}

pub async fn models(opts: &GlobalOpts) -> anyhow::Result<()> {
    let client = api_client(opts)?;
    let models = client.available_models().await.context("listing models")?;
    let current = match client.current_model().await {
        Ok(c) => Some(c.current_model),
        Err(e) => {
            warn!(error = %e, "cannot fetch current model");
            None
        }
    };
    print!("{}", display::models_table(&models, current.as_deref()));
    Ok(())
}

pub async fn current_model(opts: &GlobalOpts) -> anyhow::Result<()> {
    let current = api_client(opts)?
        .current_model()
        .await
        .context("fetching current model")?;
    println!("{}", current.current_model);
    Ok(())
}

pub async fn use_model(opts: &GlobalOpts, model_id: &str) -> anyhow::Result<()> {
    let client = api_client(opts)?;
    let mut catalog = ModelCatalog::new(&client);
    catalog.list_models().await.context("listing models")?;
    catalog
        .set_active_model(model_id)
        .await
        .with_context(|| format!("activating {model_id}"))?;
    println!("active model: {model_id}");
    Ok(())
}

pub async fn fact_check(opts: &GlobalOpts, text: &str, url: Option<&str>) -> anyhow::Result<()> {
    let keywords = rating_keywords(opts)?;
    let client = api_client(opts)?;
    let gatherer = EvidenceGatherer::new(opts.pipeline_config().fact_check_timeout)
        .with_provider(GoogleFactCheck::new(client.clone()))
        .with_provider(MultiFactCheck::new(client));
    let claims = gatherer.gather(text, url).await;
    if claims.is_empty() {
        println!("No fact-checks found.");
    } else {
        println!("Fact-checks ({})", claims.len());
        print!("{}", display::claim_lines(&claims, Some(&keywords)));
    }
    Ok(())
}

pub async fn health(opts: &GlobalOpts) -> anyhow::Result<()> {
    let client = api_client(opts)?;
    println!("Service health at {}", client.base_url());

    let checks = [
        ("api", client.health().await),
        ("database", client.database_health().await),
        ("ai-model", client.ai_model_health().await),
        ("web-extractor", client.web_extractor_health().await),
    ];
    let mut all_ok = true;
    for (name, outcome) in &checks {
        all_ok &= matches!(outcome, Ok(r) if r.is_healthy());
        print!(
            "{}",
            display::health_row(name, outcome.as_ref().map_err(|e| e.to_string()))
        );
    }

    match client.verification_layers().await {
        Ok(layers) => print!("{}", display::verification_layers(&layers)),
        Err(e) => print!("{}", display::health_row("verification", Err(e.to_string()))),
    }

    match client.fact_check_status().await {
        Ok(status) => {
            println!("Fact-check providers");
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Err(e) => print!("{}", display::health_row("fact-check", Err(e.to_string()))),
    }

    if !all_ok {
        bail!("one or more components are unhealthy");
    }
    Ok(())
}

pub async fn ping(opts: &GlobalOpts) -> anyhow::Result<()> {
    let report = api_client(opts)?.test_connectivity().await;
    print!("{}", display::connectivity(&report));
    if !report.all_ok() {
        bail!("connectivity test failed");
    }
    Ok(())
}

pub async fn register(opts: &GlobalOpts, email: &str, password: &str) -> anyhow::Result<()> {
    let user = api_client(opts)?
        .register(email, password)
        .await
        .context("registering user")?;
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

pub async fn login(opts: &GlobalOpts, email: &str, password: &str) -> anyhow::Result<()> {
    let token = api_client(opts)?
        .login(email, password)
        .await
        .context("logging in")?;
    println!("{}", token.access_token);
    eprintln!("export FACTLENS_TOKEN=<token> to authenticate later commands");
    Ok(())
}

pub async fn metrics(opts: &GlobalOpts, days: Option<u32>) -> anyhow::Result<()> {
    let client = api_client(opts)?;
    let summary = client.metrics_summary().await.context("fetching metrics summary")?;
    println!("Summary");
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let series = client
        .metrics_timeseries(days)
        .await
        .context("fetching metrics timeseries")?;
    println!("Timeseries");
    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}
