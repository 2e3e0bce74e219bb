//! Runs one process role of the transit exchange.
//!
//! Usage:
//!
//! ```text
//! exchange_node <directory|exchange|agent>
//! ```
//!
//! Every role reads its settings from the environment (see
//! [`ExchangeSettings::from_env`]) and serves HTTP on `EXCHANGE_BIND_ADDR`
//! until interrupted.
//!
//! - `directory` keeps agent records in memory.
//! - `exchange` answers `/chat`. Without `DIRECTORY_URL` it hosts its own
//!   directory under `/directory`.
//! - `agent` serves the `trip_planning`, `service_alerts` and `stop_info`
//!   capabilities over live transit data, registers itself with
//!   `DIRECTORY_URL` when set and, with `AGENT_STREAM_ADDR`, also listens for
//!   multiplexed frames.

use std::sync::Arc;

use axum::Router;
use mockable::DefaultClock;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use transit_exchange::agent::adapters::{
    ServiceAlertsHandler, StopInfoHandler, TripPlanningHandler, serve_stream,
};
use transit_exchange::agent::services::HandlerRegistry;
use transit_exchange::completion::adapters::HttpCompletionProvider;
use transit_exchange::completion::ports::CompletionProvider;
use transit_exchange::config::{ConfigError, ExchangeSettings};
use transit_exchange::coordination::services::CoordinationOrchestrator;
use transit_exchange::directory::adapters::http::HttpDirectoryClient;
use transit_exchange::directory::adapters::memory::InMemoryDirectoryStore;
use transit_exchange::directory::domain::AgentId;
use transit_exchange::directory::ports::{AgentDirectory, DirectoryLookupError};
use transit_exchange::directory::services::{DirectoryService, RegisterAgentRequest};
use transit_exchange::exchange::services::ExchangeCore;
use transit_exchange::planner::adapters::MbtaDataProvider;
use transit_exchange::planner::ports::TransitDataProvider;
use transit_exchange::planner::services::{LocationExtractor, TripPlanner};
use transit_exchange::routing::services::{AgentDiscovery, CapabilityRouter, QueryClassifier};
use transit_exchange::server::{
    AgentSurface, agent_router, directory_router, exchange_router, serve,
};
use transit_exchange::telemetry::{TelemetryError, init_tracing};
use transit_exchange::transport::adapters::build_channel;
use transit_exchange::transport::domain::TransportKind;

type LocalDirectory = DirectoryService<InMemoryDirectoryStore, DefaultClock>;

/// Errors that stop a node.
#[derive(Debug, Error)]
enum NodeError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("directory client failed: {0}")]
    Directory(#[from] DirectoryLookupError),
    #[error("i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy)]
enum Role {
    Directory,
    Exchange,
    Agent,
}

impl Role {
    fn parse(arg: Option<&str>) -> Result<Self, NodeError> {
        match arg {
            Some("directory") => Ok(Self::Directory),
            Some("exchange") => Ok(Self::Exchange),
            Some("agent") => Ok(Self::Agent),
            Some(other) => Err(NodeError::InvalidArgs(format!(
                "unknown role '{other}'; expected directory, exchange, or agent"
            ))),
            None => Err(NodeError::InvalidArgs(
                "missing role; expected directory, exchange, or agent".to_owned(),
            )),
        }
    }
}

fn main() -> Result<(), NodeError> {
    let role = Role::parse(std::env::args().nth(1).as_deref())?;
    init_tracing()?;
    let settings = ExchangeSettings::from_env()?;
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(run(role, settings))
}

async fn run(role: Role, settings: ExchangeSettings) -> Result<(), NodeError> {
    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_interrupt(shutdown.clone()));

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(?role, transport = %settings.transport, "starting node");
    let router = match role {
        Role::Directory => directory_router(local_directory()),
        Role::Exchange => exchange_app(&settings).await?,
        Role::Agent => agent_app(&settings, &shutdown).await?,
    };
    serve(listener, router, shutdown).await?;
    tracing::info!("node stopped");
    Ok(())
}

async fn cancel_on_interrupt(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for interrupts");
        return;
    }
    shutdown.cancel();
}

fn local_directory() -> LocalDirectory {
    DirectoryService::new(
        Arc::new(InMemoryDirectoryStore::new()),
        Arc::new(DefaultClock),
    )
}

fn completion(settings: &ExchangeSettings) -> Option<Arc<dyn CompletionProvider>> {
    settings.completion.clone().map(|provider| {
        tracing::info!(provider = %provider.kind, model = %provider.model, "completion enabled");
        Arc::new(HttpCompletionProvider::new(provider)) as Arc<dyn CompletionProvider>
    })
}

async fn exchange_app(settings: &ExchangeSettings) -> Result<Router, NodeError> {
    let local = local_directory();
    let directory = settings.directory_url.as_deref().map_or_else(
        || -> Result<Arc<dyn AgentDirectory>, NodeError> { Ok(Arc::new(local.clone())) },
        |url| -> Result<Arc<dyn AgentDirectory>, NodeError> {
            Ok(Arc::new(HttpDirectoryClient::new(url)?))
        },
    )?;

    let channel = build_channel(settings.transport);
    let discovery = AgentDiscovery::new(Arc::clone(&directory));
    let router = CapabilityRouter::new(
        discovery.clone(),
        Arc::clone(&channel),
        settings.fast_timeout,
    );
    let orchestrator = CoordinationOrchestrator::new(
        discovery,
        channel,
        Arc::new(DefaultClock),
        settings.session_deadline,
    );
    let classifier = completion(settings).map_or_else(QueryClassifier::heuristic_only, |provider| {
        QueryClassifier::new(provider, settings.classifier)
    });

    let core = ExchangeCore::new(directory, classifier, router, orchestrator);
    let gate = core.initialize().await;
    tracing::info!(%gate, "startup validation finished");

    let app = exchange_router(core);
    if settings.directory_url.is_some() {
        return Ok(app);
    }
    Ok(app.nest("/directory", directory_router(local)))
}

async fn agent_app(
    settings: &ExchangeSettings,
    shutdown: &CancellationToken,
) -> Result<Router, NodeError> {
    let provider: Arc<dyn TransitDataProvider> = Arc::new(MbtaDataProvider::new(
        settings.transit.base_url.clone(),
        settings.transit.api_key.clone(),
    ));
    let extractor = completion(settings).map_or_else(LocationExtractor::basic, |provider| {
        LocationExtractor::new(provider, settings.classifier.timeout)
    });
    let planner = TripPlanner::new(Arc::clone(&provider), extractor);
    let registry = Arc::new(
        HandlerRegistry::new(settings.agent.id.clone())
            .with_handler(Arc::new(TripPlanningHandler::new(planner.clone())))
            .with_handler(Arc::new(ServiceAlertsHandler::new(Arc::clone(&provider))))
            .with_handler(Arc::new(StopInfoHandler::new(Arc::clone(&provider)))),
    );

    if let Some(addr) = settings.agent.stream_addr {
        let listener = TcpListener::bind(addr).await?;
        tokio::spawn(serve_stream(listener, Arc::clone(&registry), shutdown.clone()));
    }
    if let Some(url) = settings.directory_url.as_deref() {
        let client = HttpDirectoryClient::new(url)?;
        if let Err(err) = announce(&client, settings, &registry).await {
            tracing::warn!(error = %err, directory = url, "agent registration failed");
        }
    }

    Ok(agent_router(AgentSurface::new(registry, planner, provider)))
}

async fn announce(
    client: &HttpDirectoryClient,
    settings: &ExchangeSettings,
    registry: &HandlerRegistry,
) -> Result<(), NodeError> {
    let endpoint = advertised_endpoint(settings);
    let request = RegisterAgentRequest::new(
        settings.agent.id.clone(),
        registry.agent_name(),
        endpoint.clone(),
    )
    .with_capabilities(registry.capabilities().map(|tag| tag.as_str().to_owned()));
    client.register(&request).await?;
    let id = AgentId::new(settings.agent.id.clone())
        .map_err(|err| NodeError::InvalidArgs(err.to_string()))?;
    client.activate(&id).await?;
    tracing::info!(agent_id = %id, %endpoint, "agent registered and activated");
    Ok(())
}

fn advertised_endpoint(settings: &ExchangeSettings) -> String {
    if let Some(endpoint) = &settings.agent.endpoint {
        return endpoint.clone();
    }
    if let (TransportKind::Multiplexed, Some(addr)) = (settings.transport, settings.agent.stream_addr)
    {
        return format!("tcp://{addr}");
    }
    format!("http://{}", settings.bind_addr)
}
