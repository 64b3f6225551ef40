mod config;
mod ports_bundle;
mod subscriptions;

pub use config::ContextConfig;
pub use ports_bundle::Ports;

use std::sync::Arc;

use analysis::AnalysisService;
use applications::ApplicationService;
use bus::{BrokerPublisher, InMemoryPublisher, ReliablePublisher};
use calls::CallService;
use dialog::DialogConfig;
use domain::{Result, ScreeningError};
use outbox::{InMemoryOutboxStore, PostgresOutboxStore};
use ports::{AnalysisReader, ApplicationReader, ChatModel, Transcriber};
use repos::{
    InMemoryAnalysisStore, InMemoryApplicationStore, InMemoryCallStore, InMemoryEmbeddingStore,
    InMemoryPromptRegistry, PostgresAnalysisStore, PostgresApplicationStore, PostgresCallStore,
    PostgresEmbeddingStore,
};
use sqlx::postgres::PgPoolOptions;

fn fatal(e: impl std::fmt::Display) -> ScreeningError {
    ScreeningError::Fatal(e.to_string())
}

/// The finished wiring: the three application services plus the handful of
/// ports the HTTP/WebSocket layer reaches into directly (analysis lookup,
/// active-call gating, the model backends a streaming session drives).
pub struct AppContext {
    pub applications: Arc<ApplicationService>,
    pub calls: Arc<CallService>,
    pub analysis: Arc<AnalysisService>,
    pub analysis_reader: Arc<dyn AnalysisReader>,
    pub application_reader: Arc<dyn ApplicationReader>,
    pub transcriber: Arc<dyn Transcriber>,
    pub chat_model: Arc<dyn ChatModel>,
    pub dialog_config: DialogConfig,
}

impl AppContext {
    /// Builds the services from already-resolved ports and subscribes the
    /// event handlers. No I/O here — this is the testable half of the
    /// composition root; `build` is the half that resolves configuration
    /// into concrete adapters.
    pub fn assemble(ports: Ports, dialog_config: DialogConfig) -> Arc<Self> {
        let applications = Arc::new(ApplicationService::new(
            ports.application_reader.clone(),
            ports.application_writer.clone(),
            ports.bios.clone(),
            ports.opportunities.clone(),
            ports.publisher.clone(),
        ));

        let calls =
            Arc::new(CallService::new(ports.call_writer.clone(), ports.prompts.clone(), ports.publisher.clone()));

        let analysis = Arc::new(AnalysisService::new(
            ports.application_reader.clone(),
            ports.call_reader.clone(),
            ports.candidate_reader.clone(),
            ports.job_offer_reader.clone(),
            ports.analysis_writer.clone(),
            Some(ports.embeddings.clone()),
            ports.publisher.clone(),
        ));

        subscriptions::wire(&ports, analysis.clone());

        Arc::new(Self {
            applications,
            calls,
            analysis,
            analysis_reader: ports.analysis_reader,
            application_reader: ports.application_reader,
            transcriber: ports.transcriber,
            chat_model: ports.chat_model,
            dialog_config,
        })
    }

    /// Resolves a `ContextConfig` into concrete adapters and assembles the
    /// context. `database_url`/`broker_url` absent selects the in-memory
    /// adapter for that concern.
    pub async fn build(config: ContextConfig) -> Result<Arc<Self>> {
        let bios = Arc::new(upstream::HttpBiosPort::new(
            config.upstream.bios_base_url.clone(),
            config.upstream.timeout(),
            config.upstream.upstream_retries,
        ));
        let opportunities = Arc::new(upstream::HttpOpportunitiesPort::new(
            config.upstream.opportunities_base_url.clone(),
            config.upstream.timeout(),
            config.upstream.upstream_retries,
        ));
        let embedding_model = Arc::new(models::HttpEmbeddingModel::new(
            config.models.embedding_base_url.clone(),
            config.models.embedding_model.clone(),
            config.models.embedding_timeout(),
        ));
        let chat_model: Arc<dyn ChatModel> = Arc::new(models::HttpChatModel::new(
            config.models.chat_base_url.clone(),
            config.models.chat_model.clone(),
            config.models.chat_timeout(),
        ));
        let transcriber: Arc<dyn Transcriber> = Arc::new(models::HttpTranscriber::new(
            config.models.transcriber_base_url.clone(),
            config.models.transcriber_timeout(),
        ));

        let (application_store_reader, application_store_writer, candidate_reader, job_offer_reader, call_reader, call_writer, analysis_reader, analysis_writer, embeddings) =
            match &config.database_url {
                Some(url) => {
                    let pool = PgPoolOptions::new().max_connections(10).connect(url).await.map_err(fatal)?;

                    let applications_store = Arc::new(PostgresApplicationStore::new(pool.clone()));
                    applications_store.migrate().await?;
                    let calls_store = Arc::new(PostgresCallStore::new(pool.clone()));
                    calls_store.migrate().await?;
                    let analysis_store = Arc::new(PostgresAnalysisStore::new(pool.clone()));
                    analysis_store.migrate().await?;
                    let embedding_store = Arc::new(PostgresEmbeddingStore::new(pool.clone()));
                    embedding_store.migrate().await?;

                    (
                        applications_store.clone() as Arc<dyn ApplicationReader>,
                        applications_store.clone() as Arc<dyn ports::ApplicationWriter>,
                        applications_store.clone() as Arc<dyn ports::CandidateReader>,
                        applications_store.clone() as Arc<dyn ports::JobOfferReader>,
                        calls_store.clone() as Arc<dyn ports::CallReader>,
                        calls_store.clone() as Arc<dyn ports::CallWriter>,
                        analysis_store.clone() as Arc<dyn AnalysisReader>,
                        analysis_store.clone() as Arc<dyn ports::AnalysisWriter>,
                        embedding_store as Arc<dyn ports::EmbeddingRepository>,
                    )
                }
                None => {
                    let applications_store = Arc::new(InMemoryApplicationStore::new());
                    let calls_store = Arc::new(InMemoryCallStore::new());
                    let analysis_store = Arc::new(InMemoryAnalysisStore::new());
                    let embedding_store = Arc::new(InMemoryEmbeddingStore::new());

                    (
                        applications_store.clone() as Arc<dyn ApplicationReader>,
                        applications_store.clone() as Arc<dyn ports::ApplicationWriter>,
                        applications_store.clone() as Arc<dyn ports::CandidateReader>,
                        applications_store.clone() as Arc<dyn ports::JobOfferReader>,
                        calls_store.clone() as Arc<dyn ports::CallReader>,
                        calls_store.clone() as Arc<dyn ports::CallWriter>,
                        analysis_store.clone() as Arc<dyn AnalysisReader>,
                        analysis_store.clone() as Arc<dyn ports::AnalysisWriter>,
                        embedding_store as Arc<dyn ports::EmbeddingRepository>,
                    )
                }
            };

        let prompts = Arc::new(InMemoryPromptRegistry::new()) as Arc<dyn ports::PromptRegistry>;

        let publisher: Arc<dyn bus::EventPublisher> = match &config.broker_url {
            Some(amqp_url) => {
                let broker = Arc::new(BrokerPublisher::new(amqp_url.clone()));
                let outbox: Arc<dyn outbox::OutboxStore> = match &config.database_url {
                    Some(url) => {
                        let pool = PgPoolOptions::new().max_connections(5).connect(url).await.map_err(fatal)?;
                        let store = Arc::new(PostgresOutboxStore::new(pool));
                        store.migrate().await.map_err(fatal)?;
                        store
                    }
                    None => Arc::new(InMemoryOutboxStore::new()),
                };

                let reliable = ReliablePublisher::new(broker.clone(), outbox.clone(), config.outbox_flush_interval());
                reliable.spawn_relay();

                let consumer_reliable = reliable.clone();
                let consumer = broker.consumer().with_bootstrap_drain(Arc::new(move || {
                    let reliable = consumer_reliable.clone();
                    Box::pin(async move {
                        reliable.drain_once(100).await;
                    })
                }));
                tokio::spawn(async move { consumer.run().await });

                reliable
            }
            None => Arc::new(InMemoryPublisher::new()),
        };

        let ports = Ports {
            application_reader: application_store_reader,
            application_writer: application_store_writer,
            candidate_reader,
            job_offer_reader,
            call_reader,
            call_writer,
            analysis_reader,
            analysis_writer,
            embeddings,
            prompts,
            bios,
            opportunities,
            embedding_model,
            chat_model,
            transcriber,
            publisher,
        };

        Ok(Self::assemble(ports, config.dialog.into()))
    }
}
