use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bus::EventPublisher;
use chrono::Utc;
use domain::events::CallFinished;
use domain::{
    ApplicationId, CallId, CallStatus, DomainEvent, Result, ScreeningCall, ScreeningError,
    TranscriptSegment,
};
use ports::{CallPrompt, CallWriter, PromptRegistry};

fn poisoned() -> ScreeningError {
    ScreeningError::Fatal("active-call registry mutex poisoned".into())
}

/// Maps an in-flight application to the call it's attached to. Mutated only
/// from the single dialog engine task handling that application, per the
/// concurrency model — the mutex exists for `Send + Sync`, not contention.
#[derive(Default)]
struct ActiveCallRegistry {
    calls: Mutex<HashMap<ApplicationId, CallId>>,
}

impl ActiveCallRegistry {
    fn contains(&self, application_id: ApplicationId) -> Result<bool> {
        Ok(self.calls.lock().map_err(|_| poisoned())?.contains_key(&application_id))
    }

    fn register(&self, application_id: ApplicationId, call_id: CallId) -> Result<()> {
        self.calls.lock().map_err(|_| poisoned())?.insert(application_id, call_id);
        Ok(())
    }

    fn unregister(&self, application_id: ApplicationId) -> Result<()> {
        self.calls.lock().map_err(|_| poisoned())?.remove(&application_id);
        Ok(())
    }
}

/// Owns the active-call registry and the call record lifecycle. `start_call`
/// and `end_call` bracket one dialog engine run; `is_application_in_call`
/// gates the websocket handshake against a duplicate session.
pub struct CallService {
    calls: Arc<dyn CallWriter>,
    prompts: Arc<dyn PromptRegistry>,
    publisher: Arc<dyn EventPublisher>,
    registry: ActiveCallRegistry,
}

impl CallService {
    pub fn new(
        calls: Arc<dyn CallWriter>,
        prompts: Arc<dyn PromptRegistry>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self { calls, prompts, publisher, registry: ActiveCallRegistry::default() }
    }

    pub fn is_application_in_call(&self, application_id: ApplicationId) -> Result<bool> {
        self.registry.contains(application_id)
    }

    pub fn register_active_call(&self, application_id: ApplicationId, call_id: CallId) -> Result<()> {
        self.registry.register(application_id, call_id)
    }

    pub fn unregister_active_call(&self, application_id: ApplicationId) -> Result<()> {
        self.registry.unregister(application_id)
    }

    pub async fn get_prompt_for_application(&self, application_id: ApplicationId) -> CallPrompt {
        self.prompts
            .get_prompt(application_id)
            .await
            .unwrap_or_else(CallPrompt::minimal_default)
    }

    /// Creates and persists an `in_progress` call record, then registers it
    /// as active. Callers must pair this with `end_call` exactly once.
    pub async fn start_call(&self, application_id: ApplicationId) -> Result<CallId> {
        let call = ScreeningCall {
            id: CallId::new(),
            application_id,
            status: CallStatus::InProgress,
            started_at: Utc::now(),
            ended_at: None,
            transcript: Vec::new(),
        };
        self.calls.save_call(&call).await?;
        self.registry.register(application_id, call.id)?;
        Ok(call.id)
    }

    /// Unregisters the active call, persists the final transcript, marks the
    /// call completed, and publishes `CallFinished`. Idempotent on the
    /// registry side: unregistering an already-absent entry is a no-op.
    pub async fn end_call(
        &self,
        application_id: ApplicationId,
        call_id: CallId,
        transcript: Vec<TranscriptSegment>,
    ) -> Result<()> {
        self.registry.unregister(application_id)?;
        self.calls.update_call_transcript(call_id, &transcript).await?;
        self.calls.mark_call_completed(call_id).await?;
        self.publisher
            .publish(DomainEvent::CallFinished(CallFinished {
                occurred_at: Utc::now(),
                application_id,
                call_id,
            }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use domain::Speaker;
    use repos::{InMemoryCallStore, InMemoryPromptRegistry};

    use super::*;

    struct CountingPublisher {
        published: AtomicUsize,
    }

    #[async_trait]
    impl EventPublisher for CountingPublisher {
        async fn publish(&self, _event: DomainEvent) -> Result<()> {
            self.published.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn subscribe(&self, _handler: bus::EventHandler) {}
    }

    fn service(publisher: Arc<dyn EventPublisher>) -> CallService {
        CallService::new(
            Arc::new(InMemoryCallStore::new()),
            Arc::new(InMemoryPromptRegistry::new()),
            publisher,
        )
    }

    #[tokio::test]
    async fn start_call_registers_it_as_active() {
        let service = service(Arc::new(CountingPublisher { published: AtomicUsize::new(0) }));
        let application_id = ApplicationId::new();

        assert!(!service.is_application_in_call(application_id).unwrap());
        let call_id = service.start_call(application_id).await.unwrap();
        assert!(service.is_application_in_call(application_id).unwrap());
        assert!(!call_id.to_string().is_empty());
    }

    #[tokio::test]
    async fn end_call_unregisters_and_publishes() {
        let publisher = Arc::new(CountingPublisher { published: AtomicUsize::new(0) });
        let service = service(publisher.clone());
        let application_id = ApplicationId::new();

        let call_id = service.start_call(application_id).await.unwrap();
        service
            .end_call(
                application_id,
                call_id,
                vec![TranscriptSegment { speaker: Speaker::Emma, text: "hi".into(), timestamp: 0.0 }],
            )
            .await
            .unwrap();

        assert!(!service.is_application_in_call(application_id).unwrap());
        assert_eq!(publisher.published.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_prompt_falls_back_to_default_when_none_prepared() {
        let service = service(Arc::new(CountingPublisher { published: AtomicUsize::new(0) }));
        let prompt = service.get_prompt_for_application(ApplicationId::new()).await;
        assert_eq!(
            prompt.prepared_questions.len(),
            CallPrompt::minimal_default().prepared_questions.len()
        );
    }
}
