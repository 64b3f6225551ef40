use std::sync::Arc;

use analysis::AnalysisService;
use domain::DomainEvent;

use crate::ports_bundle::Ports;

/// Subscribes the event handlers onto `ports.publisher`. Works identically
/// whether the publisher dispatches in-process or a broker consumer is
/// replaying deliveries through the same handler registry.
pub fn wire(ports: &Ports, analysis: Arc<AnalysisService>) {
    let job_offer_applied = {
        let candidate_reader = ports.candidate_reader.clone();
        let job_offer_reader = ports.job_offer_reader.clone();
        let application_reader = ports.application_reader.clone();
        let embedding_model = ports.embedding_model.clone();
        let embeddings = ports.embeddings.clone();
        let prompts = ports.prompts.clone();

        let handler: bus::EventHandler = Arc::new(move |event: DomainEvent| {
            let candidate_reader = candidate_reader.clone();
            let job_offer_reader = job_offer_reader.clone();
            let application_reader = application_reader.clone();
            let embedding_model = embedding_model.clone();
            let embeddings = embeddings.clone();
            let prompts = prompts.clone();

            Box::pin(async move {
                if let DomainEvent::JobOfferApplied(e) = event {
                    subscribers::generate_candidate_embeddings(
                        e.candidate_id,
                        candidate_reader.as_ref(),
                        embedding_model.as_ref(),
                        embeddings.as_ref(),
                    )
                    .await;
                    subscribers::generate_job_offer_embeddings(
                        e.job_offer_id,
                        job_offer_reader.as_ref(),
                        embedding_model.as_ref(),
                        embeddings.as_ref(),
                    )
                    .await;
                    subscribers::generate_call_prompt(
                        e.application_id,
                        application_reader.as_ref(),
                        job_offer_reader.as_ref(),
                        candidate_reader.as_ref(),
                        prompts.as_ref(),
                    )
                    .await;
                }
                Ok(())
            })
        });
        handler
    };
    ports.publisher.subscribe(job_offer_applied);

    let call_finished: bus::EventHandler = {
        let analysis = analysis.clone();
        Arc::new(move |event: DomainEvent| {
            let analysis = analysis.clone();
            Box::pin(async move {
                if let DomainEvent::CallFinished(e) = event {
                    subscribers::handle_call_finished(e.application_id, e.call_id, analysis.as_ref()).await;
                }
                Ok(())
            })
        })
    };
    ports.publisher.subscribe(call_finished);
}
