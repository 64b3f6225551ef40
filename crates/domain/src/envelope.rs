use crate::error::ScreeningError;
use crate::events::DomainEvent;

/// Canonical on-wire envelope: `{ "type": "...", "payload": {...} }`.
///
/// `DomainEvent`'s serde representation already matches this shape (an
/// internally-tagged enum with `tag = "type", content = "payload"`), so
/// encode/decode here are thin, explicitly named operations rather than a
/// hand-rolled format — the point is the stable public seam and the
/// `invalid-envelope` error mapping, not a second serialization scheme.
pub fn encode(event: &DomainEvent) -> Result<String, ScreeningError> {
    serde_json::to_string(event).map_err(|e| ScreeningError::InvalidEnvelope(e.to_string()))
}

pub fn decode(body: &str) -> Result<DomainEvent, ScreeningError> {
    serde_json::from_str(body).map_err(|e| ScreeningError::InvalidEnvelope(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AnalysisCompleted, CallFinished, JobOfferApplied};
    use crate::ids::{AnalysisId, ApplicationId, CallId, CandidateId, JobOfferId};
    use chrono::Utc;

    #[test]
    fn round_trips_job_offer_applied() {
        let event: DomainEvent = JobOfferApplied {
            occurred_at: Utc::now(),
            candidate_id: CandidateId::new(),
            job_offer_id: JobOfferId::new(),
            application_id: ApplicationId::new(),
        }
        .into();

        let encoded = encode(&event).unwrap();
        assert_eq!(decode(&encoded).unwrap(), event);
    }

    #[test]
    fn round_trips_call_finished() {
        let event: DomainEvent = CallFinished {
            occurred_at: Utc::now(),
            application_id: ApplicationId::new(),
            call_id: CallId::new(),
        }
        .into();

        let encoded = encode(&event).unwrap();
        assert_eq!(decode(&encoded).unwrap(), event);
    }

    #[test]
    fn round_trips_analysis_completed() {
        let event: DomainEvent = AnalysisCompleted {
            occurred_at: Utc::now(),
            application_id: ApplicationId::new(),
            analysis_id: AnalysisId::new(),
        }
        .into();

        let encoded = encode(&event).unwrap();
        assert_eq!(decode(&encoded).unwrap(), event);
    }

    #[test]
    fn unknown_type_is_invalid_envelope() {
        let err = decode(r#"{"type":"NotARealEvent","payload":{}}"#).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidEnvelope(_)));
    }

    #[quickcheck_macros::quickcheck]
    fn prop_round_trip_job_offer_applied(seed: u64) -> bool {
        // Vary only what's observable through the public constructors;
        // ids are random by construction so the seed just forces distinct
        // runs rather than driving the values directly.
        let _ = seed;
        let event: DomainEvent = JobOfferApplied {
            occurred_at: Utc::now(),
            candidate_id: CandidateId::new(),
            job_offer_id: JobOfferId::new(),
            application_id: ApplicationId::new(),
        }
        .into();
        decode(&encode(&event).unwrap()).unwrap() == event
    }
}
