use domain::{Candidate, JobOffer, Speaker, TranscriptSegment};

const MAX_SKILLS: usize = 10;
const MAX_STRENGTHS_CHECKED: usize = 10;
const FALLBACK_CANDIDATE_SKILLS: usize = 5;

/// `candidate_text`: every transcript segment spoken by the candidate,
/// space-joined. Empty when the transcript has fewer than two segments —
/// a single segment is typically just the greeting with no answer yet.
fn candidate_text(transcript: &[TranscriptSegment]) -> String {
    if transcript.len() < 2 {
        return String::new();
    }
    transcript
        .iter()
        .filter(|seg| seg.speaker == Speaker::Candidate)
        .map(|seg| seg.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Skills derivation: when a job offer is known, keep its strengths that the
/// candidate actually talked about. If that yields nothing — no job offer,
/// or a job offer whose strengths the candidate never mentioned — fall back
/// to the candidate's declared skills.
pub fn derive_skills(
    transcript: &[TranscriptSegment],
    candidate: Option<&Candidate>,
    job_offer: Option<&JobOffer>,
) -> Vec<String> {
    let text = candidate_text(transcript).to_lowercase();

    let mut skills = match job_offer {
        Some(job_offer) => job_offer
            .strengths
            .iter()
            .take(MAX_STRENGTHS_CHECKED)
            .filter(|strength| text.contains(&strength.to_lowercase()))
            .cloned()
            .collect::<Vec<_>>(),
        None => Vec::new(),
    };

    if skills.is_empty()
        && let Some(candidate) = candidate
    {
        skills = candidate.skills.iter().take(FALLBACK_CANDIDATE_SKILLS).cloned().collect();
    }

    skills.into_iter().take(MAX_SKILLS).collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a * norm_b))
}

/// Maps cosine similarity in [-1, 1] to a 0-100 fit score.
pub fn score_from_embeddings(candidate_embedding: &[f32], job_offer_embedding: &[f32]) -> Option<i32> {
    let cos = cosine_similarity(candidate_embedding, job_offer_embedding)?;
    let score = ((cos + 1.0) / 2.0 * 100.0).round() as i32;
    Some(score.clamp(0, 100))
}

/// Rule-based fallback used when no usable embeddings are available: a base
/// score rewarded by how much transcript exists and how many skills were
/// recognized, capped at 100.
pub fn rule_based_score(transcript: &[TranscriptSegment], skills: &[String]) -> i32 {
    if transcript.len() < 2 || candidate_text(transcript).trim().is_empty() {
        return 0;
    }
    let score = 40 + 5 * transcript.len() as i32 + 10 * skills.len() as i32;
    score.min(100)
}

/// Computes `(fit_score, skills)` for one completed call. `embeddings`
/// holds `(candidate_embedding, job_offer_embedding)` when both are known
/// and non-empty; the caller is responsible for that lookup since it may
/// require a repository round trip.
pub fn score(
    transcript: &[TranscriptSegment],
    candidate: Option<&Candidate>,
    job_offer: Option<&JobOffer>,
    embeddings: Option<(&[f32], &[f32])>,
) -> (i32, Vec<String>) {
    let skills = derive_skills(transcript, candidate, job_offer);

    let fit_score = embeddings
        .and_then(|(c, j)| score_from_embeddings(c, j))
        .unwrap_or_else(|| rule_based_score(transcript, &skills));

    (fit_score, skills)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(speaker: Speaker, text: &str) -> TranscriptSegment {
        TranscriptSegment { speaker, text: text.to_string(), timestamp: 0.0 }
    }

    fn job_offer(strengths: Vec<&str>) -> JobOffer {
        JobOffer {
            id: domain::JobOfferId::new(),
            external_id: "job1".into(),
            objective: "Build things".into(),
            strengths: strengths.into_iter().map(String::from).collect(),
            responsibilities: vec![],
        }
    }

    fn candidate(skills: Vec<&str>) -> Candidate {
        Candidate {
            id: domain::CandidateId::new(),
            username: "jdoe".into(),
            full_name: "Jane Doe".into(),
            skills: skills.into_iter().map(String::from).collect(),
            jobs: vec![],
        }
    }

    #[test]
    fn skills_come_from_strengths_mentioned_by_the_candidate() {
        let transcript = vec![
            segment(Speaker::Emma, "Tell me about Rust."),
            segment(Speaker::Candidate, "I've used Rust and Python extensively."),
        ];
        let offer = job_offer(vec!["Rust", "Go", "Java"]);
        let skills = derive_skills(&transcript, None, Some(&offer));
        assert_eq!(skills, vec!["Rust".to_string()]);
    }

    #[test]
    fn skills_fall_back_to_candidate_profile_without_a_job_offer() {
        let transcript = vec![
            segment(Speaker::Emma, "Hi"),
            segment(Speaker::Candidate, "Hello"),
        ];
        let cand = candidate(vec!["Rust", "Go", "Java", "C++", "Python", "Ruby"]);
        let skills = derive_skills(&transcript, Some(&cand), None);
        assert_eq!(skills.len(), 5);
    }

    #[test]
    fn skills_fall_back_to_candidate_profile_when_job_offer_strengths_go_unmentioned() {
        let transcript = vec![
            segment(Speaker::Emma, "Tell me about yourself."),
            segment(Speaker::Candidate, "I mostly write Haskell these days."),
        ];
        let offer = job_offer(vec!["Rust", "Go"]);
        let cand = candidate(vec!["Haskell", "OCaml"]);
        let skills = derive_skills(&transcript, Some(&cand), Some(&offer));
        assert_eq!(skills, vec!["Haskell".to_string(), "OCaml".to_string()]);
    }

    #[test]
    fn short_transcript_yields_zero_rule_based_score() {
        let transcript = vec![segment(Speaker::Emma, "Hi")];
        assert_eq!(rule_based_score(&transcript, &[]), 0);
    }

    #[test]
    fn rule_based_score_rewards_length_and_skills() {
        let transcript = vec![
            segment(Speaker::Emma, "Hi"),
            segment(Speaker::Candidate, "I've used Rust."),
        ];
        let skills = vec!["Rust".to_string()];
        assert_eq!(rule_based_score(&transcript, &skills), 40 + 5 * 2 + 10);
    }

    #[test]
    fn identical_embeddings_score_near_one_hundred() {
        let embedding = vec![1.0, 0.0, 0.0];
        assert_eq!(score_from_embeddings(&embedding, &embedding), Some(100));
    }

    #[test]
    fn opposite_embeddings_score_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert_eq!(score_from_embeddings(&a, &b), Some(0));
    }

    #[test]
    fn mismatched_lengths_have_no_embedding_score() {
        assert_eq!(score_from_embeddings(&[1.0, 0.0], &[1.0]), None);
    }
}
