//! The two prompt-driven calls: write a proposal from an RFQ, then review it.

use tracing::info;

use crate::llm_client::{ChatMessage, LlmError, TextGenerator};
use crate::proposal::prompts::ProposalPrompts;

/// Sampling temperature for both generation and review.
pub const TEMPERATURE: f32 = 0.7;

fn proposal_request(rfq_text: &str) -> String {
    format!(
        "Here is the RFQ content:\n\n{rfq_text}\n\nPlease generate a technical proposal based on this RFQ."
    )
}

fn review_request(rfq_text: &str, proposal: &str) -> String {
    format!(
        "Here is the RFQ content:\n\n{rfq_text}\n\nAnd here is the generated technical proposal:\n\n{proposal}\n\nPlease review this technical proposal based on the RFQ."
    )
}

/// Returns the generated proposal text verbatim.
pub async fn generate_proposal(
    llm: &dyn TextGenerator,
    prompts: &ProposalPrompts,
    rfq_text: &str,
) -> Result<String, LlmError> {
    info!("Generating technical proposal ({} chars of RFQ)", rfq_text.len());
    let messages = [
        ChatMessage::system(prompts.proposal_system.as_str()),
        ChatMessage::user(proposal_request(rfq_text)),
    ];
    llm.complete(&messages, TEMPERATURE).await
}

/// Returns the review text verbatim.
pub async fn review_proposal(
    llm: &dyn TextGenerator,
    prompts: &ProposalPrompts,
    rfq_text: &str,
    proposal: &str,
) -> Result<String, LlmError> {
    info!("Reviewing technical proposal");
    let messages = [
        ChatMessage::system(prompts.review_system.as_str()),
        ChatMessage::user(review_request(rfq_text, proposal)),
    ];
    llm.complete(&messages, TEMPERATURE).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::ChatRole;
    use crate::test_support::ScriptedGenerator;

    #[tokio::test]
    async fn test_generate_sends_system_template_and_rfq() {
        let llm = ScriptedGenerator::replying(&["<h1>Proposal</h1>"]);
        let prompts = ProposalPrompts::default();

        let text = generate_proposal(&llm, &prompts, "Project X requirements")
            .await
            .unwrap();

        assert_eq!(text, "<h1>Proposal</h1>");
        let calls = llm.calls.lock().unwrap();
        let (messages, temperature) = &calls[0];
        assert_eq!(*temperature, TEMPERATURE);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[0].content, prompts.proposal_system);
        assert_eq!(messages[1].role, ChatRole::User);
        assert!(messages[1].content.contains("Project X requirements"));
    }

    #[tokio::test]
    async fn test_review_embeds_rfq_and_proposal() {
        let llm = ScriptedGenerator::replying(&["<h1>Review</h1>"]);
        let prompts = ProposalPrompts::default();

        let text = review_proposal(&llm, &prompts, "Project X requirements", "<h1>Proposal</h1>")
            .await
            .unwrap();

        assert_eq!(text, "<h1>Review</h1>");
        let calls = llm.calls.lock().unwrap();
        let user = &calls[0].0[1].content;
        assert!(user.contains("Project X requirements"));
        assert!(user.contains("<h1>Proposal</h1>"));
        assert_eq!(calls[0].0[0].content, prompts.review_system);
    }

    #[tokio::test]
    async fn test_generation_failure_propagates_without_retry() {
        let llm = ScriptedGenerator::failing();
        let prompts = ProposalPrompts::default();

        let err = generate_proposal(&llm, &prompts, "rfq").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 503, .. }));
        assert_eq!(llm.calls.lock().unwrap().len(), 1);
    }
}
