//! Plain-language summarization of a parsed paper.
//!
//! [`Summarizer::summarize`] cannot fail. A backend error, a non-JSON reply or
//! a reply of the wrong shape all resolve to [`SummaryOutcome::Degraded`]
//! carrying the template summary from [`fallback_summary`].

use anyhow::{Context as _, anyhow};
use async_trait::async_trait;
use rig::{agent::Agent, client::CompletionClient, completion::Prompt, providers::openrouter};
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{KeyPoint, PaperStructure, SummaryContent};
use crate::parser::key_sections;

const FULL_TEXT_EXCERPT_CHARS: usize = 3000;

const PREAMBLE: &str = "You are an expert academic communication specialist who excels at \
making complex research accessible to general audiences.";

/// A summary together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    Generated(SummaryContent),
    Degraded {
        content: SummaryContent,
        reason: String,
    },
}

impl SummaryOutcome {
    pub fn content(&self) -> &SummaryContent {
        match self {
            SummaryOutcome::Generated(content) => content,
            SummaryOutcome::Degraded { content, .. } => content,
        }
    }

    pub fn into_content(self) -> SummaryContent {
        match self {
            SummaryOutcome::Generated(content) => content,
            SummaryOutcome::Degraded { content, .. } => content,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SummaryOutcome::Degraded { .. })
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, paper: &PaperStructure) -> SummaryOutcome;
}

/// Sends one prompt to a language model and returns its raw reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// OpenRouter chat completion through a rig agent.
pub struct OpenRouterBackend {
    agent: Agent<openrouter::CompletionModel>,
}

impl OpenRouterBackend {
    pub fn new(api_key: &str, model: &str) -> Self {
        let client = openrouter::Client::new(api_key);
        let agent = client.agent(model).preamble(PREAMBLE).build();
        Self { agent }
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterBackend {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let response = self.agent.prompt(prompt).await?;
        Ok(response)
    }
}

pub struct LlmSummarizer {
    backend: Arc<dyn CompletionBackend>,
}

impl LlmSummarizer {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    async fn try_summarize(&self, paper: &PaperStructure) -> anyhow::Result<SummaryContent> {
        let prompt = build_prompt(paper);
        let response = self
            .backend
            .complete(&prompt)
            .await
            .context("completion request failed")?;
        parse_summary_response(&response)
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, paper: &PaperStructure) -> SummaryOutcome {
        match self.try_summarize(paper).await {
            Ok(content) => {
                info!(key_points = content.key_points.len(), "generated summary");
                SummaryOutcome::Generated(content)
            }
            Err(e) => {
                warn!(error = %e, "summarization failed, using template summary");
                SummaryOutcome::Degraded {
                    content: fallback_summary(paper),
                    reason: format!("{e:#}"),
                }
            }
        }
    }
}

/// Summarizer used when no language model is configured.
pub struct TemplateSummarizer;

#[async_trait]
impl Summarizer for TemplateSummarizer {
    async fn summarize(&self, paper: &PaperStructure) -> SummaryOutcome {
        SummaryOutcome::Degraded {
            content: fallback_summary(paper),
            reason: "no language model configured".to_string(),
        }
    }
}

fn build_prompt(paper: &PaperStructure) -> String {
    let sections = key_sections(&paper.full_text);
    let sections = if sections.is_empty() {
        "(none detected)".to_string()
    } else {
        sections.join("\n")
    };

    format!(
        r#"You are an expert at making academic research accessible to general audiences.
Transform this academic paper into an engaging, easy-to-understand summary.

PAPER DETAILS:
Title: {title}
Author: {author}
Abstract: {abstract_text}
Introduction: {introduction}
Conclusion: {conclusion}

KEY SECTIONS:
{sections}

FULL TEXT (excerpt): {excerpt}

Please create:
1. An engaging title that makes the research accessible
2. A compelling introduction paragraph that hooks the reader
3. 4-5 key points that explain the main concepts in simple terms
4. A clear conclusion paragraph
5. 3-4 practical implications or takeaways

Respond with JSON only, in exactly this structure:
{{
    "title": "Engaging accessible title",
    "introduction": "Hook paragraph in simple language",
    "key_points": [
        {{"heading": "Point title", "content": "Explanation in simple terms"}}
    ],
    "conclusion": "Clear concluding paragraph",
    "implications": ["Implication 1", "Implication 2", "Implication 3"]
}}

Use conversational language, avoid jargon, and make it engaging for non-experts."#,
        title = paper.title,
        author = paper.author,
        abstract_text = paper.abstract_text,
        introduction = paper.introduction,
        conclusion = paper.conclusion,
        excerpt = paper.excerpt(FULL_TEXT_EXCERPT_CHARS),
    )
}

/// Pull the JSON object out of a model reply, tolerating surrounding prose or
/// code fences.
fn parse_summary_response(response: &str) -> anyhow::Result<SummaryContent> {
    let start = response
        .find('{')
        .ok_or_else(|| anyhow!("no JSON object in model response"))?;
    let end = response
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| anyhow!("unterminated JSON object in model response"))?;

    let content: SummaryContent = serde_json::from_str(&response[start..=end])
        .context("model response does not match the summary structure")?;

    if content.title.trim().is_empty() {
        return Err(anyhow!("model response has an empty title"));
    }
    Ok(content)
}

/// Deterministic summary built only from the paper's title and author.
pub fn fallback_summary(paper: &PaperStructure) -> SummaryContent {
    SummaryContent {
        title: format!("Understanding: {}", paper.title),
        introduction: format!(
            "This research paper explores important concepts and findings that contribute to our \
             understanding of the field. The work by {} provides valuable insights worth exploring.",
            paper.author
        ),
        key_points: vec![
            KeyPoint::new(
                "Research Focus",
                "This study examines key aspects of the topic with systematic methodology and analysis.",
            ),
            KeyPoint::new(
                "Key Findings",
                "The research reveals significant patterns and relationships that advance our knowledge in this area.",
            ),
            KeyPoint::new(
                "Methodology",
                "The authors employed rigorous research methods to ensure reliable and valid results.",
            ),
            KeyPoint::new(
                "Implications",
                "The findings have important implications for both theory and practical applications in the field.",
            ),
        ],
        conclusion: "This research contributes meaningfully to the academic discourse and provides a \
                     foundation for future studies in this important area."
            .to_string(),
        implications: vec![
            "Advances theoretical understanding in the field".to_string(),
            "Provides practical insights for practitioners".to_string(),
            "Opens new avenues for future research".to_string(),
            "Contributes to evidence-based decision making".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::sync::Mutex;

    struct CannedBackend {
        reply: anyhow::Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedBackend {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(anyhow!("connection refused")),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(e) => Err(anyhow!("{e}")),
            }
        }
    }

    fn sample_paper() -> PaperStructure {
        parse("Graph Neural Networks at Scale\nby Grace Hopper\nAbstract: We scale GNNs.\n\nBody")
    }

    #[tokio::test]
    async fn test_generated_summary_from_fenced_json() {
        let reply = r#"Here you go:
```json
{"title": "Big Graphs, Simply", "introduction": "Hook.",
 "key_points": [{"heading": "Scale", "content": "It scales."}],
 "conclusion": "Done.", "implications": ["Faster models"]}
```"#;
        let backend = CannedBackend::replying(reply);
        let summarizer = LlmSummarizer::new(backend.clone());

        let outcome = summarizer.summarize(&sample_paper()).await;

        assert!(!outcome.is_degraded());
        let content = outcome.into_content();
        assert_eq!(content.title, "Big Graphs, Simply");
        assert_eq!(content.key_points, vec![KeyPoint::new("Scale", "It scales.")]);

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].contains("Title: Graph Neural Networks at Scale"));
        assert!(prompts[0].contains("Author: Grace Hopper"));
        assert!(prompts[0].contains("Abstract: We scale GNNs."));
    }

    #[tokio::test]
    async fn test_backend_error_degrades_to_template() {
        let summarizer = LlmSummarizer::new(CannedBackend::failing());
        let paper = sample_paper();

        let outcome = summarizer.summarize(&paper).await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.content(), &fallback_summary(&paper));
    }

    #[tokio::test]
    async fn test_non_json_reply_degrades_to_template() {
        let summarizer = LlmSummarizer::new(CannedBackend::replying("I cannot help with that."));
        let outcome = summarizer.summarize(&sample_paper()).await;
        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_wrong_shape_degrades_to_template() {
        let summarizer = LlmSummarizer::new(CannedBackend::replying(r#"{"answer": 42}"#));
        let outcome = summarizer.summarize(&sample_paper()).await;
        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_template_summarizer_is_always_degraded() {
        let paper = sample_paper();
        let outcome = TemplateSummarizer.summarize(&paper).await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.into_content(), fallback_summary(&paper));
    }

    #[test]
    fn test_fallback_uses_title_and_author() {
        let summary = fallback_summary(&sample_paper());

        assert_eq!(summary.title, "Understanding: Graph Neural Networks at Scale");
        assert!(summary.introduction.contains("The work by Grace Hopper"));
        assert_eq!(summary.key_points.len(), 4);
        assert_eq!(summary.implications.len(), 4);
    }
}
