//! Prompt construction for the strategic frameworks.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::MAX_CONTEXT_CHARS;

/// Persona and output rule shared by every framework prompt.
pub const SYSTEM_PROMPT: &str = "You are a senior strategy consultant and business analyst. \
Base your analysis on the research context provided and on widely known public information. \
Be specific to the subject rather than generic. \
Respond with a single JSON document only: no Markdown, no code fences, no commentary.";

const TRUNCATION_MARKER: &str = "\n[... context truncated ...]";

/// Analytical framework a prompt asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    Swot,
    Pestel,
    PorterFiveForces,
    BcgMatrix,
    McKinsey7S,
    LinkedInSentiment,
    ComparisonInsights,
}

impl Framework {
    /// Frameworks run for every analysis, company or document.
    pub const CORE: [Framework; 5] = [
        Framework::Swot,
        Framework::Pestel,
        Framework::PorterFiveForces,
        Framework::BcgMatrix,
        Framework::McKinsey7S,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Framework::Swot => "SWOT Analysis",
            Framework::Pestel => "PESTEL Analysis",
            Framework::PorterFiveForces => "Porter's Five Forces",
            Framework::BcgMatrix => "BCG Growth-Share Matrix",
            Framework::McKinsey7S => "McKinsey 7S Framework",
            Framework::LinkedInSentiment => "LinkedIn Sentiment",
            Framework::ComparisonInsights => "Comparative Insights",
        }
    }

    /// JSON shape the model must answer with.
    pub fn shape(&self) -> &'static str {
        match self {
            Framework::Swot => {
                r#"{"strengths": ["..."], "weaknesses": ["..."], "opportunities": ["..."], "threats": ["..."]}
Give 3 to 6 concise items per list."#
            }
            Framework::Pestel => {
                r#"{"political": {"factors": ["..."], "impact": 1-5}, "economic": {...}, "social": {...}, "technological": {...}, "environmental": {...}, "legal": {...}}
impact rates how strongly the dimension affects the subject, 1 (negligible) to 5 (critical)."#
            }
            Framework::PorterFiveForces => {
                r#"{"competitive_rivalry": {"intensity": 1-5, "analysis": "..."}, "supplier_power": {...}, "buyer_power": {...}, "threat_of_substitutes": {...}, "threat_of_new_entrants": {...}}
intensity is 1 (very weak force) to 5 (very strong force)."#
            }
            Framework::BcgMatrix => {
                r#"{"products": [{"name": "...", "market_growth_rate": <percent per year>, "relative_market_share": <ratio to the largest competitor>}]}
List the main products or business units. Use numbers, not words."#
            }
            Framework::McKinsey7S => {
                r#"{"strategy": "...", "structure": "...", "systems": "...", "shared_values": "...", "style": "...", "staff": "...", "skills": "..."}"#
            }
            Framework::LinkedInSentiment => {
                r#"{"overall_score": <-1.0 to 1.0>, "positive": <percent>, "neutral": <percent>, "negative": <percent>, "key_themes": ["..."], "summary": "..."}
Percentages must sum to 100."#
            }
            Framework::ComparisonInsights => {
                r#"{"summary": "...", "leader": "<company>", "recommendations": ["..."]}"#
            }
        }
    }

    fn task(&self) -> &'static str {
        match self {
            Framework::LinkedInSentiment => {
                "Infer the professional sentiment towards the subject from the LinkedIn posts and snippets in the context."
            }
            Framework::ComparisonInsights => {
                "Compare the companies using the metrics below. Explain who leads, where each is exposed, and what each should do next."
            }
            _ => "Produce the analysis for the subject.",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What a prompt is about
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Company(&'a str),
    Document { name: &'a str, text: &'a str },
}

/// Cut `text` to at most `max_chars` characters, marking the cut.
pub fn truncate_context(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{}", &text[..byte_index], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// User prompt for `framework` over `subject` with supporting research `context`.
pub fn build_prompt(framework: Framework, subject: Subject<'_>, context: &str) -> String {
    let mut prompt = format!("Framework: {}\n", framework.display_name());

    match subject {
        Subject::Company(name) => {
            prompt.push_str(&format!("Company: {}\n\n{}\n", name, framework.task()));
            let context = context.trim();
            if context.is_empty() {
                prompt.push_str("\nNo research context was found; rely on public knowledge and say so where uncertain.\n");
            } else {
                prompt.push_str(&format!(
                    "\nResearch context:\n\"\"\"\n{}\n\"\"\"\n",
                    truncate_context(context, MAX_CONTEXT_CHARS)
                ));
            }
        }
        Subject::Document { name, text } => {
            prompt.push_str(&format!(
                "Document: {}\n\n{} Treat the document as the primary source.\n\nDocument text:\n\"\"\"\n{}\n\"\"\"\n",
                name,
                framework.task(),
                truncate_context(text.trim(), MAX_CONTEXT_CHARS)
            ));
        }
    }

    prompt.push_str(&format!(
        "\nRespond with JSON only, in exactly this shape:\n{}\n",
        framework.shape()
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_on_char_boundary() {
        let text = "ééééé";
        let cut = truncate_context(text, 2);
        assert!(cut.starts_with("éé"));
        assert!(cut.ends_with("context truncated ...]"));
        assert_eq!(truncate_context("short", 10), "short");
    }

    #[test]
    fn test_company_prompt_contents() {
        let prompt = build_prompt(
            Framework::PorterFiveForces,
            Subject::Company("Acme Corp"),
            "Acme makes anvils.",
        );
        assert!(prompt.contains("Porter's Five Forces"));
        assert!(prompt.contains("Company: Acme Corp"));
        assert!(prompt.contains("Acme makes anvils."));
        assert!(prompt.contains("threat_of_new_entrants"));
        assert!(prompt.contains("JSON only"));
    }

    #[test]
    fn test_company_prompt_without_context() {
        let prompt = build_prompt(Framework::Swot, Subject::Company("Acme"), "   ");
        assert!(prompt.contains("No research context"));
        assert!(!prompt.contains("Research context:"));
    }

    #[test]
    fn test_document_prompt_truncates() {
        let text = "x".repeat(MAX_CONTEXT_CHARS + 50);
        let prompt = build_prompt(
            Framework::McKinsey7S,
            Subject::Document { name: "plan.txt", text: &text },
            "",
        );
        assert!(prompt.contains("Document: plan.txt"));
        assert!(prompt.contains("context truncated"));
        assert!(!prompt.contains(&"x".repeat(MAX_CONTEXT_CHARS + 1)));
    }

    #[test]
    fn test_core_excludes_sentiment() {
        assert!(!Framework::CORE.contains(&Framework::LinkedInSentiment));
        assert_eq!(Framework::Swot.to_string(), "SWOT Analysis");
    }
}
