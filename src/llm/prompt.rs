//! Summarization prompts.

use super::types::Message;
use serde::{Deserialize, Serialize};

/// Built-in prompt wordings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Study-notes style summary that keeps every important detail
    #[default]
    Detailed,
    /// Short summary
    Concise,
}

/// A system message plus the instruction placed in front of each chunk
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub system: String,
    pub instruction: String,
}

impl PromptTemplate {
    pub fn preset(style: PromptStyle) -> Self {
        match style {
            PromptStyle::Detailed => Self {
                system: "You are a master class summarizer and note taker. Your task is to \
                         provide a concise, yet comprehensive summary that captures all crucial \
                         concepts and details. Ensure the summary is educational, highlights key \
                         points, and is structured in a way that facilitates easy learning and \
                         recall."
                    .to_string(),
                instruction: "Write a concise and comprehensive summary of the following text, \
                              ensuring to include all important details for a thorough \
                              understanding:"
                    .to_string(),
            },
            PromptStyle::Concise => Self {
                system: "You are a master class summarizer and note taker.".to_string(),
                instruction: "Write a concise summary of the following text:".to_string(),
            },
        }
    }

    /// The role-tagged message pair for one chunk
    pub fn messages(&self, chunk: &str) -> Vec<Message> {
        vec![
            Message::system(self.system.clone()),
            Message::user(format!("{}\n\n{}", self.instruction, chunk)),
        ]
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::preset(PromptStyle::default())
    }
}
