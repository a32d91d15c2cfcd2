use serde::Serialize;

use crate::core::report::Report;

/// Body of `POST /channels/{id}/messages`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MessagePayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
}

impl From<&Report> for Embed {
    fn from(report: &Report) -> Self {
        Embed {
            title: report.title.clone(),
            color: report.color,
            fields: report
                .fields
                .iter()
                .map(|field| EmbedField {
                    name: field.name.clone(),
                    value: field.value.clone(),
                    inline: field.inline,
                })
                .collect(),
            footer: EmbedFooter {
                text: report.footer.clone(),
            },
        }
    }
}

impl From<&Report> for MessagePayload {
    fn from(report: &Report) -> Self {
        MessagePayload {
            embeds: vec![Embed::from(report)],
        }
    }
}
