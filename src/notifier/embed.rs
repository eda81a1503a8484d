//! Rich-embed webhook payload

use serde::{Deserialize, Serialize};

use crate::config::SIGNATURE_PLACEHOLDER;
use crate::types::SaleEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedImage {
    pub url: String,
}

impl EmbedField {
    fn inline(name: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline: Some(true),
        }
    }

    fn block(name: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline: None,
        }
    }
}

/// Substitute the signature into an explorer link template
pub fn explorer_link(template: &str, signature: &str) -> String {
    template.replace(SIGNATURE_PLACEHOLDER, signature)
}

impl WebhookPayload {
    /// Build the "SALE" embed for a sale event
    pub fn for_sale(sale: &SaleEvent, explorer_template: &str) -> Self {
        let embed = Embed {
            title: "SALE".to_string(),
            description: sale.asset_name.clone(),
            fields: vec![
                EmbedField::inline("Price", sale.price_string()),
                EmbedField::inline("Date", sale.date_string()),
                EmbedField::inline("Marketplace", sale.marketplace.clone()),
                EmbedField::block("Explorer", explorer_link(explorer_template, &sale.signature)),
            ],
            image: sale.image_url.clone().map(|url| EmbedImage { url }),
        };

        Self { embeds: vec![embed] }
    }
}
