use serde::{Deserialize, Serialize};

/// A Discord rich embed. Only the fields delivery messages actually use are modelled.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl Embed {
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self { title: title.into(), ..Default::default() }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn add_field<N: Into<String>, V: Into<String>>(mut self, name: N, value: V, inline: bool) -> Self {
        self.fields.push(EmbedField { name: name.into(), value: value.into(), inline });
        self
    }

    pub fn with_footer<S: Into<String>>(mut self, text: S) -> Self {
        self.footer = Some(EmbedFooter { text: text.into() });
        self
    }
}

/// A DM channel as returned by `POST /users/@me/channels`.
#[derive(Debug, Clone, Deserialize)]
pub struct DmChannel {
    pub id: String,
}

/// A posted message. Only the id is consulted, for logging.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn embed_serializes_the_discord_shape() {
        let embed = Embed::new("Purchase successful")
            .with_description("Thanks for your purchase!")
            .with_color(0x00ff00)
            .add_field("Product", "Netflix Premium", true)
            .add_field("Price", "25.99", true)
            .with_footer("Transaction: cs_test_1…");
        let json = serde_json::to_value(&embed).unwrap();
        assert_eq!(json["title"], "Purchase successful");
        assert_eq!(json["color"], 0x00ff00);
        assert_eq!(json["fields"].as_array().unwrap().len(), 2);
        assert_eq!(json["fields"][0]["inline"], true);
        assert_eq!(json["footer"]["text"], "Transaction: cs_test_1…");
    }

    #[test]
    fn empty_collections_are_omitted() {
        let embed = Embed::new("Bare");
        let json = serde_json::to_value(&embed).unwrap();
        assert!(json.get("fields").is_none());
        assert!(json.get("footer").is_none());
        assert!(json.get("description").is_none());
    }
}
