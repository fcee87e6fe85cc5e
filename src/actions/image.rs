use crate::actions::Action;
use crate::api::ImageGenerator;
use crate::error::Result;
use crate::models::{Message, Reply};
use async_trait::async_trait;
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static PROMPT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)prompt:(.*)").expect("valid prompt pattern"));

const MISSING_PROMPT: &str = "Please provide a prompt in the format 'prompt: your description here'";
const APOLOGY: &str = "Sorry, I couldn't generate the image right now. Please try again later.";

pub const ATTACHMENT_NAME: &str = "generated-image.png";

fn prompt_of(text: &str) -> Option<&str> {
    PROMPT_PATTERN
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|prompt| !prompt.is_empty())
}

pub struct GenerateImageAction {
    images: Arc<dyn ImageGenerator>,
}

impl GenerateImageAction {
    pub fn new(images: Arc<dyn ImageGenerator>) -> Self {
        Self { images }
    }

    async fn reply(&self, message: &Message, prompt: &str) -> Result<Reply> {
        info!("Generating image for prompt: {}", prompt);
        let image = self.images.generate(prompt).await?;
        Ok(Reply::new("Here's your generated image:", "IMAGE_GENERATED", message.source.clone())
            .with_attachment(ATTACHMENT_NAME, image))
    }
}

#[async_trait]
impl Action for GenerateImageAction {
    fn name(&self) -> &'static str {
        "GENERATE_IMAGE"
    }

    fn similes(&self) -> &'static [&'static str] {
        &["GENERATE_PHOTO", "GENERATE_PICTURE", "GENERATE_PHOTOGRAPH"]
    }

    fn description(&self) -> &'static str {
        "Generate an image using the Flux 1.1 Pro model"
    }

    fn validate(&self, message: &Message) -> bool {
        message.text.to_lowercase().contains("prompt:")
    }

    async fn handle(&self, message: &Message) -> Reply {
        let Some(prompt) = prompt_of(&message.text) else {
            return Reply::new(MISSING_PROMPT, "IMAGE_ERROR", message.source.clone());
        };

        match self.reply(message, prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error generating image: {}", e);
                Reply::new(APOLOGY, "IMAGE_ERROR", message.source.clone())
            }
        }
    }
}
