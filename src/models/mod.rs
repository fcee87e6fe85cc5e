use serde::{Deserialize, Serialize};

pub mod dca;
pub mod pair;

pub use dca::{ActiveDcas, DcaOrder, DcaStats};
pub use pair::{BaseToken, DexScreenerResponse, Liquidity, QuoteToken, TradingPair, TxnCount, Txns, Windowed};

/// An incoming chat message, already stripped of host-runtime state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub source: Option<String>,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// What an action posts back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub action: String,
    pub source: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl Reply {
    pub fn new(text: impl Into<String>, action: &str, source: Option<String>) -> Self {
        Self {
            text: text.into(),
            action: action.to_string(),
            source,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.attachments.push(Attachment {
            name: name.to_string(),
            bytes,
        });
        self
    }
}
