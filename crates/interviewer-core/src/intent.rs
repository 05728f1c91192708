use interviewer_prompts::ConfigEdit;
use serde::{Deserialize, Serialize};

/// User intent raised by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Intent {
    Start,
    SendMessage(String),
    End,
    Reset,
    BuyCreditsCompleted,
    EditConfig(ConfigEdit),
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Start => "start",
            Intent::SendMessage(_) => "send_message",
            Intent::End => "end",
            Intent::Reset => "reset",
            Intent::BuyCreditsCompleted => "buy_credits_completed",
            Intent::EditConfig(_) => "edit_config",
        }
    }
}
