//! Utility functions for creating and handling A2A Message objects.

use uuid::Uuid;

use crate::types::{Message, Part, Role};
use crate::utils::parts::get_text_parts;

/// Creates a new agent message containing a single text Part.
pub fn new_agent_text_message(text: impl Into<String>) -> Message {
    Message {
        message_id: Uuid::new_v4().to_string(),
        role: Role::Agent,
        parts: vec![Part::text(text)],
        metadata: None,
    }
}

/// Creates a new agent message containing a list of Parts.
pub fn new_agent_parts_message(parts: Vec<Part>) -> Message {
    Message {
        message_id: Uuid::new_v4().to_string(),
        role: Role::Agent,
        parts,
        metadata: None,
    }
}

/// Extracts and joins all text content from a Message's parts.
pub fn get_message_text(message: &Message, delimiter: &str) -> String {
    get_text_parts(&message.parts).join(delimiter)
}
