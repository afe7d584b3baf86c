//! Provider-neutral call control markup
//!
//! The router answers every callback with an ordered list of verbs. The
//! infrastructure layer turns that list into the provider's document format.

use serde::{Deserialize, Serialize};

/// One dial target inside a `Dial` verb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialTarget {
    Sip(String),
    Number(String),
}

impl DialTarget {
    pub fn address(&self) -> &str {
        match self {
            DialTarget::Sip(uri) => uri,
            DialTarget::Number(number) => number,
        }
    }
}

/// Ring one or more targets at once; the first to answer is bridged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dial {
    pub targets: Vec<DialTarget>,
    pub timeout_seconds: u32,
    pub caller_id: Option<String>,
    /// Route the provider posts the dial outcome to
    pub action: Option<String>,
}

/// Record a message from the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub max_length_seconds: u32,
    pub finish_on_key: String,
    /// Route the provider posts to once the caller is done
    pub action: String,
    /// Route for asynchronous recording status pings
    pub status_callback: Option<String>,
    pub play_beep: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verb {
    Say(String),
    Pause(u32),
    Dial(Dial),
    Record(Record),
    Hangup,
}

/// Response document for a single callback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup {
    verbs: Vec<Verb>,
}

impl Markup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say(text.into()));
        self
    }

    pub fn pause(mut self, seconds: u32) -> Self {
        self.verbs.push(Verb::Pause(seconds));
        self
    }

    pub fn dial(mut self, dial: Dial) -> Self {
        self.verbs.push(Verb::Dial(dial));
        self
    }

    pub fn record(mut self, record: Record) -> Self {
        self.verbs.push(Verb::Record(record));
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push(Verb::Hangup);
        self
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// First dial instruction, if any
    pub fn dial_verb(&self) -> Option<&Dial> {
        self.verbs.iter().find_map(|verb| match verb {
            Verb::Dial(dial) => Some(dial),
            _ => None,
        })
    }

    /// First record instruction, if any
    pub fn record_verb(&self) -> Option<&Record> {
        self.verbs.iter().find_map(|verb| match verb {
            Verb::Record(record) => Some(record),
            _ => None,
        })
    }

    /// Spoken text, in order
    pub fn spoken(&self) -> Vec<&str> {
        self.verbs
            .iter()
            .filter_map(|verb| match verb {
                Verb::Say(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn ends_with_hangup(&self) -> bool {
        matches!(self.verbs.last(), Some(Verb::Hangup))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let markup = Markup::new().say("Hello").pause(1).hangup();
        assert_eq!(
            markup.verbs(),
            &[Verb::Say("Hello".to_string()), Verb::Pause(1), Verb::Hangup]
        );
        assert!(markup.ends_with_hangup());
        assert!(markup.dial_verb().is_none());
        assert_eq!(markup.spoken(), vec!["Hello"]);
    }
}
