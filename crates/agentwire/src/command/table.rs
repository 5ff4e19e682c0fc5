//! Registry of commands and the tag patterns that match them.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use super::handler::{Command, PayloadShape};
use super::occurrence::{parse_payload, CommandOccurrence, Payload};
use crate::error::DispatchError;

struct Entry {
    command: Arc<dyn Command>,
    pattern: Regex,
}

/// Maps command names to their matcher and handler.
///
/// Read-only once built; shared between dispatch and rendering behind an `Arc`.
#[derive(Default)]
pub struct CommandTable {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C: Command + 'static>(&mut self, command: C) -> Result<(), DispatchError> {
        self.register_arc(Arc::new(command))
    }

    pub fn register_arc(&mut self, command: Arc<dyn Command>) -> Result<(), DispatchError> {
        let name = command.name().to_string();
        if !is_command_name(&name) {
            return Err(DispatchError::InvalidCommandName(name));
        }
        if self.index.contains_key(&name) {
            return Err(DispatchError::DuplicateCommand(name));
        }
        let pattern = build_pattern(&name, command.shape())?;
        self.index.insert(name, self.entries.len());
        self.entries.push(Entry { command, pattern });
        Ok(())
    }

    /// Every occurrence of every registered command, in source order.
    pub fn match_all(&self, text: &str) -> Vec<CommandOccurrence> {
        let mut found: Vec<(usize, CommandOccurrence)> = Vec::new();
        for (order, entry) in self.entries.iter().enumerate() {
            let name = entry.command.name();
            for captures in entry.pattern.captures_iter(text) {
                let Some(whole) = captures.get(0) else {
                    continue;
                };
                let occurrence = match captures.get(1) {
                    Some(inner) => CommandOccurrence {
                        command: name.to_string(),
                        raw_payload: Some(inner.as_str().to_string()),
                        payload: parse_payload(inner.as_str()),
                        span: whole.range(),
                    },
                    None => CommandOccurrence {
                        command: name.to_string(),
                        raw_payload: None,
                        payload: Payload::Empty,
                        span: whole.range(),
                    },
                };
                found.push((order, occurrence));
            }
        }
        found.sort_by_key(|(order, occurrence)| (occurrence.span.start, *order));
        found.into_iter().map(|(_, occurrence)| occurrence).collect()
    }

    /// Whether the text contains at least one registered command.
    pub fn matches_any(&self, text: &str) -> bool {
        self.entries.iter().any(|entry| entry.pattern.is_match(text))
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.index.get(name).map(|&i| &self.entries[i].command)
    }

    pub fn icon(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|command| command.icon())
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.command.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTable").field("commands", &self.names()).finish()
    }
}

/// `[A-Za-z][A-Za-z0-9]*`
fn is_command_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

fn build_pattern(name: &str, shape: PayloadShape) -> Result<Regex, DispatchError> {
    let name = regex::escape(name);
    let source = match shape {
        PayloadShape::Paired => format!(r"(?s)<{name}>(.*?)</{name}>"),
        PayloadShape::SelfClosing => format!(r"<{name} ?/>"),
    };
    Ok(Regex::new(&source)?)
}
