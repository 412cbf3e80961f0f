//! Scripted chat host: builds the patch batches a chat front end would send
//! while it renders a conversation.

use bus::HostEvent;
use core_types::DomVersion;
use html::{DomPatch, PatchKey};
use std::sync::Arc;

/// Keys of one rendered message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageKeys {
    /// The element carrying `data-message-author-role`.
    pub turn: PatchKey,
    /// Container the message text streams into.
    pub body: PatchKey,
    pub text: PatchKey,
}

pub struct ChatPage {
    next_key: u32,
    version: DomVersion,
    main: Option<PatchKey>,
    thread: Option<PatchKey>,
    pending: Vec<DomPatch>,
}

impl Default for ChatPage {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPage {
    /// A page whose document is still at [`DomVersion::INITIAL`].
    pub fn new() -> Self {
        Self {
            next_key: PatchKey::FIRST_HOST.0,
            version: DomVersion::INITIAL,
            main: None,
            thread: None,
            pending: Vec::new(),
        }
    }

    pub fn version(&self) -> DomVersion {
        self.version
    }

    pub fn main(&self) -> Option<PatchKey> {
        self.main
    }

    fn alloc(&mut self) -> PatchKey {
        let key = PatchKey(self.next_key);
        self.next_key += 1;
        key
    }

    /// `<main>` with an empty thread container under `<body>`.
    pub fn scaffold(&mut self) -> &mut Self {
        let main = self.alloc();
        let thread = self.alloc();
        self.pending.extend([
            DomPatch::element(main, "main", &[]),
            DomPatch::AppendChild {
                parent: PatchKey::BODY,
                child: main,
            },
            DomPatch::element(thread, "div", &[("class", "thread")]),
            DomPatch::AppendChild {
                parent: main,
                child: thread,
            },
        ]);
        self.main = Some(main);
        self.thread = Some(thread);
        self
    }

    fn message(&mut self, role: &str, text: &str) -> MessageKeys {
        let parent = self.thread.unwrap_or(PatchKey::BODY);
        let turn = self.alloc();
        let body = self.alloc();
        let text_key = self.alloc();
        self.pending.extend([
            DomPatch::element(turn, "div", &[("data-message-author-role", role)]),
            DomPatch::element(body, "div", &[("class", "whitespace-pre-wrap")]),
            DomPatch::CreateText {
                key: text_key,
                text: text.to_string(),
            },
            DomPatch::AppendChild {
                parent: body,
                child: text_key,
            },
            DomPatch::AppendChild {
                parent: turn,
                child: body,
            },
            DomPatch::AppendChild {
                parent,
                child: turn,
            },
        ]);
        MessageKeys {
            turn,
            body,
            text: text_key,
        }
    }

    pub fn user_message(&mut self, text: &str) -> MessageKeys {
        self.message("user", text)
    }

    pub fn assistant_message(&mut self, text: &str) -> MessageKeys {
        self.message("assistant", text)
    }

    /// A user message whose text has not streamed in yet.
    pub fn empty_message(&mut self) -> MessageKeys {
        self.message("user", "")
    }

    /// Stream another chunk of text into `parent` as a new text node.
    pub fn append_text(&mut self, parent: PatchKey, text: &str) -> PatchKey {
        let key = self.alloc();
        self.pending.extend([
            DomPatch::CreateText {
                key,
                text: text.to_string(),
            },
            DomPatch::AppendChild { parent, child: key },
        ]);
        key
    }

    /// Rewrite a text node in place. Observers of child lists do not see this.
    pub fn set_text(&mut self, key: PatchKey, text: &str) -> &mut Self {
        self.pending.push(DomPatch::SetText {
            key,
            text: text.to_string(),
        });
        self
    }

    pub fn remove(&mut self, key: PatchKey) -> &mut Self {
        self.pending.push(DomPatch::RemoveNode { key });
        self
    }

    /// Replace the attribute list of `key` with the host's own, dropping
    /// anything a script added since the last render.
    pub fn rerender_attributes(&mut self, key: PatchKey, attributes: &[(&str, &str)]) -> &mut Self {
        self.pending.push(DomPatch::SetAttributes {
            key,
            attributes: attributes
                .iter()
                .map(|(k, v)| (Arc::from(*k), Some((*v).to_string())))
                .collect(),
        });
        self
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Close the current batch as the next version step.
    pub fn commit(&mut self) -> HostEvent {
        let from = self.version;
        let to = from.next();
        self.version = to;
        HostEvent::Patches {
            from,
            to,
            patches: std::mem::take(&mut self.pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_start_above_reserved_range() {
        let mut page = ChatPage::new();
        page.scaffold();
        let msg = page.user_message("hi");
        assert!(!msg.turn.is_reserved());
        assert!(msg.turn.0 >= PatchKey::FIRST_HOST.0);
        assert_ne!(msg.turn, msg.text);
    }

    #[test]
    fn commits_advance_one_version_at_a_time() {
        let mut page = ChatPage::new();
        page.scaffold();
        let HostEvent::Patches { from, to, patches } = page.commit() else {
            panic!("expected a patch batch");
        };
        assert_eq!(from, DomVersion::INITIAL);
        assert_eq!(to, DomVersion::INITIAL.next());
        assert_eq!(patches.len(), 4);
        assert!(!page.has_pending());
        assert_eq!(page.version(), to);
    }
}
