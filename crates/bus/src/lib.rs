use core_types::{DomVersion, NodeKey};
use html::DomPatch;
use std::sync::mpsc::{Receiver, Sender, channel};

/// Something the host page or the user did.
#[derive(Debug)]
pub enum HostEvent {
    // Host document lifecycle
    DomContentLoaded,
    /// Host re-render (patch stream)
    Patches {
        from: DomVersion,
        to: DomVersion,
        patches: Vec<DomPatch>,
    },
    /// Back/forward navigation within the same document.
    PopState {
        url: String,
    },

    // User -> page
    Click {
        target: NodeKey,
    },
    Input {
        target: NodeKey,
        value: String,
    },
}

pub struct Bus {
    pub evt_tx: Sender<HostEvent>, // shareable with whatever drives the page
    pub evt_rx: Receiver<HostEvent>,
}

impl Bus {
    pub fn new() -> Self {
        let (evt_tx, evt_rx) = channel();
        Self { evt_tx, evt_rx }
    }

    pub fn sender(&self) -> Sender<HostEvent> {
        self.evt_tx.clone()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
