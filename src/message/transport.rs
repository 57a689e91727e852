use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;

/// A message in flight between two parties.
///
/// Serialized with the original wire field names (`From`, `To`, `Message`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub from: String,
    pub to: String,
    pub message: String,
}

/// The ability to send a `Message` and list the messages sent.
///
/// Implementations are the storage boundary of the sample service; the
/// dispatch core never sees this trait.
pub trait Transport: Send + Sync {
    fn send(&self, msg: Message) -> anyhow::Result<()>;

    /// List messages sent, bounded to the store's page size.
    fn list(&self) -> anyhow::Result<Vec<Message>>;
}

/// Default page bound for [`MemoryTransport::list`].
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// In-memory, process-wide message store.
///
/// A single lock-guarded instance is shared by every request via the
/// request-scoped factory; it is injected explicitly, never reached through
/// globals. Arrival order is preserved.
pub struct MemoryTransport {
    messages: Mutex<Vec<Message>>,
    page_size: usize,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// A store whose `list` returns at most `page_size` messages.
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            page_size,
        }
    }

    /// Total number of stored messages, ignoring the page bound.
    pub fn stored(&self) -> anyhow::Result<usize> {
        Ok(self
            .messages
            .lock()
            .map_err(|_| anyhow!("message store poisoned"))?
            .len())
    }
}

impl Transport for MemoryTransport {
    fn send(&self, msg: Message) -> anyhow::Result<()> {
        let mut messages = self
            .messages
            .lock()
            .map_err(|_| anyhow!("message store poisoned"))?;
        messages.push(msg);
        debug!(stored = messages.len(), "Message persisted");
        Ok(())
    }

    fn list(&self) -> anyhow::Result<Vec<Message>> {
        let messages = self
            .messages
            .lock()
            .map_err(|_| anyhow!("message store poisoned"))?;
        Ok(messages.iter().take(self.page_size).cloned().collect())
    }
}
