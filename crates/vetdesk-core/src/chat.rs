//! Assistant chat session.
//!
//! Operator messages are answered by the shared [`IntentEngine`] after a
//! short deferral, so the UI can show a typing indicator in between.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vetdesk_assistant::{IntentEngine, Priority, GREETING};

use crate::clock::{Clock, TimerHandle};
use crate::config::DEFAULT_CHAT_HISTORY_LIMIT;

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message in a chat surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    /// Set on assistant replies
    pub priority: Option<Priority>,
    /// Milliseconds, from the clock
    pub timestamp: i64,
}

impl ChatMessage {
    fn new(role: ChatRole, content: String, priority: Option<Priority>, timestamp: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            priority,
            timestamp,
        }
    }
}

struct ChatState {
    /// Oldest first, at most `history_limit`
    messages: Vec<ChatMessage>,
    history_limit: usize,
    next_reply: u64,
    /// Replies scheduled but not yet delivered
    pending: BTreeMap<u64, TimerHandle>,
}

impl ChatState {
    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        if self.messages.len() > self.history_limit {
            let excess = self.messages.len() - self.history_limit;
            self.messages.drain(..excess);
        }
    }
}

/// A chat surface backed by the intent engine.
pub struct ChatSession {
    engine: Arc<IntentEngine>,
    clock: Arc<dyn Clock>,
    reply_delay: Duration,
    state: Arc<Mutex<ChatState>>,
}

impl ChatSession {
    /// Open a session with the assistant greeting.
    pub fn new(engine: Arc<IntentEngine>, clock: Arc<dyn Clock>, reply_delay: Duration) -> Self {
        Self::with_history_limit(engine, clock, reply_delay, DEFAULT_CHAT_HISTORY_LIMIT)
    }

    /// Like [`ChatSession::new`], keeping at most `history_limit` messages
    /// (at least one).
    pub fn with_history_limit(
        engine: Arc<IntentEngine>,
        clock: Arc<dyn Clock>,
        reply_delay: Duration,
        history_limit: usize,
    ) -> Self {
        let greeting = ChatMessage::new(
            ChatRole::Assistant,
            GREETING.to_string(),
            Some(Priority::Info),
            clock.now_millis(),
        );

        Self {
            engine,
            clock,
            reply_delay,
            state: Arc::new(Mutex::new(ChatState {
                messages: vec![greeting],
                history_limit: history_limit.max(1),
                next_reply: 0,
                pending: BTreeMap::new(),
            })),
        }
    }

    /// Post an operator message and schedule the reply.
    ///
    /// Blank input is ignored and returns `None`.
    pub fn send(&self, text: &str) -> Option<ChatMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let message = ChatMessage::new(
            ChatRole::User,
            text.to_string(),
            None,
            self.clock.now_millis(),
        );

        let mut state = lock(&self.state);
        state.push(message.clone());

        let seq = state.next_reply;
        state.next_reply += 1;

        let weak_state = Arc::downgrade(&self.state);
        let weak_clock = Arc::downgrade(&self.clock);
        let engine = self.engine.clone();
        let input = text.to_string();
        let handle = self.clock.after(
            self.reply_delay,
            Box::new(move || {
                let (Some(state), Some(clock)) = (weak_state.upgrade(), weak_clock.upgrade())
                else {
                    return;
                };
                let reply = engine.classify(&input);
                let mut state = lock(&state);
                if state.pending.remove(&seq).is_none() {
                    return;
                }
                debug!(priority = reply.priority.as_str(), "assistant replied");
                state.push(ChatMessage::new(
                    ChatRole::Assistant,
                    reply.content,
                    Some(reply.priority),
                    clock.now_millis(),
                ));
            }),
        );
        state.pending.insert(seq, handle);

        Some(message)
    }

    /// Conversation so far, oldest first. Only the newest `history_limit`
    /// messages are kept.
    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.state).messages.clone()
    }

    /// Whether a reply is still pending.
    pub fn is_typing(&self) -> bool {
        !lock(&self.state).pending.is_empty()
    }

    /// Cancel pending replies and empty the conversation.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        for (_, handle) in std::mem::take(&mut state.pending) {
            handle.cancel();
        }
        state.messages.clear();
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        for (_, handle) in std::mem::take(&mut state.pending) {
            handle.cancel();
        }
    }
}

fn lock(state: &Mutex<ChatState>) -> MutexGuard<'_, ChatState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
