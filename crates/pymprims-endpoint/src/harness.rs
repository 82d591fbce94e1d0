//! A parent and a child wired together over in-memory documents.
//!
//! The harness plays the browser: it carries posted strings across the frame
//! boundary, stamps them with the sender's origin, and feeds timer events to
//! the endpoint whose clock produced them.

use pymprims_host::{Host, HostEvent, InboundMessage, MemoryFrame, MemoryPage};
use pymprims_wire::decode;
use serde::Serialize;

use crate::child::Child;
use crate::config::{ChildConfig, ParentConfig};
use crate::error::Result;
use crate::parent::Parent;

/// Upper bound on delivery rounds in one [`Harness::pump`].
const MAX_PUMP_ROUNDS: usize = 64;

/// Which way a message travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    ToChild,
    ToParent,
}

/// One delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub direction: Direction,
    pub at_ms: u64,
    pub message_type: String,
    pub payload: String,
    pub wire: String,
}

/// Layout and configuration for a [`Harness`].
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub container_id: String,
    pub container_top: f64,
    pub container_width: f64,
    pub child_url: String,
    pub content_height: i64,
    pub page_url: String,
    pub page_title: String,
    pub parent_origin: String,
    pub child_origin: String,
    pub parent: ParentConfig,
    pub child: ChildConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            container_id: "graphic".to_string(),
            container_top: 0.0,
            container_width: 800.0,
            child_url: "https://graphics.example.com/child.html".to_string(),
            content_height: 400,
            page_url: "https://news.example.com/story.html".to_string(),
            page_title: "Story".to_string(),
            parent_origin: "https://news.example.com".to_string(),
            child_origin: "https://graphics.example.com".to_string(),
            parent: ParentConfig::default(),
            child: ChildConfig::default(),
        }
    }
}

/// A connected parent and child.
#[derive(Debug)]
pub struct Harness {
    pub page: MemoryPage,
    pub frame: MemoryFrame,
    pub parent: Parent<MemoryPage>,
    pub child: Child<MemoryFrame>,
    parent_origin: String,
    child_origin: String,
    exchanges: Vec<Exchange>,
}

impl Harness {
    /// Mount the parent, load the child from the frame `src`, and deliver the
    /// boot messages.
    pub fn new(config: HarnessConfig) -> Result<Self> {
        let page = MemoryPage::new(&config.page_url, &config.page_title);
        page.add_element(
            &config.container_id,
            config.container_top,
            0.0,
            config.container_width,
        );
        let parent = Parent::new(
            page.clone(),
            &config.container_id,
            &config.child_url,
            config.parent,
        )?;

        let frame = MemoryFrame::from_src(parent.frame_src());
        frame.set_body_height(config.content_height);
        let child = Child::new(frame.clone(), config.child)?;

        let mut harness = Self {
            page,
            frame,
            parent,
            child,
            parent_origin: config.parent_origin,
            child_origin: config.child_origin,
            exchanges: Vec::new(),
        };
        harness.pump();
        Ok(harness)
    }

    /// Deliver posted messages in both directions until both sides are quiet.
    /// Returns the number delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        for _ in 0..MAX_PUMP_ROUNDS {
            let to_parent = self.frame.take_posted();
            let to_child = self.page.take_posted();
            if to_parent.is_empty() && to_child.is_empty() {
                return delivered;
            }

            for posted in to_parent {
                self.record(Direction::ToParent, &posted.message);
                let event = HostEvent::Message(InboundMessage::text(
                    self.child_origin.as_str(),
                    posted.message,
                ));
                self.parent.handle_event(&event);
                delivered += 1;
            }
            for posted in to_child {
                self.record(Direction::ToChild, &posted.message);
                let event = HostEvent::Message(InboundMessage::text(
                    self.parent_origin.as_str(),
                    posted.message,
                ));
                self.child.handle_event(&event);
                delivered += 1;
            }
        }
        tracing::warn!(rounds = MAX_PUMP_ROUNDS, "endpoints did not settle");
        delivered
    }

    /// Move both clocks forward by `ms`, firing timers in due order and
    /// pumping after each one.
    pub fn advance(&mut self, ms: u64) {
        let deadline = self.page.now_ms() + ms;
        loop {
            let page_due = self.page.next_due_ms().filter(|due| *due <= deadline);
            let frame_due = self.frame.next_due_ms().filter(|due| *due <= deadline);
            let page_first = match (page_due, frame_due) {
                (None, None) => break,
                (Some(page), Some(frame)) => page <= frame,
                (page, _) => page.is_some(),
            };

            if page_first {
                if let Some(event) = self.page.fire_next(deadline) {
                    self.frame.set_clock(self.page.now_ms());
                    self.parent.handle_event(&event);
                }
            } else if let Some(event) = self.frame.fire_next(deadline) {
                self.page.set_clock(self.frame.now_ms());
                self.child.handle_event(&event);
            }
            self.pump();
        }
        self.page.set_clock(deadline);
        self.frame.set_clock(deadline);
    }

    /// Resize the container and fire a viewport resize on the parent.
    pub fn resize(&mut self, width: f64) {
        self.page.set_element_width(self.parent.id(), width);
        self.parent.handle_event(&HostEvent::Resize);
        self.pump();
    }

    /// Scroll the parent window and fire a scroll event.
    pub fn scroll(&mut self, y: f64) {
        self.page.set_scroll_y(y);
        self.parent.handle_event(&HostEvent::Scroll);
        self.pump();
    }

    /// Every message delivered so far.
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Delivered messages of one type.
    pub fn exchanges_of(&self, message_type: &str) -> Vec<&Exchange> {
        self.exchanges
            .iter()
            .filter(|exchange| exchange.message_type == message_type)
            .collect()
    }

    fn record(&mut self, direction: Direction, wire: &str) {
        let (message_type, payload) = match decode(wire, self.parent.id()) {
            Some(message) => (message.message_type, message.payload),
            None => (String::new(), wire.to_string()),
        };
        self.exchanges.push(Exchange {
            direction,
            at_ms: self.page.now_ms(),
            message_type,
            payload,
            wire: wire.to_string(),
        });
    }
}
