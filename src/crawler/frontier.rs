//! BFS frontier for a single domain crawl
//!
//! This module handles:
//! - FIFO ordering of canonical URLs to crawl
//! - Deduplication against both queued and already-crawled URLs
//! - The page budget: queued plus dispatched URLs never exceed `max_pages`

use std::collections::{HashSet, VecDeque};

/// Lifecycle of a frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierState {
    /// Nothing dispatched yet
    Idle,
    /// At least one URL dispatched, more may follow
    Draining,
    /// Queue empty or budget reached; no further URLs will be dispatched
    Exhausted,
}

/// Result of offering a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// Already crawled, already queued or seen as a redirect target
    AlreadyKnown,
    /// Queued plus dispatched URLs already fill the page budget
    BudgetFull,
    /// The frontier is exhausted
    Closed,
}

/// Frontier manages the BFS queue and the seen set
///
/// Invariants:
/// - a URL is dispatched at most once
/// - `dispatched + queued <= max_pages` for discovered links
/// - once exhausted, the queue is discarded and stays empty
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
    seen: HashSet<String>,
    dispatched: usize,
    max_pages: usize,
    state: FrontierState,
}

impl Frontier {
    pub fn new(max_pages: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            seen: HashSet::new(),
            dispatched: 0,
            max_pages,
            state: FrontierState::Idle,
        }
    }

    /// Queues a seed URL
    ///
    /// Seeds bypass the budget check; `next_url` still stops at `max_pages`.
    pub fn seed(&mut self, url: impl Into<String>) -> EnqueueOutcome {
        let url = url.into();
        if self.state == FrontierState::Exhausted {
            return EnqueueOutcome::Closed;
        }
        if self.is_known(&url) {
            return EnqueueOutcome::AlreadyKnown;
        }
        self.push(url);
        EnqueueOutcome::Queued
    }

    /// Queues a URL discovered on a crawled page
    pub fn enqueue(&mut self, url: &str) -> EnqueueOutcome {
        if self.state == FrontierState::Exhausted {
            return EnqueueOutcome::Closed;
        }
        if self.is_known(url) {
            return EnqueueOutcome::AlreadyKnown;
        }
        if !self.has_budget() {
            return EnqueueOutcome::BudgetFull;
        }
        self.push(url.to_string());
        EnqueueOutcome::Queued
    }

    /// Pops the next unseen URL, marking it seen and dispatched
    ///
    /// Returns None and exhausts the frontier once the budget is spent or the
    /// queue runs dry.
    pub fn next_url(&mut self) -> Option<String> {
        if self.state == FrontierState::Exhausted {
            return None;
        }

        while self.dispatched < self.max_pages {
            let Some(url) = self.queue.pop_front() else {
                break;
            };
            self.queued.remove(&url);

            if !self.seen.insert(url.clone()) {
                tracing::trace!("Skipping already crawled {}", url);
                continue;
            }

            self.dispatched += 1;
            self.state = FrontierState::Draining;
            return Some(url);
        }

        self.exhaust();
        None
    }

    /// Records a URL as crawled without dispatching it, e.g. a redirect target
    ///
    /// A queued copy is dropped so it stops holding a budget slot.
    pub fn mark_seen(&mut self, url: &str) {
        self.seen.insert(url.to_string());
        if self.queued.remove(url) {
            self.queue.retain(|queued| queued != url);
        }
    }

    pub fn is_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Whether another discovered URL still fits in the budget
    pub fn has_budget(&self) -> bool {
        self.dispatched + self.queue.len() < self.max_pages
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    pub fn state(&self) -> FrontierState {
        self.state
    }

    fn is_known(&self, url: &str) -> bool {
        self.seen.contains(url) || self.queued.contains(url)
    }

    fn push(&mut self, url: String) {
        self.queued.insert(url.clone());
        self.queue.push_back(url);
    }

    fn exhaust(&mut self) {
        if !self.queue.is_empty() {
            tracing::debug!("Discarding {} queued URL(s) at page budget", self.queue.len());
        }
        self.queue.clear();
        self.queued.clear();
        self.state = FrontierState::Exhausted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new(10);
        frontier.seed("https://a.com/");
        frontier.enqueue("https://a.com/1");
        frontier.enqueue("https://a.com/2");

        assert_eq!(frontier.state(), FrontierState::Idle);
        assert_eq!(frontier.next_url().as_deref(), Some("https://a.com/"));
        assert_eq!(frontier.state(), FrontierState::Draining);
        assert_eq!(frontier.next_url().as_deref(), Some("https://a.com/1"));
        assert_eq!(frontier.next_url().as_deref(), Some("https://a.com/2"));
        assert_eq!(frontier.next_url(), None);
        assert_eq!(frontier.state(), FrontierState::Exhausted);
    }

    #[test]
    fn test_dedup_queued_and_seen() {
        let mut frontier = Frontier::new(10);
        assert_eq!(frontier.seed("https://a.com/"), EnqueueOutcome::Queued);
        assert_eq!(frontier.enqueue("https://a.com/"), EnqueueOutcome::AlreadyKnown);

        frontier.next_url();
        assert_eq!(frontier.enqueue("https://a.com/"), EnqueueOutcome::AlreadyKnown);
        assert!(frontier.is_seen("https://a.com/"));
    }

    #[test]
    fn test_budget_counts_dispatched_and_queued() {
        let mut frontier = Frontier::new(3);
        frontier.seed("https://a.com/");
        frontier.next_url();

        assert_eq!(frontier.enqueue("https://a.com/1"), EnqueueOutcome::Queued);
        assert_eq!(frontier.enqueue("https://a.com/2"), EnqueueOutcome::Queued);
        assert!(!frontier.has_budget());
        assert_eq!(frontier.enqueue("https://a.com/3"), EnqueueOutcome::BudgetFull);
        assert_eq!(frontier.len(), 2);
    }

    #[test]
    fn test_single_page_budget() {
        let mut frontier = Frontier::new(1);
        frontier.seed("https://a.com/");
        frontier.seed("https://a.com/other");

        assert!(frontier.next_url().is_some());
        assert_eq!(frontier.next_url(), None);
        assert_eq!(frontier.dispatched(), 1);
        assert!(frontier.is_empty());
        assert_eq!(frontier.enqueue("https://a.com/x"), EnqueueOutcome::Closed);
    }

    #[test]
    fn test_redirect_target_not_dispatched() {
        let mut frontier = Frontier::new(5);
        frontier.seed("http://a.com/");
        frontier.enqueue("https://a.com/");

        assert_eq!(frontier.next_url().as_deref(), Some("http://a.com/"));
        frontier.mark_seen("https://a.com/");
        assert_eq!(frontier.next_url(), None);
        assert_eq!(frontier.dispatched(), 1);
    }

    #[test]
    fn test_redirect_target_frees_budget() {
        let mut frontier = Frontier::new(3);
        frontier.seed("https://a.com/");
        frontier.next_url();
        frontier.enqueue("https://a.com/a");
        frontier.enqueue("https://a.com/b");
        assert!(!frontier.has_budget());

        assert_eq!(frontier.next_url().as_deref(), Some("https://a.com/a"));
        frontier.mark_seen("https://a.com/b");

        assert!(frontier.is_empty());
        assert_eq!(frontier.enqueue("https://a.com/c"), EnqueueOutcome::Queued);
        assert_eq!(frontier.next_url().as_deref(), Some("https://a.com/c"));
        assert_eq!(frontier.next_url(), None);
        assert_eq!(frontier.dispatched(), 3);
    }
}
