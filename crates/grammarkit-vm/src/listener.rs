//! Engine events.
//!
//! The lexer and parser report what they do through a [`Listener`]. Both
//! engines are generic over the listener, so [`NoopListener`] calls compile
//! away entirely.

use grammarkit_core::{MatchChain, Token};

/// Receives engine events. `O` is the run's output: [`TokenStream`] for the
/// lexer, `[MatchChain]` for the parser.
///
/// [`TokenStream`]: grammarkit_core::TokenStream
pub trait Listener<O: ?Sized> {
    /// Input that no rule claimed: an `UNMATCHED` token while lexing, or a
    /// token consumed by no rule or by a `skip` rule while parsing.
    fn did_skip(&mut self, token: &Token);

    /// A rule matched and produced output.
    fn did_generate(&mut self, chain: &MatchChain);

    /// The run is complete.
    fn did_finish(&mut self, output: &O);
}

/// Listener that ignores everything.
pub struct NoopListener;

impl<O: ?Sized> Listener<O> for NoopListener {
    #[inline(always)]
    fn did_skip(&mut self, _token: &Token) {}

    #[inline(always)]
    fn did_generate(&mut self, _chain: &MatchChain) {}

    #[inline(always)]
    fn did_finish(&mut self, _output: &O) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Skip(Token),
    Generate(MatchChain),
    Finish,
}

/// Listener that records every event in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn skipped(&self) -> impl Iterator<Item = &Token> {
        self.events.iter().filter_map(|e| match e {
            Event::Skip(token) => Some(token),
            _ => None,
        })
    }

    pub fn generated(&self) -> impl Iterator<Item = &MatchChain> {
        self.events.iter().filter_map(|e| match e {
            Event::Generate(chain) => Some(chain),
            _ => None,
        })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.events.last(), Some(Event::Finish))
    }

    /// One line per event.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            match event {
                Event::Skip(token) => out.push_str(&format!("skip {token}\n")),
                Event::Generate(chain) => out.push_str(&format!("generate {chain}\n")),
                Event::Finish => out.push_str("finish\n"),
            }
        }
        out
    }
}

impl<O: ?Sized> Listener<O> for EventLog {
    fn did_skip(&mut self, token: &Token) {
        self.events.push(Event::Skip(token.clone()));
    }

    fn did_generate(&mut self, chain: &MatchChain) {
        self.events.push(Event::Generate(chain.clone()));
    }

    fn did_finish(&mut self, _output: &O) {
        self.events.push(Event::Finish);
    }
}
