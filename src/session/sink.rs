//! Question output
//!
//! A [`QuestionSink`] receives each resolved question. [`DryRunSink`] prints
//! it; [`TypingSink`] types it through a [`Keyboard`] at human pace.

use async_trait::async_trait;
use std::io::{self, Write};

use super::typing::{HumanTyper, Keyboard};
use super::Question;

/// Destination for resolved questions
#[async_trait]
pub trait QuestionSink: Send {
    /// Live sinks get a countdown before the first question and a wait
    /// between questions
    fn is_live(&self) -> bool;

    /// Deliver one question
    async fn deliver(&mut self, question: &Question) -> io::Result<()>;
}

/// Prints questions without any simulated input
#[derive(Debug)]
pub struct DryRunSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> DryRunSink<W> {
    /// Create a sink writing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the sink, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl DryRunSink<io::Stdout> {
    /// Sink printing to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

#[async_trait]
impl<W: Write + Send> QuestionSink for DryRunSink<W> {
    fn is_live(&self) -> bool {
        false
    }

    async fn deliver(&mut self, question: &Question) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", question.text)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

/// Types questions through a keyboard with human pacing
#[derive(Debug)]
pub struct TypingSink<K: Keyboard + Send> {
    keyboard: K,
    typer: HumanTyper,
}

impl<K: Keyboard + Send> TypingSink<K> {
    /// Create a sink typing into `keyboard`
    pub fn new(keyboard: K, typer: HumanTyper) -> Self {
        Self { keyboard, typer }
    }

    /// Consume the sink, returning the keyboard
    pub fn into_keyboard(self) -> K {
        self.keyboard
    }
}

#[async_trait]
impl<K: Keyboard + Send> QuestionSink for TypingSink<K> {
    fn is_live(&self) -> bool {
        true
    }

    async fn deliver(&mut self, question: &Question) -> io::Result<()> {
        println!("  [Typing...]");
        let paused = self
            .typer
            .type_message(&mut self.keyboard, &question.text)
            .await?;
        println!("  [Enter pressed OK]");

        tracing::debug!(
            topic = question.pair.topic(),
            item = question.pair.item(),
            chars = question.text.chars().count(),
            paused_ms = paused.as_millis() as u64,
            "Question typed"
        );
        Ok(())
    }
}
