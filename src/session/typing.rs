//! Human-paced typing
//!
//! [`HumanTyper`] feeds text to a [`Keyboard`] one character at a time with
//! randomized delays: a base keystroke delay, a longer pause after
//! punctuation, and an occasional "thinking" pause at whitespace. Lines are
//! separated with a soft newline so a multi-line question is submitted as a
//! single message.
//!
//! Only a terminal keyboard is provided. Injecting keystrokes into another
//! application is left to other [`Keyboard`] implementations.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::{self, Write};
use std::time::Duration;

use crate::config::TypingConfig;

/// Characters followed by a punctuation pause
const PUNCTUATION: &[char] = &[',', '.', ';', ':', '!', '?'];

/// Destination for simulated keystrokes
pub trait Keyboard {
    /// Re-focus the input before typing
    fn focus(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Type text without submitting
    fn type_text(&mut self, text: &str) -> io::Result<()>;

    /// Insert a line break without submitting the message
    fn soft_newline(&mut self) -> io::Result<()>;

    /// Submit the message
    fn submit(&mut self) -> io::Result<()>;
}

/// Keyboard that echoes keystrokes to a writer
#[derive(Debug)]
pub struct TerminalKeyboard<W: Write> {
    out: W,
}

impl<W: Write> TerminalKeyboard<W> {
    /// Create a keyboard writing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the keyboard, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalKeyboard<io::Stdout> {
    /// Keyboard echoing to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Keyboard for TerminalKeyboard<W> {
    fn type_text(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn soft_newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    fn submit(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

/// Paces keystrokes according to a [`TypingConfig`]
#[derive(Debug)]
pub struct HumanTyper {
    config: TypingConfig,
    rng: ChaCha8Rng,
}

impl HumanTyper {
    /// Create a typer with an entropy-seeded random source
    pub fn new(config: TypingConfig) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Create a typer with reproducible delays
    pub fn seeded(config: TypingConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Delay to wait after typing `ch`
    pub fn delay_after(&mut self, ch: char) -> Duration {
        let cfg = &self.config;
        let mut millis = self.rng.gen_range(cfg.key_delay_min_ms..=cfg.key_delay_max_ms);

        if PUNCTUATION.contains(&ch) {
            millis += self
                .rng
                .gen_range(cfg.punctuation_pause_min_ms..=cfg.punctuation_pause_max_ms);
        } else if ch.is_whitespace() && self.rng.gen_bool(cfg.thinking_pause_probability) {
            millis += self
                .rng
                .gen_range(cfg.thinking_pause_min_ms..=cfg.thinking_pause_max_ms);
        }

        Duration::from_millis(millis)
    }

    /// Pause before pressing submit
    pub fn submit_delay(&mut self) -> Duration {
        let cfg = &self.config;
        Duration::from_millis(
            self.rng
                .gen_range(cfg.submit_delay_min_ms..=cfg.submit_delay_max_ms),
        )
    }

    /// Type `text` into `keyboard` and submit it
    ///
    /// Returns the total time spent pausing.
    pub async fn type_message<K: Keyboard + ?Sized>(
        &mut self,
        keyboard: &mut K,
        text: &str,
    ) -> io::Result<Duration> {
        let mut paused = Duration::ZERO;
        let mut buf = [0u8; 4];

        keyboard.focus()?;

        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                keyboard.soft_newline()?;
            }
            for ch in line.chars() {
                keyboard.type_text(ch.encode_utf8(&mut buf))?;
                paused += pause(self.delay_after(ch)).await;
            }
        }

        paused += pause(self.submit_delay()).await;
        keyboard.submit()?;

        Ok(paused)
    }
}

async fn pause(duration: Duration) -> Duration {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
    duration
}
