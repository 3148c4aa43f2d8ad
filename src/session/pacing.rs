//! Countdown and inter-question waits

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use std::time::Duration;

/// Waits between questions, with a live countdown on the terminal
#[derive(Debug)]
pub struct Pacer {
    wait_min_secs: u64,
    wait_max_secs: u64,
    rng: ChaCha8Rng,
}

impl Pacer {
    /// Create a pacer waiting between `wait_min_secs` and `wait_max_secs`
    pub fn new(wait_min_secs: u64, wait_max_secs: u64) -> Self {
        Self::with_rng(wait_min_secs, wait_max_secs, ChaCha8Rng::from_entropy())
    }

    /// Create a pacer with reproducible waits
    pub fn seeded(wait_min_secs: u64, wait_max_secs: u64, seed: u64) -> Self {
        Self::with_rng(wait_min_secs, wait_max_secs, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(wait_min_secs: u64, wait_max_secs: u64, rng: ChaCha8Rng) -> Self {
        Self {
            wait_min_secs: wait_min_secs.min(wait_max_secs),
            wait_max_secs,
            rng,
        }
    }

    /// Draw the next inter-question wait
    pub fn next_wait(&mut self) -> Duration {
        Duration::from_secs(self.rng.gen_range(self.wait_min_secs..=self.wait_max_secs))
    }

    /// Wait a random duration before the next question
    pub async fn idle(&mut self) -> Duration {
        let wait = self.next_wait();
        let secs = wait.as_secs();
        if secs == 0 {
            return wait;
        }

        println!(
            "\n[IDLE] Waiting {}m {}s before next question...",
            secs / 60,
            secs % 60
        );
        tracing::debug!(wait_secs = secs, "Idling before next question");

        tick_down(secs, |remaining| {
            format!(
                "   Next question in: {:02}:{:02}  ",
                remaining / 60,
                remaining % 60
            )
        })
        .await;

        print!("\r{:30}\n", "");
        flush_stdout();
        wait
    }
}

/// Give the user `secs` seconds to focus the chat input
pub async fn countdown(secs: u64) {
    if secs == 0 {
        return;
    }

    println!("\n[WAIT] You have {secs} seconds to click into the chat input box...");
    tick_down(secs, |remaining| {
        format!("   > Starting in {remaining:2} seconds...  ")
    })
    .await;

    print!("\r   > Typing now!{:30}\n\n", "");
    flush_stdout();
}

async fn tick_down<F>(secs: u64, line: F)
where
    F: Fn(u64) -> String,
{
    for remaining in (1..=secs).rev() {
        print!("\r{}", line(remaining));
        flush_stdout();
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

fn flush_stdout() {
    // Progress lines are cosmetic; a failed flush only delays them.
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_wait_within_bounds() {
        let mut pacer = Pacer::seeded(180, 300, 42);
        for _ in 0..100 {
            let secs = pacer.next_wait().as_secs();
            assert!((180..=300).contains(&secs));
        }
    }

    #[test]
    fn test_inverted_bounds_are_clamped() {
        let mut pacer = Pacer::seeded(10, 5, 1);
        assert!(pacer.next_wait().as_secs() <= 5);
    }

    #[tokio::test]
    async fn test_zero_wait_returns_immediately() {
        let mut pacer = Pacer::seeded(0, 0, 1);
        assert_eq!(pacer.idle().await, Duration::ZERO);
        countdown(0).await;
    }
}
