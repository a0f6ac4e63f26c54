//! Timed playback of command sequences into a key sink.
//!
//! The dispatcher owns no timing of its own: it sleeps on an injected
//! `Clock` between action offsets and hands each event to a `KeySink`.

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{info, trace, warn};

use crate::keys::{CommandSequence, KeyBindings, KeyDirection};
use crate::sexp::format_event;

// ── Clocks ─────────────────────────────────────────────────

/// Millisecond scheduler time.
pub trait Clock {
    fn now_ms(&self) -> u64;
    fn sleep_ms(&mut self, ms: u64);

    /// Sleep until `t_ms`; returns immediately if it already passed.
    fn sleep_until(&mut self, t_ms: u64) {
        let now = self.now_ms();
        if t_ms > now {
            self.sleep_ms(t_ms - now);
        }
    }
}

/// Wall clock measured from construction.
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn sleep_ms(&mut self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

/// Clock that advances instantly on sleep.
#[derive(Debug, Default, Clone)]
pub struct VirtualClock {
    now_ms: u64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn starting_at(now_ms: u64) -> Self {
        Self { now_ms }
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

// ── Sinks ──────────────────────────────────────────────────

/// Destination for synthetic key events.
pub trait KeySink {
    fn emit(&mut self, vk: u8, direction: KeyDirection) -> anyhow::Result<()>;
}

/// Dry-run sink: logs every event and injects nothing.
#[derive(Debug, Default)]
pub struct TraceSink;

impl KeySink for TraceSink {
    fn emit(&mut self, vk: u8, direction: KeyDirection) -> anyhow::Result<()> {
        info!("key 0x{:02X} {}", vk, direction.as_str());
        Ok(())
    }
}

/// Writes one s-expression event line per key event, for an external
/// injector process reading the other end.
pub struct SexpSink<W: Write> {
    out: W,
}

impl<W: Write> SexpSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> KeySink for SexpSink<W> {
    fn emit(&mut self, vk: u8, direction: KeyDirection) -> anyhow::Result<()> {
        let vk = vk.to_string();
        let dir = format!(":{}", direction.as_str());
        let line = format_event("key", &[("vk", &vk), ("dir", &dir)]);
        writeln!(self.out, "{}", line).context("writing key event")?;
        self.out.flush().context("flushing key event")?;
        Ok(())
    }
}

// ── Playback ───────────────────────────────────────────────

/// Result of playing one sequence.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    pub emitted: u64,
    pub failures: u64,
    /// Whether the sink accepted each action, in sequence order.
    pub accepted: Vec<bool>,
}

/// Play `seq` from the clock's current time: each action at its offset,
/// then the settle pause. Sink errors are logged and counted; the
/// sequence always runs to completion.
pub fn play<S, C>(
    seq: &CommandSequence,
    bindings: &KeyBindings,
    sink: &mut S,
    clock: &mut C,
) -> PlayOutcome
where
    S: KeySink + ?Sized,
    C: Clock + ?Sized,
{
    let mut outcome = PlayOutcome {
        accepted: Vec::with_capacity(seq.actions.len()),
        ..Default::default()
    };
    let mut cursor = 0;
    for action in &seq.actions {
        if action.offset_ms > cursor {
            clock.sleep_ms(action.offset_ms - cursor);
            cursor = action.offset_ms;
        }
        let vk = bindings.vk(action.key);
        trace!(
            "+{}ms {} ({}) {}",
            action.offset_ms,
            action.key.as_str(),
            vk,
            action.direction.as_str()
        );
        match sink.emit(vk, action.direction) {
            Ok(()) => {
                outcome.emitted += 1;
                outcome.accepted.push(true);
            }
            Err(e) => {
                warn!(
                    "key sink failed on {} {}: {:#}",
                    action.key.as_str(),
                    action.direction.as_str(),
                    e
                );
                outcome.failures += 1;
                outcome.accepted.push(false);
            }
        }
    }
    if seq.settle_ms > 0 {
        clock.sleep_ms(seq.settle_ms);
    }
    outcome
}

// ── Test fakes ─────────────────────────────────────────────

/// Sink that records events and can fail selected calls.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub events: Vec<(u8, KeyDirection)>,
    /// Emit calls that should fail, by call index.
    pub fail_on: Vec<usize>,
    calls: usize,
}

#[cfg(test)]
impl KeySink for RecordingSink {
    fn emit(&mut self, vk: u8, direction: KeyDirection) -> anyhow::Result<()> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_on.contains(&call) {
            anyhow::bail!("injected failure on call {}", call);
        }
        self.events.push((vk, direction));
        Ok(())
    }
}

/// Clock-aware recording: pairs each event with the virtual time.
#[cfg(test)]
pub(crate) struct TimedSink<'a> {
    pub clock: &'a std::cell::Cell<u64>,
    pub events: Vec<(u8, KeyDirection, u64)>,
}

#[cfg(test)]
impl KeySink for TimedSink<'_> {
    fn emit(&mut self, vk: u8, direction: KeyDirection) -> anyhow::Result<()> {
        self.events.push((vk, direction, self.clock.get()));
        Ok(())
    }
}

/// Virtual clock whose time is observable by a `TimedSink`.
#[cfg(test)]
pub(crate) struct SharedClock<'a> {
    pub now: &'a std::cell::Cell<u64>,
}

#[cfg(test)]
impl Clock for SharedClock<'_> {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

// ── Tests ──────────────────────────────────────────────────
