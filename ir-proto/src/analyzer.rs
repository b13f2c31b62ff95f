//! The shared decode driver: a single state machine that every format
//! module plugs into by implementing [`FormatModule`].
//!
//! The driver feeds the waveform one 100us sample at a time. On each
//! flip (a sample that differs from the previous level) it asks the
//! format module to classify the run that just ended. Independently,
//! on every sample, it first checks for a trailer (an overlong low run
//! while decoding data) before giving the module a chance to classify
//! the sample itself; this is how sample-driven formats like SONY and
//! KOIZUMI recognize bit boundaries that a flip alone cannot locate.
//!
//! The trailer token is not a value the caller can tell apart by
//! content: the *same* token means different things depending on which
//! of the two call sites produced it. From a flip callback, it re-arms
//! the leader search (the module saw a long low run immediately after
//! a mark, and wants to go back to looking for a new leader). From the
//! per-sample trailer check, it means a cycle has just finished
//! decoding and should be handed to [`FormatModule::on_end_cycle`].

use crate::error::RejectReason;
use crate::{FormatTag, MAX_PAYLOAD_BYTES, TICK_US};
use crate::bitbuf::{get_bit, set_bit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    Leader,
    Data,
    Trailer,
    Marker,
    Repeater,
}

/// A classified token. `None` (inside the `Result`) means "this run was
/// valid but carries no token" — e.g. a mark whose length merely
/// confirms a leader, with nothing left to report.
pub(crate) type FlipResult = Result<Option<Signal>, RejectReason>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Leader,
    Trailer,
    Data0,
    Data1,
    Marker,
    RepeaterLow,
    RepeaterHigh,
}

/// An inclusive `[min, max]` microsecond window used throughout the
/// format modules to classify a run's duration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Window {
    pub min: u32,
    pub max: u32,
}

impl Window {
    pub const fn new(min: u32, max: u32) -> Self {
        Window { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The bounds every format shares: leader mark/space, trailer space and
/// overall cycle length. Bit-timing windows beyond these are
/// format-specific and live as constants in each format module, since
/// the reference protocols don't agree on how many distinct data
/// timing classes they need (NEC distinguishes data0/data1 by the
/// space only, SONY by the mark only, KOIZUMI needs both).
#[derive(Debug, Clone, Copy)]
pub(crate) struct FormatConfig {
    pub tag: FormatTag,
    pub data_len: usize,
    pub leader_h: Window,
    pub leader_l: Window,
    pub trailer_l: Window,
    pub cycle_len: Window,
}

/// Read-only state a format module consults while classifying the
/// current run. Exposed to every callback with the same shape the
/// reference analyzer struct has: the run that just ended (`dur`), the
/// run before it (`dur_prev`), and how far into the current cycle and
/// payload decoding has progressed.
pub(crate) struct Analyzer<'c> {
    pub cfg: &'c FormatConfig,
    pub state: State,
    pub level: u8,
    pub dur: u32,
    pub dur_prev: u32,
    pub dur_cycle: u32,
    pub dst_idx: usize,
    pub cycle: u32,
}

/// Per-format hooks into the shared driver. Only [`on_flip_up`],
/// [`on_flip_dn`] and [`on_end_cycle`] are mandatory; sample-driven
/// formats also implement [`on_each_sample`]. None of the five built-in
/// formats need [`on_exit`] — the reference implementation never wires
/// it up for any of them — but the driver still calls it, matching the
/// full termination sequence described for the format architecture.
///
/// [`on_flip_up`]: FormatModule::on_flip_up
/// [`on_flip_dn`]: FormatModule::on_flip_dn
/// [`on_end_cycle`]: FormatModule::on_end_cycle
/// [`on_each_sample`]: FormatModule::on_each_sample
/// [`on_exit`]: FormatModule::on_exit
pub(crate) trait FormatModule {
    fn config(&self) -> &'static FormatConfig;

    /// Called when a low (space) run just ended, i.e. the waveform just
    /// flipped from low to high.
    fn on_flip_up(&self, az: &Analyzer) -> FlipResult;

    /// Called when a high (mark) run just ended, i.e. the waveform just
    /// flipped from high to low.
    fn on_flip_dn(&self, az: &Analyzer) -> FlipResult;

    /// Called on every sample while decoding, after the shared trailer
    /// check has had a chance to fire. Formats that classify bits
    /// entirely from flips leave this at its default.
    fn on_each_sample(&self, _az: &Analyzer) -> FlipResult {
        Ok(None)
    }

    /// A cycle's worth of payload bits has been collected in `tmp`.
    /// Implementations validate it, extract fields for `text`, and fold
    /// it into `accum` (the running first-cycle payload used to check
    /// that repeats agree).
    fn on_end_cycle(
        &self,
        az: &Analyzer,
        accum: &mut [u8],
        tmp: &[u8],
        text: &mut String,
    ) -> Result<(), RejectReason>;

    /// Runs once after the whole buffer has been consumed and at least
    /// one cycle decoded successfully.
    fn on_exit(&self, _az: &Analyzer, _accum: &[u8], _text: &mut String) -> Result<(), RejectReason> {
        Ok(())
    }
}

fn try_detect_trailer(az: &Analyzer) -> Option<Signal> {
    if az.state == State::Data
        && az.level == 0
        && az.dur >= az.cfg.trailer_l.min
        && az.dur_cycle >= az.cfg.cycle_len.min
    {
        Some(Signal::Trailer)
    } else {
        None
    }
}

fn write_bit(tmp: &mut [u8], az: &mut Analyzer, bit_is_one: bool) -> Result<(), RejectReason> {
    if az.dst_idx >= MAX_PAYLOAD_BYTES * 8 {
        return Err(RejectReason::PayloadOverflow {
            tag: az.cfg.tag,
            max: MAX_PAYLOAD_BYTES,
        });
    }
    if bit_is_one {
        set_bit(tmp, az.dst_idx);
    }
    az.dst_idx += 1;
    Ok(())
}

/// Runs a single format module against `buf` end to end, returning the
/// human-readable summary it built if the waveform matches.
pub(crate) fn run(buf: &[u8], module: &dyn FormatModule) -> Result<String, RejectReason> {
    let cfg = module.config();
    let total_bits = buf.len() * 8;

    let mut az = Analyzer {
        cfg,
        state: State::Trailer,
        level: 0,
        dur: cfg.trailer_l.min,
        dur_prev: 0,
        dur_cycle: cfg.cycle_len.min,
        dst_idx: 0,
        cycle: 0,
    };
    let mut accum = [0u8; MAX_PAYLOAD_BYTES];
    let mut tmp = [0u8; MAX_PAYLOAD_BYTES];
    let mut text = String::new();

    for idx in 0..total_bits {
        let bit = get_bit(buf, idx);

        if matches!(az.state, State::Data | State::Trailer) {
            az.dur_cycle += TICK_US;
        }

        if bit == az.level {
            az.dur += TICK_US;
        } else {
            let outcome = if az.level == 0 {
                module.on_flip_up(&az)?
            } else {
                module.on_flip_dn(&az)?
            };

            if let Some(signal) = outcome {
                match signal {
                    Signal::Leader => {
                        az.state = State::Data;
                        az.dst_idx = 0;
                        az.dur_cycle = az.dur_prev + az.dur;
                    }
                    Signal::Trailer => {
                        az.state = State::Leader;
                        az.dur_cycle = TICK_US;
                    }
                    Signal::Marker => {}
                    Signal::RepeaterLow => az.state = State::Repeater,
                    Signal::RepeaterHigh => az.state = State::Trailer,
                    Signal::Data0 => write_bit(&mut tmp, &mut az, false)?,
                    Signal::Data1 => write_bit(&mut tmp, &mut az, true)?,
                }
            }

            az.level = bit;
            az.dur_prev = az.dur;
            az.dur = TICK_US;
        }

        let sample_outcome = match try_detect_trailer(&az) {
            Some(sig) => Some(sig),
            None => module.on_each_sample(&az)?,
        };

        if let Some(signal) = sample_outcome {
            match signal {
                Signal::Leader => {
                    az.state = State::Data;
                    az.dst_idx = 0;
                    az.dur_cycle = az.dur_prev + az.dur;
                }
                Signal::Trailer => {
                    module.on_end_cycle(&az, &mut accum, &tmp, &mut text)?;
                    az.cycle += 1;
                    az.state = State::Trailer;
                }
                Signal::Marker => {}
                Signal::Data0 => write_bit(&mut tmp, &mut az, false)?,
                Signal::Data1 => write_bit(&mut tmp, &mut az, true)?,
                Signal::RepeaterLow | Signal::RepeaterHigh => {}
            }
        }
    }

    if az.cycle == 0 {
        return Err(RejectReason::NoCycleDecoded { tag: cfg.tag });
    }

    module.on_exit(&az, &accum, &mut text)?;
    Ok(text)
}
