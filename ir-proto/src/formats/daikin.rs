//! DAIKIN: structurally the same frame shape as AEHA (16-bit custom, 4
//! parity bits, then command bits, sent twice) but with longer data
//! timings and a payload the decoder always reports in full, with no
//! minimum-bytes-decoded guard.

use crate::analyzer::{Analyzer, FlipResult, FormatConfig, FormatModule, Signal, State, Window};
use crate::bitbuf::get_bit;
use crate::error::RejectReason;
use crate::forger::Forger;
use crate::FormatTag;

use super::format_util::xor_fold_nibbles;

const LEADER_H: Window = Window::new(4_500, 5_500);
const LEADER_L: Window = Window::new(1_900, 2_500);
const DATA_H: Window = Window::new(300, 500);
const DATA0_L: Window = Window::new(600, 1_000);
const DATA1_L: Window = Window::new(1_500, 2_100);
const TRAILER_L: Window = Window::new(8_000, 1_000_000);
const CYCLE_LEN: Window = Window::new(0, 1_000_000);

const LEADER_H_TYP: u32 = 5_000;
const LEADER_L_TYP: u32 = 2_200;
const DATA_H_TYP: u32 = 400;
const DATA0_L_TYP: u32 = 800;
const DATA1_L_TYP: u32 = 1_800;
const TRAILER_L_TYP: u32 = 30_000;

static CONFIG: FormatConfig = FormatConfig {
    tag: FormatTag::Daikin,
    data_len: 10,
    leader_h: LEADER_H,
    leader_l: LEADER_L,
    trailer_l: TRAILER_L,
    cycle_len: CYCLE_LEN,
};

pub(crate) struct DaikinModule;

impl FormatModule for DaikinModule {
    fn config(&self) -> &'static FormatConfig {
        &CONFIG
    }

    fn on_flip_up(&self, az: &Analyzer) -> FlipResult {
        match az.state {
            State::Leader => classify(LEADER_L.contains(az.dur), Signal::Leader, az),
            State::Data => {
                if DATA0_L.contains(az.dur) {
                    Ok(Some(Signal::Data0))
                } else if DATA1_L.contains(az.dur) {
                    Ok(Some(Signal::Data1))
                } else {
                    low_reject(az)
                }
            }
            State::Trailer => Ok(Some(Signal::Trailer)),
            _ => low_reject(az),
        }
    }

    fn on_flip_dn(&self, az: &Analyzer) -> FlipResult {
        match az.state {
            State::Leader => {
                if LEADER_H.contains(az.dur) {
                    Ok(None)
                } else {
                    high_reject(az)
                }
            }
            State::Data => {
                if DATA_H.contains(az.dur) {
                    Ok(None)
                } else {
                    high_reject(az)
                }
            }
            _ => high_reject(az),
        }
    }

    fn on_end_cycle(
        &self,
        az: &Analyzer,
        accum: &mut [u8],
        tmp: &[u8],
        text: &mut String,
    ) -> Result<(), RejectReason> {
        if az.cycle == 0 {
            let custom = ((tmp[1] as u16) << 8) | tmp[0] as u16;
            let parity = tmp[2] & 0xf;
            let parity_calc = xor_fold_nibbles(custom, 4);
            if parity_calc != parity {
                log::debug!(
                    "DAIKIN: parity nibble {:x} does not match computed {:x}",
                    parity,
                    parity_calc
                );
            }
            let cmd = reconstruct_cmd(tmp);
            text.push_str(&format!("custom={:04x} cmd={:07x}", custom, cmd));
            let len = CONFIG.data_len.min(tmp.len());
            accum[..len].copy_from_slice(&tmp[..len]);
        } else {
            let len = CONFIG.data_len.min(tmp.len());
            if tmp[..len] != accum[..len] {
                let custom = ((tmp[1] as u16) << 8) | tmp[0] as u16;
                let cmd = reconstruct_cmd(tmp);
                text.push_str(&format!(" + custom={:04x} cmd={:07x}", custom, cmd));
            }
        }
        Ok(())
    }
}

fn reconstruct_cmd(tmp: &[u8]) -> u32 {
    ((tmp[2] as u32) >> 4)
        | ((tmp[3] as u32) << 4)
        | ((tmp[4] as u32) << 12)
        | ((tmp[5] as u32) << 20)
}

fn classify(ok: bool, signal: Signal, az: &Analyzer) -> FlipResult {
    if ok {
        Ok(Some(signal))
    } else {
        low_reject(az)
    }
}

fn low_reject(az: &Analyzer) -> FlipResult {
    Err(RejectReason::LowOutOfRange {
        tag: CONFIG.tag,
        state: az.state,
        dur_us: az.dur,
    })
}

fn high_reject(az: &Analyzer) -> FlipResult {
    Err(RejectReason::HighOutOfRange {
        tag: CONFIG.tag,
        state: az.state,
        dur_us: az.dur,
    })
}

fn emit_bit(fger: &mut Forger, is_one: bool) {
    if is_one {
        fger.emit_pulse(DATA_H_TYP, DATA1_L_TYP);
    } else {
        fger.emit_pulse(DATA_H_TYP, DATA0_L_TYP);
    }
}

/// Synthesizes two identical DAIKIN frames, same layout as AEHA but
/// with DAIKIN's own timings and a fixed trailer space.
pub fn forge(buf: &mut [u8], custom: u16, cmd: u32) {
    let custom_bytes = [(custom & 0xff) as u8, (custom >> 8) as u8];
    let parity = xor_fold_nibbles(custom, 4);
    let mut fger = Forger::new(buf);

    for _frame in 0..2 {
        fger.emit_pulse(LEADER_H_TYP, LEADER_L_TYP);
        for idx in 0..16 {
            emit_bit(&mut fger, get_bit(&custom_bytes, idx) != 0);
        }
        for idx in 0..4 {
            emit_bit(&mut fger, (parity >> idx) & 1 != 0);
        }
        let cmd_bytes = cmd.to_le_bytes();
        for idx in 0..28 {
            emit_bit(&mut fger, get_bit(&cmd_bytes, idx) != 0);
        }
        fger.emit_dur(1, DATA_H_TYP);
        fger.emit_dur(0, TRAILER_L_TYP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer;

    #[test]
    fn forge_then_analyze_round_trips() {
        let mut buf = [0u8; 256];
        forge(&mut buf, 0x1102, 0x0003_1100);
        let summary = analyzer::run(&buf, &DaikinModule).expect("DAIKIN waveform should decode");
        assert!(summary.starts_with("custom=1102"));
    }
}
