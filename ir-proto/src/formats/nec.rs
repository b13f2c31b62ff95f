//! NEC: 16-bit custom code plus an 8-bit command validated against its
//! own bitwise complement, followed by a repeat pulse for held keys.

use crate::analyzer::{Analyzer, FlipResult, FormatConfig, FormatModule, Signal, State, Window};
use crate::bitbuf::get_bit;
use crate::error::RejectReason;
use crate::forger::Forger;
use crate::FormatTag;

const LEADER_H: Window = Window::new(8_000, 10_000);
const LEADER_L: Window = Window::new(4_000, 5_000);
const DATA_H: Window = Window::new(500, 620);
const DATA0_L: Window = Window::new(500, 620);
const DATA1_L: Window = Window::new(1_600, 1_800);
const REPEATER_H: Window = Window::new(8_000, 10_000);
const REPEATER_L: Window = Window::new(2_100, 2_400);
const TRAILER_L: Window = Window::new(36_000, 150_000);
const CYCLE_LEN: Window = Window::new(80_000, 150_000);

const LEADER_H_TYP: u32 = 9_000;
const LEADER_L_TYP: u32 = 4_500;
const DATA_H_TYP: u32 = 560;
const DATA0_L_TYP: u32 = 560;
const DATA1_L_TYP: u32 = 1_690;
const CYCLE_LEN_TYP: u32 = 108_000;
const REPEATER_H_TYP: u32 = 9_000;
const REPEATER_L_TYP: u32 = 2_250;

static CONFIG: FormatConfig = FormatConfig {
    tag: FormatTag::Nec,
    data_len: 4,
    leader_h: LEADER_H,
    leader_l: LEADER_L,
    trailer_l: TRAILER_L,
    cycle_len: CYCLE_LEN,
};

pub(crate) struct NecModule;

impl FormatModule for NecModule {
    fn config(&self) -> &'static FormatConfig {
        &CONFIG
    }

    fn on_flip_up(&self, az: &Analyzer) -> FlipResult {
        match az.state {
            State::Leader if az.cycle == 0 => {
                classify(LEADER_L.contains(az.dur), Signal::Leader, az, false)
            }
            State::Leader => classify(REPEATER_L.contains(az.dur), Signal::RepeaterLow, az, false),
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
            State::Leader => validate_high(LEADER_H.contains(az.dur), az),
            State::Data => validate_high(DATA_H.contains(az.dur), az),
            State::Repeater => classify(DATA_H.contains(az.dur), Signal::RepeaterHigh, az, true),
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
            let custom = ((tmp[0] as u16) << 8) | tmp[1] as u16;
            let cmd = tmp[2];
            let cmd_inv = tmp[3];
            if cmd != !cmd_inv {
                return Err(RejectReason::ComplementMismatch { tag: CONFIG.tag });
            }
            text.push_str(&format!("custom={:04x} cmd={:02x}", custom, cmd));
            accum[..4].copy_from_slice(&tmp[..4]);
        } else if tmp[..4] != accum[..4] {
            return Err(RejectReason::CycleMismatch { tag: CONFIG.tag });
        }
        Ok(())
    }
}

fn classify(ok: bool, signal: Signal, az: &Analyzer, high: bool) -> FlipResult {
    if ok {
        Ok(Some(signal))
    } else if high {
        high_reject(az)
    } else {
        low_reject(az)
    }
}

fn validate_high(ok: bool, az: &Analyzer) -> FlipResult {
    if ok {
        Ok(None)
    } else {
        high_reject(az)
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

/// Synthesizes a full NEC waveform: leader, 16-bit `custom` (high byte
/// first), 8-bit `cmd`, its bitwise complement, a stop mark, padding
/// out to a typical cycle length, then a repeat pulse and a final stop
/// mark — matching a real remote holding a key down for one repeat.
pub fn forge(buf: &mut [u8], custom: u16, cmd: u8) {
    let custom_bytes = [(custom >> 8) as u8, (custom & 0xff) as u8];
    let cmd_inv = !cmd;
    let mut fger = Forger::new(buf);

    fger.emit_pulse(LEADER_H_TYP, LEADER_L_TYP);
    for idx in 0..16 {
        emit_bit(&mut fger, get_bit(&custom_bytes, idx) != 0);
    }
    for idx in 0..8 {
        emit_bit(&mut fger, get_bit(&[cmd], idx) != 0);
    }
    for idx in 0..8 {
        emit_bit(&mut fger, get_bit(&[cmd_inv], idx) != 0);
    }
    fger.emit_dur(1, DATA_H_TYP);
    fger.emit_until(0, CYCLE_LEN_TYP);
    fger.emit_pulse(REPEATER_H_TYP, REPEATER_L_TYP);
    fger.emit_dur(1, DATA_H_TYP);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer;

    #[test]
    fn forge_then_analyze_round_trips() {
        let mut buf = [0u8; 256];
        forge(&mut buf, 0x10ef, 0x1a);
        let summary = analyzer::run(&buf, &NecModule).expect("NEC waveform should decode");
        assert_eq!(summary, "custom=10ef cmd=1a");
    }

    #[test]
    fn rejects_a_flat_buffer() {
        let buf = [0u8; 256];
        assert!(analyzer::run(&buf, &NecModule).is_err());
    }
}
