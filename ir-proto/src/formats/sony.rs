//! SONY: the only built-in format whose bits are classified by mark
//! length rather than space length, and the only one (besides KOIZUMI)
//! that needs [`FormatModule::on_each_sample`] — its leader and its
//! data bits are recognized by watching the sample count of a run
//! reach an exact threshold, not by waiting for the run to end.

use crate::analyzer::{Analyzer, FlipResult, FormatConfig, FormatModule, Signal, State, Window};
use crate::bitbuf::get_bit;
use crate::error::RejectReason;
use crate::forger::Forger;
use crate::FormatTag;

const LEADER_H: Window = Window::new(2_100, 2_700);
const LEADER_L: Window = Window::new(400, 800);
const DATA0_H: Window = Window::new(400, 800);
const DATA1_H: Window = Window::new(1_000, 1_400);
const DATA_L: Window = Window::new(400, 800);
const TRAILER_L: Window = Window::new(6_000, 50_000);
const CYCLE_LEN: Window = Window::new(40_000, 50_000);

const LEADER_H_TYP: u32 = 2_400;
const LEADER_L_TYP: u32 = 600;
const DATA0_H_TYP: u32 = 600;
const DATA1_H_TYP: u32 = 1_200;
const DATA_L_TYP: u32 = 600;
const CYCLE_LEN_TYP: u32 = 45_000;
const DATA_L_MIN: u32 = 400;

static CONFIG: FormatConfig = FormatConfig {
    tag: FormatTag::Sony,
    data_len: 3,
    leader_h: LEADER_H,
    leader_l: LEADER_L,
    trailer_l: TRAILER_L,
    cycle_len: CYCLE_LEN,
};

pub(crate) struct SonyModule;

impl FormatModule for SonyModule {
    fn config(&self) -> &'static FormatConfig {
        &CONFIG
    }

    fn on_flip_up(&self, az: &Analyzer) -> FlipResult {
        match az.state {
            // The leader is recognized sample-by-sample in on_each_sample;
            // a low run ending here carries no token of its own.
            State::Leader => Ok(None),
            State::Data => {
                if DATA_L.contains(az.dur) {
                    Ok(None)
                } else {
                    low_reject(az)
                }
            }
            State::Trailer => Ok(Some(Signal::Trailer)),
            _ => Ok(None),
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
            _ => Ok(None),
        }
    }

    fn on_each_sample(&self, az: &Analyzer) -> FlipResult {
        if az.state == State::Leader && az.level == 0 && az.dur == az.cfg.leader_l.min {
            return Ok(Some(Signal::Leader));
        }
        if az.state == State::Data && az.level == 0 && az.dur == DATA_L_MIN {
            if DATA0_H.contains(az.dur_prev) {
                return Ok(Some(Signal::Data0));
            }
            if DATA1_H.contains(az.dur_prev) {
                return Ok(Some(Signal::Data1));
            }
            return Err(RejectReason::HighOutOfRange {
                tag: CONFIG.tag,
                state: az.state,
                dur_us: az.dur_prev,
            });
        }
        Ok(None)
    }

    fn on_end_cycle(
        &self,
        az: &Analyzer,
        accum: &mut [u8],
        tmp: &[u8],
        _text: &mut String,
    ) -> Result<(), RejectReason> {
        if az.cycle == 0 {
            let cmd = tmp[0] & 0x7f;
            let prod = ((tmp[2] as u16) << 9) | ((tmp[1] as u16) << 1) | ((tmp[0] as u16) >> 7);
            _text.push_str(&format!("prod={:04x} cmd={:02x}", prod, cmd));
            accum[..3].copy_from_slice(&tmp[..3]);
        } else if tmp[..3] != accum[..3] {
            return Err(RejectReason::CycleMismatch { tag: CONFIG.tag });
        }
        Ok(())
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
        fger.emit_pulse(DATA1_H_TYP, DATA_L_TYP);
    } else {
        fger.emit_pulse(DATA0_H_TYP, DATA_L_TYP);
    }
}

/// Synthesizes three identical SONY frames. `prod` packs the extended
/// command/device fields the same way the reference encoder does: a
/// 12-, 15- or 20-bit frame depending on which high bits of `prod` are
/// set.
pub fn forge(buf: &mut [u8], prod: u16, cmd: u8) {
    let concat = [
        ((prod & 1) << 7) as u8 | (cmd & 0x7f),
        ((prod & 0x1fe) >> 1) as u8,
        ((prod & 0x1e00) >> 9) as u8,
    ];
    let data_bit_len: u32 = if prod & 0x1e00 != 0 {
        20
    } else if prod & 0x00e0 != 0 {
        15
    } else {
        12
    };

    let mut fger = Forger::new(buf);
    for _frame in 0..3 {
        let t_start = fger.elapsed_us();
        fger.emit_pulse(LEADER_H_TYP, LEADER_L_TYP);
        for idx in 0..data_bit_len {
            emit_bit(&mut fger, get_bit(&concat, idx as usize) != 0);
        }
        fger.emit_until(0, t_start + CYCLE_LEN_TYP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer;

    #[test]
    fn forge_then_analyze_round_trips() {
        let mut buf = [0u8; 256];
        forge(&mut buf, 0, 0x15);
        let summary = analyzer::run(&buf, &SonyModule).expect("SONY waveform should decode");
        assert_eq!(summary, "prod=0000 cmd=15");
    }
}
