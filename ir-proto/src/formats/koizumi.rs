//! KOIZUMI: a Manchester-like encoding where a bit's value depends on
//! both the space that precedes it and the mark that follows, plus two
//! fixed marker slots partway through the frame. Decode-only — no
//! synthesizer exists for this format.

use crate::analyzer::{Analyzer, FlipResult, FormatConfig, FormatModule, Signal, State, Window};
use crate::error::RejectReason;
use crate::FormatTag;

const LEADER_H: Window = Window::new(700, 1_000);
const LEADER_L: Window = Window::new(700, 1_900);
const DATA0_L: Window = Window::new(1_500, 1_850);
const DATA0_H: Window = Window::new(700, 1_000);
const DATA1_L: Window = Window::new(700, 1_000);
const DATA1_H: Window = Window::new(1_500, 1_850);
const MARKER_L: Window = Window::new(4_500, 5_500);
const TRAILER_L: Window = Window::new(11_900, 14_500);
const CYCLE_LEN: Window = Window::new(0, 1_000_000);

const MARKER_BIT_POS1: usize = 9;
const MARKER_BIT_POS2: usize = 12;

static CONFIG: FormatConfig = FormatConfig {
    tag: FormatTag::Koizumi,
    data_len: 3,
    leader_h: LEADER_H,
    leader_l: LEADER_L,
    trailer_l: TRAILER_L,
    cycle_len: CYCLE_LEN,
};

pub(crate) struct KoizumiModule;

impl FormatModule for KoizumiModule {
    fn config(&self) -> &'static FormatConfig {
        &CONFIG
    }

    fn on_flip_up(&self, az: &Analyzer) -> FlipResult {
        if az.state == State::Trailer {
            return Ok(Some(Signal::Trailer));
        }
        Ok(None)
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
                if DATA0_L.contains(az.dur_prev) && DATA0_H.contains(az.dur) {
                    return Ok(Some(Signal::Data0));
                }
                if DATA1_L.contains(az.dur_prev) && DATA1_H.contains(az.dur) {
                    return Ok(Some(Signal::Data1));
                }
                if MARKER_L.contains(az.dur_prev) && az.cfg.leader_h.contains(az.dur) {
                    if az.dst_idx == MARKER_BIT_POS1 || az.dst_idx == MARKER_BIT_POS2 {
                        return Ok(Some(Signal::Marker));
                    }
                    return Err(RejectReason::MarkerOutOfPosition {
                        tag: CONFIG.tag,
                        idx: az.dst_idx,
                    });
                }
                high_reject(az)
            }
            _ => high_reject(az),
        }
    }

    fn on_each_sample(&self, az: &Analyzer) -> FlipResult {
        if az.state == State::Leader && az.level == 0 && az.dur == az.cfg.leader_l.min {
            return Ok(Some(Signal::Leader));
        }
        Ok(None)
    }

    fn on_end_cycle(
        &self,
        az: &Analyzer,
        accum: &mut [u8],
        tmp: &[u8],
        text: &mut String,
    ) -> Result<(), RejectReason> {
        match az.cycle {
            0 => {
                accum[..3].copy_from_slice(&tmp[..3]);
            }
            1 => {
                let id = (tmp[1] >> 1) & 0x7;
                let dst_cmd = ((tmp[1] as u16) << 8) | tmp[0] as u16;
                let tmp_cmd1 = dst_cmd & 0x1ff;
                let tmp_cmd2 = (((tmp[2] as u16) << 4) | ((tmp[1] as u16) >> 4)) & 0x1ff;
                if dst_cmd != tmp_cmd1 || dst_cmd != tmp_cmd2 {
                    return Err(RejectReason::CmdConsistencyMismatch { tag: CONFIG.tag });
                }
                text.push_str(&format!("id={:02x} cmd={:04x}", id, dst_cmd));
                accum[..3].copy_from_slice(&tmp[..3]);
            }
            _ => {
                if tmp[..3] != accum[..3] {
                    return Err(RejectReason::CycleMismatch { tag: CONFIG.tag });
                }
            }
        }
        Ok(())
    }
}

fn high_reject(az: &Analyzer) -> FlipResult {
    Err(RejectReason::HighOutOfRange {
        tag: CONFIG.tag,
        state: az.state,
        dur_us: az.dur,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer;

    #[test]
    fn rejects_a_flat_buffer() {
        let buf = [0u8; 256];
        assert!(analyzer::run(&buf, &KoizumiModule).is_err());
    }

    #[test]
    fn marker_out_of_position_is_reported() {
        // A marker-length pulse outside bit positions 9/12 must be
        // rejected with MarkerOutOfPosition rather than silently
        // accepted as a data bit.
        let az = Analyzer {
            cfg: &CONFIG,
            state: State::Data,
            level: 1,
            dur: 900,
            dur_prev: 5_000,
            dur_cycle: 0,
            dst_idx: 3,
            cycle: 0,
        };
        let module = KoizumiModule;
        let result = module.on_flip_dn(&az);
        assert!(matches!(
            result,
            Err(RejectReason::MarkerOutOfPosition { idx: 3, .. })
        ));
    }
}
