//! The fixed-priority registry of format modules. The order here is
//! the order waveforms are tried against: AEHA, DAIKIN, NEC, SONY,
//! KOIZUMI. It is fixed rather than configurable because several of
//! these protocols share enough of their timing envelope that a
//! narrower-windowed format needs first refusal before a looser one
//! gets a chance to (mis)classify the same waveform.

mod aeha;
mod daikin;
mod format_util;
mod koizumi;
mod nec;
mod sony;

pub mod forge {
    //! Synthesizer entry points, one per format that supports it.
    pub use super::aeha::forge as aeha;
    pub use super::daikin::forge as daikin;
    pub use super::nec::forge as nec;
    pub use super::sony::forge as sony;
}

use crate::analyzer::{self, FormatModule};
use crate::FormatTag;

fn registry() -> [&'static dyn FormatModule; 5] {
    [
        &aeha::AehaModule,
        &daikin::DaikinModule,
        &nec::NecModule,
        &sony::SonyModule,
        &koizumi::KoizumiModule,
    ]
}

/// Tries every registered format in priority order, returning the tag
/// and summary of the first one to fully decode `buf`. Every rejection
/// along the way is logged at `trace` level and then discarded.
pub(crate) fn try_all(buf: &[u8]) -> Option<(FormatTag, String)> {
    for module in registry() {
        match analyzer::run(buf, module) {
            Ok(summary) => return Some((module.config().tag, summary)),
            Err(reason) => {
                log::trace!("{} rejected: {}", module.config().tag, reason);
            }
        }
    }
    None
}
