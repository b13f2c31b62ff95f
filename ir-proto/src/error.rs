//! Two-tier error design: a rich internal [`RejectReason`] per format
//! attempt, logged but never surfaced, and a single public
//! [`UnknownFormat`] returned once every registered format has
//! rejected the waveform.

use crate::analyzer::State;
use crate::FormatTag;

/// Why a specific format module gave up on a waveform. Never leaves
/// the crate: [`crate::analyze`] collapses every rejection into
/// [`UnknownFormat`], logging the detail at `trace` level as it goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum RejectReason {
    #[error("{tag}: low run of {dur_us}us out of range in state {state:?}")]
    LowOutOfRange { tag: FormatTag, state: State, dur_us: u32 },

    #[error("{tag}: high run of {dur_us}us out of range in state {state:?}")]
    HighOutOfRange { tag: FormatTag, state: State, dur_us: u32 },

    #[error("{tag}: marker seen at bit position {idx}, not an expected marker slot")]
    MarkerOutOfPosition { tag: FormatTag, idx: usize },

    #[error("{tag}: decoded payload exceeds the {max}-byte buffer")]
    PayloadOverflow { tag: FormatTag, max: usize },

    #[error("{tag}: cmd and ~cmd complement bytes disagree")]
    ComplementMismatch { tag: FormatTag },

    #[error("{tag}: independently-derived cmd extracts disagree")]
    CmdConsistencyMismatch { tag: FormatTag },

    #[error("{tag}: repeated cycle's payload disagrees with the first cycle")]
    CycleMismatch { tag: FormatTag },

    #[error("{tag}: buffer ended before a full cycle was decoded")]
    NoCycleDecoded { tag: FormatTag },
}

/// No registered format recognized the waveform. The caller gets no
/// more detail than this: per-format rejection reasons are an
/// implementation detail, logged at `trace` level as each format is
/// tried in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("waveform did not match any registered IR protocol")]
pub struct UnknownFormat;
