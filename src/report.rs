//! Diagnostic line formatting.
//!
//! Pure formatting, no decision logic: the "connect" word is derived from
//! the suspend bit alone, and the overall verdict never appears in the line.

use core::fmt;

use crate::board::BoardVariant;
use crate::signals::RawSignals;

pub const ANSI_RED: &str = "\x1b[31m";
pub const ANSI_GREEN: &str = "\x1b[32m";
pub const ANSI_CLEAR: &str = "\x1b[0m";

/// A status word wrapped in green when positive, red when negative. The
/// color is for human legibility only; consumers without ANSI rendering
/// strip or ignore it.
struct Status {
    word: &'static str,
    good: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = if self.good { ANSI_GREEN } else { ANSI_RED };
        write!(f, "{}{}{}", color, self.word, ANSI_CLEAR)
    }
}

fn status(good: bool, positive: &'static str, negative: &'static str) -> Status {
    Status {
        word: if good { positive } else { negative },
        good,
    }
}

/// One-time message before the monitor loop starts.
pub fn announce<W: fmt::Write>(out: &mut W) -> fmt::Result {
    writeln!(out, "Waiting for USB connection")
}

/// Renders one diagnostic line from a snapshot.
pub fn status_line<W: fmt::Write>(
    out: &mut W,
    variant: BoardVariant,
    signals: &RawSignals,
) -> fmt::Result {
    writeln!(
        out,
        "BOARD={}, usb-device {}, SIE_STATUS=0x{:08X} {}, VBUS {}",
        variant.name(),
        status(signals.host_session_ready, "ready", "not ready"),
        signals.sie_status,
        status(!signals.bus_suspended, "connect", "disconnect"),
        status(signals.vbus_present, "high", "low"),
    )
}
