//! Connection-state determination.

use crate::signals::RawSignals;

/// Combines one snapshot into the single connected / not-connected verdict.
///
/// The link counts as up only when the stack has enumerated, the bus is not
/// suspended and VBUS is present. In practice `!bus_suspended` alone tracks
/// the cable state; the other two conjuncts guard transient states (stack
/// not yet up, VBUS dipping during a hot-plug) and must stay: any single
/// signal going false collapses the verdict to false. Stateless, no
/// debounce.
pub fn usb_connected(signals: &RawSignals) -> bool {
    signals.host_session_ready && !signals.bus_suspended && signals.vbus_present
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ready: bool, suspended: bool, vbus: bool) -> RawSignals {
        RawSignals::from_flags(suspended, vbus, ready)
    }

    #[test]
    fn connected_only_when_all_three_signals_agree() {
        for ready in [false, true] {
            for suspended in [false, true] {
                for vbus in [false, true] {
                    let s = snapshot(ready, suspended, vbus);
                    assert_eq!(
                        usb_connected(&s),
                        ready && !suspended && vbus,
                        "ready={} suspended={} vbus={}",
                        ready,
                        suspended,
                        vbus
                    );
                }
            }
        }
    }

    #[test]
    fn stack_not_ready_dominates() {
        for suspended in [false, true] {
            for vbus in [false, true] {
                assert!(!usb_connected(&snapshot(false, suspended, vbus)));
            }
        }
    }

    #[test]
    fn suspended_bus_dominates() {
        for ready in [false, true] {
            for vbus in [false, true] {
                assert!(!usb_connected(&snapshot(ready, true, vbus)));
            }
        }
    }

    #[test]
    fn missing_vbus_dominates() {
        for ready in [false, true] {
            for suspended in [false, true] {
                assert!(!usb_connected(&snapshot(ready, suspended, false)));
            }
        }
    }

    #[test]
    fn fully_connected_case() {
        assert!(usb_connected(&snapshot(true, false, true)));
    }

    #[test]
    fn evaluation_is_pure() {
        let s = snapshot(true, false, true);
        assert_eq!(usb_connected(&s), usb_connected(&s));
        let s = snapshot(false, true, false);
        assert_eq!(usb_connected(&s), usb_connected(&s));
    }
}
