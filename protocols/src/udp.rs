use std::time::{SystemTime, UNIX_EPOCH};

/// Datagram sent by the UDP probe: the current UNIX time in seconds, as text.
///
/// The content carries no meaning for the target; it only has to be short and
/// non-empty so that something is put on the wire.
pub fn probe_payload() -> Vec<u8> {
    let secs: u64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    secs.to_string().into_bytes()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_a_decimal_timestamp() {
        let payload = probe_payload();
        let text = String::from_utf8(payload).unwrap();
        let secs: u64 = text.parse().unwrap();
        assert!(secs > 1_600_000_000);
    }
}
