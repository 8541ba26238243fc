//! Playback duration from audio container metadata
//!
//! Reads the container headers only (no decoding). Any failure, including a
//! container that reports zero length, yields the unknown marker `--`.

use axum::body::Bytes;
use djsite_common::human_time::format_set_duration;
use djsite_common::models::UNKNOWN_DURATION;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::io::Cursor;
use tracing::{debug, warn};

/// Duration reported by the container, in seconds
pub fn probe_duration_seconds(data: &[u8]) -> Result<f64, lofty::error::LoftyError> {
    let tagged_file = Probe::new(Cursor::new(data)).guess_file_type()?.read()?;
    Ok(tagged_file.properties().duration().as_secs_f64())
}

/// `M:SS` text for a set, `--` when the length cannot be determined
pub fn duration_text(data: &[u8]) -> String {
    match probe_duration_seconds(data) {
        Ok(seconds) if seconds > 0.0 => {
            debug!(duration_s = seconds, "Probed set duration");
            format_set_duration(seconds)
        }
        Ok(_) => {
            debug!("Container reports no duration");
            UNKNOWN_DURATION.to_string()
        }
        Err(e) => {
            warn!("Could not read audio duration: {}", e);
            UNKNOWN_DURATION.to_string()
        }
    }
}

/// `duration_text` off the async runtime
pub async fn derive_duration_text(data: Bytes) -> String {
    tokio::task::spawn_blocking(move || duration_text(&data))
        .await
        .unwrap_or_else(|e| {
            warn!("Duration probe task failed: {}", e);
            UNKNOWN_DURATION.to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_unknown() {
        assert_eq!(duration_text(b"definitely not audio"), "--");
        assert_eq!(duration_text(&[]), "--");
    }

    #[tokio::test]
    async fn test_async_wrapper_on_garbage() {
        assert_eq!(derive_duration_text(Bytes::from_static(b"\x00\x01\x02")).await, "--");
    }
}
