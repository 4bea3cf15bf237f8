//! Message validation rules applied before decoding.

use famcast_core::error::AppError;

use super::types::ClientMessage;

/// Validates a raw inbound frame.
pub fn validate_frame(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Validates decoded field ranges the type system cannot express.
pub fn validate_fields(msg: &ClientMessage) -> Result<(), AppError> {
    match msg {
        ClientMessage::VideoVolume { volume, .. } => validate_volume(*volume),
        ClientMessage::VideoSeek { seek_time, .. } => validate_position(*seek_time, "seekTime"),
        ClientMessage::VideoPause { current_time, .. } => {
            validate_position(*current_time, "currentTime")
        }
        ClientMessage::VideoPlay {
            current_time: Some(t),
            ..
        } => validate_position(*t, "currentTime"),
        ClientMessage::PlaybackStatus {
            current_time,
            volume,
            ..
        } => {
            validate_position(*current_time, "currentTime")?;
            validate_volume(*volume)
        }
        _ => Ok(()),
    }
}

fn validate_volume(volume: f64) -> Result<(), AppError> {
    if !(0.0..=1.0).contains(&volume) {
        return Err(AppError::validation(format!(
            "volume must be between 0.0 and 1.0, got {volume}"
        )));
    }
    Ok(())
}

fn validate_position(position: f64, field: &str) -> Result<(), AppError> {
    if !position.is_finite() || position < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a non-negative number, got {position}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use famcast_core::types::id::VideoId;

    #[test]
    fn test_oversized_frame_rejected() {
        let raw = "x".repeat(100);
        assert!(validate_frame(&raw, 64).is_err());
        assert!(validate_frame(&raw, 128).is_ok());
    }

    #[test]
    fn test_empty_frame_rejected() {
        assert!(validate_frame("   ", 1024).is_err());
    }

    #[test]
    fn test_volume_range() {
        let ok = ClientMessage::VideoVolume {
            video_id: VideoId::new("v1"),
            volume: 0.5,
        };
        assert!(validate_fields(&ok).is_ok());

        let too_loud = ClientMessage::VideoVolume {
            video_id: VideoId::new("v1"),
            volume: 1.5,
        };
        assert!(validate_fields(&too_loud).is_err());
    }

    #[test]
    fn test_negative_seek_rejected() {
        let msg = ClientMessage::VideoSeek {
            video_id: VideoId::new("v1"),
            seek_time: -3.0,
        };
        assert!(validate_fields(&msg).is_err());
    }
}
