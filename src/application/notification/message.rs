//! Voicemail email composition

use crate::domain::notification::{EmailAttachment, EmailMessage};
use crate::domain::voicemail::{CallMeta, FetchedAudio, RecordingAsset};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono_tz::Tz;

/// Where the email comes from and goes to
pub struct Envelope<'a> {
    pub sender: &'a str,
    pub sender_name: Option<&'a str>,
    pub recipients: &'a [String],
    pub time_zone: Tz,
}

/// How the recording reaches the reader
pub enum RecordingDelivery<'a> {
    Attached(&'a FetchedAudio),
    Link(&'a str),
}

pub fn compose(
    envelope: &Envelope<'_>,
    meta: &CallMeta,
    asset: &RecordingAsset,
    delivery: RecordingDelivery<'_>,
) -> EmailMessage {
    let received = meta
        .received_at
        .with_timezone(&envelope.time_zone)
        .format("%A, %B %-d, %Y at %-I:%M %p %Z");

    let mut body = format!(
        "You have a new voicemail.\n\n\
         From: {}\n\
         Duration: {} seconds\n\
         Received: {}\n\
         Call ID: {}\n\n",
        meta.caller, asset.duration_seconds, received, meta.call_id
    );

    let attachments = match delivery {
        RecordingDelivery::Attached(audio) => {
            body.push_str("The recording is attached to this email.\n");
            vec![EmailAttachment {
                filename: format!(
                    "voicemail-{}.{}",
                    asset.recording_id,
                    extension_for(&audio.content_type)
                ),
                content_type: audio.content_type.clone(),
                content_base64: STANDARD.encode(&audio.bytes),
            }]
        }
        RecordingDelivery::Link(link) => {
            body.push_str(&format!(
                "The recording could not be attached. Listen to it here:\n{}\n",
                link
            ));
            Vec::new()
        }
    };

    EmailMessage {
        from: envelope.sender.to_string(),
        from_name: envelope.sender_name.map(str::to_string),
        to: envelope.recipients.to_vec(),
        subject: format!("New voicemail from {}", meta.caller),
        body,
        attachments,
    }
}

fn extension_for(content_type: &str) -> &'static str {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    match mime {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/ogg" => "ogg",
        _ => "audio",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};

    fn envelope(recipients: &[String]) -> Envelope<'_> {
        Envelope {
            sender: "voicemail@example.com",
            sender_name: Some("Office Voicemail"),
            recipients,
            time_zone: chrono_tz::America::New_York,
        }
    }

    fn meta() -> CallMeta {
        // 14:05 UTC is 10:05 EDT
        CallMeta::new(
            "+15085550123",
            "CA0001",
            Utc.with_ymd_and_hms(2024, 3, 12, 14, 5, 0).unwrap(),
        )
    }

    #[test]
    fn test_compose_with_attachment() {
        let recipients = vec!["owner@example.com".to_string()];
        let audio = FetchedAudio {
            bytes: Bytes::from_static(b"ID3"),
            content_type: "audio/mpeg".to_string(),
            attempts: 1,
        };
        let asset = RecordingAsset::new("RE1", "CA0001").with_duration(31);

        let message = compose(
            &envelope(&recipients),
            &meta(),
            &asset,
            RecordingDelivery::Attached(&audio),
        );

        assert_eq!(message.subject, "New voicemail from +15085550123");
        assert_eq!(message.to, recipients);
        assert!(message.body.contains("From: +15085550123"));
        assert!(message.body.contains("Duration: 31 seconds"));
        assert!(message
            .body
            .contains("Received: Tuesday, March 12, 2024 at 10:05 AM EDT"));
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.attachments[0].filename, "voicemail-RE1.mp3");
        assert_eq!(message.attachments[0].content_base64, "SUQz");
    }

    #[test]
    fn test_compose_with_link() {
        let recipients = vec!["owner@example.com".to_string()];
        let asset = RecordingAsset::new("RE1", "CA0001");

        let message = compose(
            &envelope(&recipients),
            &meta(),
            &asset,
            RecordingDelivery::Link("https://api.example.com/Recordings/RE1.mp3"),
        );

        assert!(message.attachments.is_empty());
        assert!(message
            .body
            .contains("https://api.example.com/Recordings/RE1.mp3"));
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("audio/mpeg"), "mp3");
        assert_eq!(extension_for("audio/x-wav; charset=binary"), "wav");
        assert_eq!(extension_for("audio/flac"), "audio");
    }
}
