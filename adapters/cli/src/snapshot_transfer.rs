use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use rampart_core::SimSnapshot;
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "rampart";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "rampart:v1";
/// Delimiter used to separate the prefix, wave index and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a snapshot into a single-line string suitable for a text file.
pub(crate) fn encode(snapshot: &SimSnapshot) -> Result<String, SnapshotTransferError> {
    let json = serde_json::to_vec(snapshot).map_err(SnapshotTransferError::Serialize)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SNAPSHOT_HEADER}:{}:{encoded}", snapshot.wave.index))
}

/// Decodes a snapshot from its single-line representation.
pub(crate) fn decode(value: &str) -> Result<SimSnapshot, SnapshotTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SnapshotTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(SnapshotTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(SnapshotTransferError::MissingVersion)?;
    let wave = parts.next().ok_or(SnapshotTransferError::MissingWave)?;
    let payload = parts.next().ok_or(SnapshotTransferError::MissingPayload)?;

    if domain != SNAPSHOT_DOMAIN {
        return Err(SnapshotTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SNAPSHOT_VERSION {
        return Err(SnapshotTransferError::UnsupportedVersion(version.to_owned()));
    }

    let wave = wave
        .trim()
        .parse::<u32>()
        .map_err(|_| SnapshotTransferError::InvalidWave(wave.to_owned()))?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(SnapshotTransferError::InvalidEncoding)?;
    let snapshot: SimSnapshot =
        serde_json::from_slice(&bytes).map_err(SnapshotTransferError::InvalidPayload)?;

    if snapshot.wave.index != wave {
        return Err(SnapshotTransferError::WaveMismatch {
            header: wave,
            payload: snapshot.wave.index,
        });
    }
    Ok(snapshot)
}

/// Errors that can occur while encoding or decoding snapshot strings.
#[derive(Debug, Error)]
pub(crate) enum SnapshotTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("snapshot string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("snapshot string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include the wave index.
    #[error("snapshot string is missing the wave index")]
    MissingWave,
    /// The encoded snapshot did not include the payload segment.
    #[error("snapshot string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The wave index could not be parsed.
    #[error("could not parse wave index '{0}'")]
    InvalidWave(String),
    /// The header and the payload disagree on the wave index.
    #[error("snapshot header names wave {header} but the payload holds wave {payload}")]
    WaveMismatch {
        /// Wave named by the header.
        header: u32,
        /// Wave stored in the payload.
        payload: u32,
    },
    /// The snapshot could not be serialised.
    #[error("could not serialise snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse snapshot payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::{
        HostileKind, HostileRecord, TargetPriority, TowerId, TowerKind, TowerRecord, Vec2,
        WaveRecord,
    };

    fn snapshot() -> SimSnapshot {
        SimSnapshot {
            version: rampart_core::SNAPSHOT_VERSION,
            wave: WaveRecord {
                index: 4,
                spawned: 2,
                remaining: 3,
            },
            towers: vec![TowerRecord {
                id: TowerId::new(7),
                kind: TowerKind::Magic,
                position: Vec2::new(3.0, 1.5),
                level: 2,
                priority: TargetPriority::Strongest,
            }],
            hostiles: vec![HostileRecord {
                kind: HostileKind::Brute,
                wave: 4,
                health: 81.5,
                max_health: 275.2,
                health_multiplier: 1.72,
                elite: false,
                waypoints: vec![Vec2::ZERO, Vec2::new(4.0, 1.25), Vec2::new(12.0, 1.25)],
                waypoint_index: 2,
                progress: 9.25,
                position: Vec2::new(8.0, 1.25),
            }],
        }
    }

    #[test]
    fn encoded_snapshot_decodes_to_the_same_state() {
        let snapshot = snapshot();
        let encoded = encode(&snapshot).expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:4:")));

        let decoded = decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn foreign_prefixes_are_rejected() {
        let encoded = encode(&snapshot()).expect("snapshot encodes");
        let foreign = encoded.replacen(SNAPSHOT_DOMAIN, "maze", 1);
        assert!(matches!(
            decode(&foreign),
            Err(SnapshotTransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
    }

    #[test]
    fn header_must_agree_with_the_payload() {
        let encoded = encode(&snapshot()).expect("snapshot encodes");
        let tampered = encoded.replacen(":4:", ":5:", 1);
        assert!(matches!(
            decode(&tampered),
            Err(SnapshotTransferError::WaveMismatch {
                header: 5,
                payload: 4
            })
        ));
    }

    #[test]
    fn blank_input_is_reported() {
        assert!(matches!(
            decode("  \n"),
            Err(SnapshotTransferError::EmptyPayload)
        ));
        assert!(matches!(
            decode("rampart:v1"),
            Err(SnapshotTransferError::MissingWave)
        ));
    }
}
