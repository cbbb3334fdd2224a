//! # GPS Segment Decoder
//!
//! Locates the embedded GGA fix sentence in the GPS segment of a frame,
//! validates the fixed-width coordinate fields character by character, and
//! converts them from sexagesimal (`ddmm.mmmm`) to signed decimal degrees.
//!
//! Shape is validated *before* any numeric conversion runs: a line-noise
//! byte in a digit position is a whole-section failure, never a silently
//! wrong coordinate.

use crate::error::DecodeError;
use crate::telemetry::field;
use crate::telemetry::protocol::{
    GpsFix, GpsProfile, ALTITUDE_WIDTH, GGA_TAG, LAT_FIELD_WIDTH, LAT_POINT_OFFSET,
    LON_FIELD_WIDTH, LON_POINT_OFFSET,
};

/// Offset of the latitude hemisphere indicator from the latitude field start
const LAT_HEMI_OFFSET: usize = LAT_FIELD_WIDTH + 1;

/// Offset of the longitude field from the latitude field start
const LON_START_OFFSET: usize = LAT_FIELD_WIDTH + 3;

/// Offset of the longitude hemisphere indicator from the latitude field start
const LON_HEMI_OFFSET: usize = LON_START_OFFSET + LON_FIELD_WIDTH + 1;

/// Bytes spanned by the lat/lon block, hemisphere indicators included
const FIX_BLOCK_LEN: usize = LON_HEMI_OFFSET + 1;

/// Comma-delimited fields between the longitude hemisphere and the altitude
/// (fix quality, satellite count, HDOP)
const FIELDS_BEFORE_ALTITUDE: usize = 3;

/// Decode the GPS segment of a frame into a position fix.
///
/// # Arguments
///
/// * `segment` - The GPS segment, expected to contain a GGA sentence
/// * `profile` - Segment length profile for this deployment; `Long` also
///   extracts the altitude field
///
/// # Returns
///
/// * `Result<GpsFix>` - Signed decimal-degree coordinates (and altitude
///   under the long-form profile), or the first failure
///
/// # Errors
///
/// * [`DecodeError::SentenceNotFound`] - no sentence tag in the segment
/// * [`DecodeError::TruncatedFrame`] - the sentence ends before the fields
///   the profile requires
/// * [`DecodeError::BadLatitudeFormat`] / [`DecodeError::BadLongitudeFormat`] -
///   a coordinate field violates the fixed digit grammar or carries an
///   unknown hemisphere indicator
/// * [`DecodeError::BadAltitudeFormat`] - long-form only; altitude field
///   outside its width window or non-numeric
pub fn decode_gps(segment: &str, profile: GpsProfile) -> Result<GpsFix, DecodeError> {
    let tag = segment.find(GGA_TAG).ok_or(DecodeError::SentenceNotFound)?;
    let sentence = &segment.as_bytes()[tag..];

    let need = profile.min_sentence_bytes();
    if sentence.len() < need {
        return Err(DecodeError::TruncatedFrame {
            have: sentence.len(),
            need,
        });
    }

    // Skip the sentence tag and the UTC time field
    let mut idx = 0;
    for _ in 0..2 {
        idx = find_comma(sentence, idx).ok_or(DecodeError::TruncatedFrame {
            have: sentence.len(),
            need,
        })? + 1;
    }

    // The time field is variable width, so the minimum-length check above
    // does not guarantee the lat/lon block fits; re-check from the cursor.
    if sentence.len() < idx + FIX_BLOCK_LEN {
        return Err(DecodeError::TruncatedFrame {
            have: sentence.len(),
            need: idx + FIX_BLOCK_LEN,
        });
    }

    let latitude = decode_latitude(&sentence[idx..])?;
    let longitude = decode_longitude(&sentence[idx..])?;

    let altitude = match profile {
        GpsProfile::Short => None,
        GpsProfile::Long => Some(decode_altitude(sentence, idx + FIX_BLOCK_LEN, need)?),
    };

    Ok(GpsFix {
        latitude,
        longitude,
        altitude,
    })
}

/// Decode the fixed-width latitude field and its hemisphere indicator.
///
/// `block` starts at the latitude field; the hemisphere indicator sits two
/// bytes past the field (after the delimiting comma). `S` negates.
fn decode_latitude(block: &[u8]) -> Result<f64, DecodeError> {
    // An immediate comma means the receiver sent an empty latitude field
    if block[0] == b',' {
        return Err(DecodeError::BadLatitudeFormat);
    }

    let raw = std::str::from_utf8(&block[..LAT_FIELD_WIDTH])
        .map_err(|_| DecodeError::BadLatitudeFormat)?;
    if !field::check_shape(raw, Some(LAT_POINT_OFFSET)) {
        return Err(DecodeError::BadLatitudeFormat);
    }

    let degrees = field::to_decimal_degrees(raw).ok_or(DecodeError::BadLatitudeFormat)?;
    match block[LAT_HEMI_OFFSET] {
        b'N' => Ok(degrees),
        b'S' => Ok(-degrees),
        _ => Err(DecodeError::BadLatitudeFormat),
    }
}

/// Decode the fixed-width longitude field and its hemisphere indicator.
///
/// Same grammar as latitude, one degree digit wider. `W` negates.
fn decode_longitude(block: &[u8]) -> Result<f64, DecodeError> {
    if block[LON_START_OFFSET] == b',' {
        return Err(DecodeError::BadLongitudeFormat);
    }

    let raw = std::str::from_utf8(&block[LON_START_OFFSET..LON_START_OFFSET + LON_FIELD_WIDTH])
        .map_err(|_| DecodeError::BadLongitudeFormat)?;
    if !field::check_shape(raw, Some(LON_POINT_OFFSET)) {
        return Err(DecodeError::BadLongitudeFormat);
    }

    let degrees = field::to_decimal_degrees(raw).ok_or(DecodeError::BadLongitudeFormat)?;
    match block[LON_HEMI_OFFSET] {
        b'E' => Ok(degrees),
        b'W' => Ok(-degrees),
        _ => Err(DecodeError::BadLongitudeFormat),
    }
}

/// Decode the long-form altitude field.
///
/// `from` points at the comma that terminates the longitude hemisphere.
/// Skips the three intermediate fields, then reads a bounded-width plain
/// decimal. Width outside [`ALTITUDE_WIDTH`] is rejected: anything shorter
/// or longer than the receiver emits means the sentence is misaligned.
fn decode_altitude(sentence: &[u8], from: usize, need: usize) -> Result<f64, DecodeError> {
    let mut idx = from;
    for _ in 0..=FIELDS_BEFORE_ALTITUDE {
        idx = find_comma(sentence, idx).ok_or(DecodeError::TruncatedFrame {
            have: sentence.len(),
            need,
        })? + 1;
    }

    let end = find_comma(sentence, idx).unwrap_or(sentence.len());
    let width = end - idx;
    if !ALTITUDE_WIDTH.contains(&width) {
        return Err(DecodeError::BadAltitudeFormat);
    }

    std::str::from_utf8(&sentence[idx..end])
        .ok()
        .and_then(|raw| raw.parse::<f64>().ok())
        .ok_or(DecodeError::BadAltitudeFormat)
}

/// Absolute index of the next comma at or after `from`
fn find_comma(bytes: &[u8], from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == b',')
        .map(|p| from + p)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_SENTENCE: &str = "$GPGGA,123519,4209.9180,N,08326.7240,W,1,08,0.9,00545.4,M,46.9,M,,*47";

    #[test]
    fn test_decode_short_form() {
        let fix = decode_gps(LONG_SENTENCE, GpsProfile::Short).unwrap();

        assert!((fix.latitude - 42.16530).abs() < 1e-5);
        assert!((fix.longitude - (-83.44540)).abs() < 1e-5);
        assert_eq!(fix.altitude, None);
    }

    #[test]
    fn test_decode_long_form_with_altitude() {
        let fix = decode_gps(LONG_SENTENCE, GpsProfile::Long).unwrap();

        assert!((fix.latitude - 42.16530).abs() < 1e-5);
        assert!((fix.longitude - (-83.44540)).abs() < 1e-5);
        assert!((fix.altitude.unwrap() - 545.4).abs() < 1e-9);
    }

    #[test]
    fn test_hemisphere_flips_sign() {
        let sentence = "$GPGGA,123519,4209.9180,S,08326.7240,E,1,08,0.9,00545.4,M,46.9,M,,*47";
        let fix = decode_gps(sentence, GpsProfile::Short).unwrap();

        assert!((fix.latitude - (-42.16530)).abs() < 1e-5);
        assert!((fix.longitude - 83.44540).abs() < 1e-5);
    }

    #[test]
    fn test_tag_found_mid_segment() {
        // Radio garbage before the sentence is ignored
        let segment = format!("x93k2{}", LONG_SENTENCE);
        assert!(decode_gps(&segment, GpsProfile::Short).is_ok());
    }

    #[test]
    fn test_missing_tag() {
        let result = decode_gps("no fix sentence here", GpsProfile::Short);
        assert_eq!(result.unwrap_err(), DecodeError::SentenceNotFound);
    }

    #[test]
    fn test_truncated_sentence() {
        let result = decode_gps("$GPGGA,123519,4209.91", GpsProfile::Short);
        assert!(matches!(
            result.unwrap_err(),
            DecodeError::TruncatedFrame { .. }
        ));
    }

    #[test]
    fn test_long_form_needs_more_bytes_than_short() {
        // Long enough for a short-form fix, too short for long-form
        let sentence = "$GPGGA,123519,4209.9180,N,08326.7240,W,1,08";
        assert!(decode_gps(sentence, GpsProfile::Short).is_ok());
        assert!(matches!(
            decode_gps(sentence, GpsProfile::Long).unwrap_err(),
            DecodeError::TruncatedFrame { .. }
        ));
    }

    #[test]
    fn test_noise_byte_in_latitude() {
        let sentence = "$GPGGA,123519,42\u{7f}9.9180,N,08326.7240,W,1,08,0.9,00545.4,M,46.9,M,,*47";
        let result = decode_gps(sentence, GpsProfile::Short);
        assert_eq!(result.unwrap_err(), DecodeError::BadLatitudeFormat);
    }

    #[test]
    fn test_noise_byte_in_longitude() {
        let sentence = "$GPGGA,123519,4209.9180,N,0832g.7240,W,1,08,0.9,00545.4,M,46.9,M,,*47";
        let result = decode_gps(sentence, GpsProfile::Short);
        assert_eq!(result.unwrap_err(), DecodeError::BadLongitudeFormat);
    }

    #[test]
    fn test_empty_latitude_field() {
        let sentence = "$GPGGA,123519,,N,08326.7240,W,1,08,0.9,00545.4,M,46.9,M,,*47";
        let result = decode_gps(sentence, GpsProfile::Short);
        assert_eq!(result.unwrap_err(), DecodeError::BadLatitudeFormat);
    }

    #[test]
    fn test_unknown_hemisphere_indicator() {
        let sentence = "$GPGGA,123519,4209.9180,Q,08326.7240,W,1,08,0.9,00545.4,M,46.9,M,,*47";
        let result = decode_gps(sentence, GpsProfile::Short);
        assert_eq!(result.unwrap_err(), DecodeError::BadLatitudeFormat);
    }

    #[test]
    fn test_altitude_width_window() {
        // 4-character altitude: below the window
        let sentence = "$GPGGA,123519,4209.9180,N,08326.7240,W,1,08,0.9,45.4,M,46.9,M,,*47";
        assert_eq!(
            decode_gps(sentence, GpsProfile::Long).unwrap_err(),
            DecodeError::BadAltitudeFormat
        );

        // 9-character altitude: above the window
        let sentence = "$GPGGA,123519,4209.9180,N,08326.7240,W,1,08,0.9,000045.40,M,46.9,M,,*47";
        assert_eq!(
            decode_gps(sentence, GpsProfile::Long).unwrap_err(),
            DecodeError::BadAltitudeFormat
        );
    }

    #[test]
    fn test_non_numeric_altitude() {
        let sentence = "$GPGGA,123519,4209.9180,N,08326.7240,W,1,08,0.9,00x45.4,M,46.9,M,,*47";
        assert_eq!(
            decode_gps(sentence, GpsProfile::Long).unwrap_err(),
            DecodeError::BadAltitudeFormat
        );
    }

    #[test]
    fn test_short_form_ignores_altitude_damage() {
        // Short-form deployments never look past the longitude hemisphere
        let sentence = "$GPGGA,123519,4209.9180,N,08326.7240,W,1,08,0.9,garbage";
        assert!(decode_gps(sentence, GpsProfile::Short).is_ok());
    }
}
