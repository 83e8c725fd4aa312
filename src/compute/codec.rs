//! Geohash encoding and decoding.
//!
//! A geohash interleaves longitude and latitude bisection bits, starting with
//! longitude, and packs every five bits into one character of the base-32
//! alphabet `0123456789bcdefghjkmnpqrstuvwxyz`.

use super::validation::{validate_coordinate, validate_precision};
use crate::error::{GeoproxError, Result};
use crate::types::{CellBounds, DecodedLocation, GeoPoint};
use once_cell::sync::Lazy;

/// The geohash base-32 alphabet.
pub const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

pub const DEFAULT_PRECISION: usize = 12;

/// Bit masks for the five bits of one character, most significant first.
const BITS: [u8; 5] = [16, 8, 4, 2, 1];

/// Reverse lookup: ASCII byte -> 5-bit value, or `None` outside the alphabet.
/// Upper-case letters are accepted.
static DECODE_TABLE: Lazy<[Option<u8>; 128]> = Lazy::new(|| {
    let mut table = [None; 128];
    for (value, &ch) in BASE32.iter().enumerate() {
        table[ch as usize] = Some(value as u8);
        table[ch.to_ascii_uppercase() as usize] = Some(value as u8);
    }
    table
});

/// 5-bit value of a geohash character.
#[inline]
pub fn char_value(ch: char, position: usize) -> Result<u8> {
    let value = if ch.is_ascii() {
        DECODE_TABLE[ch as usize]
    } else {
        None
    };
    value.ok_or(GeoproxError::InvalidHashCharacter {
        character: ch,
        position,
    })
}

/// Checks every character of `hash` against the alphabet.
pub fn validate_hash(hash: &str) -> Result<()> {
    for (position, ch) in hash.chars().enumerate() {
        char_value(ch, position)?;
    }
    Ok(())
}

/// Encode a coordinate into a geohash of `precision` characters.
///
/// # Examples
///
/// ```
/// use geoprox::compute::codec::encode;
///
/// let hash = encode(37.7749, -122.4194, 12)?;
/// assert_eq!(hash.len(), 12);
/// assert!(hash.starts_with("9q8yy"));
/// # Ok::<(), geoprox::GeoproxError>(())
/// ```
pub fn encode(latitude: f64, longitude: f64, precision: usize) -> Result<String> {
    validate_coordinate(latitude, longitude)?;
    validate_precision(precision)?;

    let mut lat_interval = (-90.0_f64, 90.0_f64);
    let mut lon_interval = (-180.0_f64, 180.0_f64);
    let mut is_lon = true;
    let mut bit = 0;
    let mut ch = 0u8;
    let mut hash = String::with_capacity(precision);

    while hash.len() < precision {
        let (interval, target) = if is_lon {
            (&mut lon_interval, longitude)
        } else {
            (&mut lat_interval, latitude)
        };
        let mid = (interval.0 + interval.1) / 2.0;
        if target > mid {
            ch |= BITS[bit];
            interval.0 = mid;
        } else {
            interval.1 = mid;
        }
        is_lon = !is_lon;

        if bit < 4 {
            bit += 1;
        } else {
            hash.push(BASE32[ch as usize] as char);
            bit = 0;
            ch = 0;
        }
    }

    Ok(hash)
}

pub fn encode_point(point: &GeoPoint, precision: usize) -> Result<String> {
    encode(point.latitude, point.longitude, precision)
}

/// Decode a geohash into the center of its cell and the cell half-widths.
///
/// An empty hash decodes to the whole world: `(0, 0)` with errors `(90, 180)`.
///
/// ```
/// use geoprox::compute::codec::decode;
///
/// let loc = decode("9q8yy")?;
/// assert!((loc.latitude - 37.77).abs() < 0.03);
/// assert!((loc.longitude - (-122.41)).abs() < 0.03);
///
/// assert!(decode("9q8ya").is_err());
/// # Ok::<(), geoprox::GeoproxError>(())
/// ```
pub fn decode(hash: &str) -> Result<DecodedLocation> {
    let mut lat_interval = (-90.0_f64, 90.0_f64);
    let mut lon_interval = (-180.0_f64, 180.0_f64);
    let mut is_lon = true;

    for (position, ch) in hash.chars().enumerate() {
        let cd = char_value(ch, position)?;
        for mask in BITS {
            let interval = if is_lon {
                &mut lon_interval
            } else {
                &mut lat_interval
            };
            let mid = (interval.0 + interval.1) / 2.0;
            if cd & mask != 0 {
                interval.0 = mid;
            } else {
                interval.1 = mid;
            }
            is_lon = !is_lon;
        }
    }

    Ok(DecodedLocation {
        latitude: (lat_interval.0 + lat_interval.1) / 2.0,
        longitude: (lon_interval.0 + lon_interval.1) / 2.0,
        error_lat: (lat_interval.1 - lat_interval.0) / 2.0,
        error_lon: (lon_interval.1 - lon_interval.0) / 2.0,
    })
}

/// Rectangle covered by `hash`.
pub fn decode_bounds(hash: &str) -> Result<CellBounds> {
    Ok(decode(hash)?.bounds())
}
