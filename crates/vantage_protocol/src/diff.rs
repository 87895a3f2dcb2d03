//! Dirty-attribute diff encoding.
//!
//! A diff is a packed count followed by one entry per dirty key: a
//! packed ordinal plus the value (encoded per the key's declared kind)
//! when the key holds a value, or a tombstone when it was cleared. The
//! tombstone is `-1 - ordinal` — guaranteed negative, so the sign bit
//! of the packed ordinal disambiguates set from delete.

use vantage_ui::{AttrKey, AttrValue, AttributeStore};

use crate::codec::{ByteReader, ByteWriter, MAX_STRING_LEN};
use crate::error::DecodeError;

/// Encodes the store's dirty set.
///
/// Only dirty keys are written; callers clear the dirty set themselves
/// once the packet is committed (snapshot-and-clear).
pub fn encode_diff(writer: &mut ByteWriter, store: &AttributeStore) {
    writer.write_packed(store.dirty_count() as i32);
    for key in store.dirty_keys() {
        match store.get(key, None) {
            Some(value) => {
                writer.write_packed(i32::from(key.ordinal()));
                encode_value(writer, value);
            }
            None => {
                writer.write_packed(-1 - i32::from(key.ordinal()));
            }
        }
    }
}

fn encode_value(writer: &mut ByteWriter, value: &AttrValue) {
    match value {
        AttrValue::Int(v) => writer.write_packed(*v),
        AttrValue::Str(v) => writer.write_string(v, false),
        AttrValue::Color(v) => writer.write_color(*v),
        AttrValue::OwnerRef(v) => writer.write_string(v, true),
    }
}

/// Decodes a diff into the store with the default string length cap.
///
/// # Errors
///
/// [`DecodeError::UnknownAttr`] on an out-of-range ordinal, plus any
/// codec error from the value bytes.
pub fn decode_diff(
    reader: &mut ByteReader<'_>,
    store: &mut AttributeStore,
) -> Result<(), DecodeError> {
    decode_diff_with_limit(reader, store, MAX_STRING_LEN)
}

/// Decodes a diff into the store, capping string prefixes.
///
/// Entries apply silently: no dirty marking, since the receiving side
/// is a replica, not an author.
///
/// # Errors
///
/// [`DecodeError::UnknownAttr`] on an out-of-range ordinal, plus any
/// codec error from the value bytes.
pub fn decode_diff_with_limit(
    reader: &mut ByteReader<'_>,
    store: &mut AttributeStore,
    max_string: i32,
) -> Result<(), DecodeError> {
    let count = reader.read_packed()?;
    for _ in 0..count.max(0) {
        let ordinal = reader.read_packed()?;
        if ordinal < 0 {
            let index = ordinal.unsigned_abs() - 1;
            let key = u8::try_from(index)
                .ok()
                .and_then(AttrKey::from_ordinal)
                .ok_or(DecodeError::UnknownAttr(ordinal))?;
            store.apply_clear(key);
        } else {
            let key = u8::try_from(ordinal)
                .ok()
                .and_then(AttrKey::from_ordinal)
                .ok_or(DecodeError::UnknownAttr(ordinal))?;
            let value = decode_value(reader, key, max_string)?;
            if store.apply(key, value).is_err() {
                // Unreachable: the value was read with the key's kind.
                return Err(DecodeError::UnknownAttr(ordinal));
            }
        }
    }
    Ok(())
}

fn decode_value(
    reader: &mut ByteReader<'_>,
    key: AttrKey,
    max_string: i32,
) -> Result<AttrValue, DecodeError> {
    Ok(match key.kind() {
        vantage_ui::AttrKind::Int => AttrValue::Int(reader.read_packed()?),
        vantage_ui::AttrKind::Str => AttrValue::Str(reader.read_string(max_string, false)?),
        vantage_ui::AttrKind::Color => AttrValue::Color(reader.read_color()?),
        vantage_ui::AttrKind::OwnerRef => {
            AttrValue::OwnerRef(reader.read_string(max_string, true)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_ui::Color;

    #[test]
    fn test_diff_round_trip_with_deletion() {
        let mut source = AttributeStore::new();
        source
            .set(AttrKey::Text, AttrValue::Str("Quest: slay".into()))
            .unwrap();
        source
            .set(AttrKey::TextColor, AttrValue::Color(Color::BLACK))
            .unwrap();
        source.set(AttrKey::Hotkey, AttrValue::Int(-6)).unwrap();
        source.clear(AttrKey::TextColor);

        let mut writer = ByteWriter::new();
        encode_diff(&mut writer, &source);

        let mut replica = AttributeStore::new();
        let mut reader = ByteReader::new(writer.as_slice());
        decode_diff(&mut reader, &mut replica).unwrap();
        assert!(reader.is_exhausted());
        assert!(source.observably_equal(&replica));
        assert!(!replica.has(AttrKey::TextColor));
        assert!(!replica.is_dirty());
    }

    #[test]
    fn test_only_dirty_keys_travel() {
        let mut source = AttributeStore::new();
        source.set(AttrKey::Badge, AttrValue::Str("new".into())).unwrap();
        source.clear_dirty();
        source.set(AttrKey::Hotkey, AttrValue::Int(9)).unwrap();

        let mut writer = ByteWriter::new();
        encode_diff(&mut writer, &source);
        let mut replica = AttributeStore::new();
        let mut reader = ByteReader::new(writer.as_slice());
        decode_diff(&mut reader, &mut replica).unwrap();
        assert!(replica.has(AttrKey::Hotkey));
        assert!(!replica.has(AttrKey::Badge));
    }

    #[test]
    fn test_tombstone_never_collides_with_set() {
        for key in AttrKey::ALL {
            let set_prefix = {
                let mut w = ByteWriter::new();
                w.write_packed(i32::from(key.ordinal()));
                w.into_bytes()
            };
            let tombstone = {
                let mut w = ByteWriter::new();
                w.write_packed(-1 - i32::from(key.ordinal()));
                w.into_bytes()
            };
            assert_ne!(set_prefix, tombstone);
        }
    }

    #[test]
    fn test_unknown_ordinal_is_rejected() {
        let mut writer = ByteWriter::new();
        writer.write_packed(1);
        writer.write_packed(120);
        let mut replica = AttributeStore::new();
        let mut reader = ByteReader::new(writer.as_slice());
        assert_eq!(
            decode_diff(&mut reader, &mut replica),
            Err(DecodeError::UnknownAttr(120))
        );
    }

    #[test]
    fn test_negative_count_is_empty_diff() {
        let mut writer = ByteWriter::new();
        writer.write_packed(-3);
        let mut replica = AttributeStore::new();
        let mut reader = ByteReader::new(writer.as_slice());
        decode_diff(&mut reader, &mut replica).unwrap();
        assert!(!replica.is_dirty());
    }
}
