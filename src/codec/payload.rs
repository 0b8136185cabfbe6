use crate::codec::{Bounds, Codec, DecodeError, EncodeError, ReadCursor, SharedCodec, WriteCursor};
use crate::types::Value;

/// Encodes `fields` back to back into one buffer of exactly the summed size.
///
/// The payload carries no framing of its own: its total length is supplied by
/// whatever envelope transports it.
pub fn encode_fields(fields: &[(&dyn Codec, &Value)]) -> Result<Vec<u8>, EncodeError> {
    let calculated = fields.iter().try_fold(0usize, |total, (codec, value)| {
        Ok::<_, EncodeError>(total + codec.calculate_size(value)?)
    })?;

    let mut buf = vec![0u8; calculated];
    let mut cursor = WriteCursor::new(&mut buf);

    for (codec, value) in fields {
        codec.encode(&mut cursor, value)?;
    }

    if cursor.position() != calculated {
        return Err(EncodeError::SizeMismatch {
            calculated,
            written: cursor.position(),
        });
    }

    Ok(buf)
}

/// Decodes one value per codec, in order, from the rest of `cursor`.
///
/// The final field is decoded with `Bounds::Relaxed` since the envelope has
/// already fixed the payload length, and the payload must be exhausted
/// afterwards.
pub fn decode_fields(
    cursor: &mut ReadCursor<'_>,
    codecs: &[SharedCodec],
) -> Result<Vec<Value>, DecodeError> {
    let last = codecs.len().saturating_sub(1);

    let values = codecs
        .iter()
        .enumerate()
        .map(|(index, codec)| {
            let bounds = if index == last {
                Bounds::Relaxed
            } else {
                Bounds::Strict
            };
            codec.decode(cursor, bounds)
        })
        .collect::<Result<Vec<_>, _>>()?;

    cursor.ensure_exhausted()?;

    Ok(values)
}
