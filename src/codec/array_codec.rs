use crate::codec::{Bounds, Codec, DecodeError, EncodeError, ReadCursor, SharedCodec, WriteCursor};
use crate::constants::{LENGTH_PREFIX_SIZE, MAX_ZERO_WIDTH_ELEMENTS};
use crate::types::{TypeRef, Value};

/// Count-prefixed sequence of elements encoded by an inner codec.
///
/// A `-1` count encodes a null array. When the element codec is fixed-size
/// the payload size is computed without visiting the elements.
#[derive(Debug)]
pub struct ArrayCodec {
    type_ref: TypeRef,
    element: SharedCodec,
}

impl ArrayCodec {
    pub fn new(element: SharedCodec) -> Self {
        Self {
            type_ref: TypeRef::array(element.type_ref().clone()),
            element,
        }
    }

    pub fn element(&self) -> &SharedCodec {
        &self.element
    }

    fn is_zero_width(&self) -> bool {
        self.element.fixed_size() == Some(0)
    }

    fn check_count(&self, count: usize) -> Result<(), EncodeError> {
        if self.is_zero_width() && count > MAX_ZERO_WIDTH_ELEMENTS {
            return Err(EncodeError::TooManyZeroWidthElements {
                count,
                max: MAX_ZERO_WIDTH_ELEMENTS,
            });
        }
        Ok(())
    }
}

impl Codec for ArrayCodec {
    fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    fn min_size(&self) -> usize {
        LENGTH_PREFIX_SIZE
    }

    fn calculate_size(&self, value: &Value) -> Result<usize, EncodeError> {
        let items = match value {
            Value::Null => return Ok(LENGTH_PREFIX_SIZE),
            Value::Array(items) => items,
            other => return Err(self.mismatch(other)),
        };

        self.check_count(items.len())?;

        if let Some(width) = self.element.fixed_size() {
            // Still validate element types so encode cannot fail halfway.
            for item in items {
                self.element.calculate_size(item)?;
            }
            return Ok(LENGTH_PREFIX_SIZE + width * items.len());
        }

        items.iter().try_fold(LENGTH_PREFIX_SIZE, |total, item| {
            Ok(total + self.element.calculate_size(item)?)
        })
    }

    fn encode(&self, cursor: &mut WriteCursor<'_>, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => cursor.put_length(None),
            Value::Array(items) => {
                self.check_count(items.len())?;
                cursor.put_length(Some(items.len()))?;
                for item in items {
                    self.element.encode(cursor, item)?;
                }
                Ok(())
            }
            other => Err(self.mismatch(other)),
        }
    }

    fn decode(&self, cursor: &mut ReadCursor<'_>, bounds: Bounds) -> Result<Value, DecodeError> {
        let Some(count) = cursor.read_length(bounds, self.element.min_size())? else {
            return Ok(Value::Null);
        };

        if self.is_zero_width() && count > MAX_ZERO_WIDTH_ELEMENTS {
            return Err(DecodeError::TooManyZeroWidthElements {
                declared: count,
                max: MAX_ZERO_WIDTH_ELEMENTS,
            });
        }

        // Relaxed bounds skip the plausibility check, so never trust `count`
        // for the allocation itself.
        let mut items = Vec::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            items.push(self.element.decode(cursor, Bounds::Strict)?);
        }

        Ok(Value::Array(items))
    }
}
