mod array_codec;
mod codec_cursor;
mod codec_error;
mod codec_factory;
mod codec_trait;
mod member_codec;
mod nullable_codec;
mod payload;
mod primitive_codec;
mod string_codec;
mod type_codec;

pub use array_codec::ArrayCodec;
pub use codec_cursor::{ReadCursor, WriteCursor};
pub use codec_error::{CodecError, DecodeError, EncodeError};
pub use codec_factory::CodecFactory;
pub use codec_trait::{Bounds, Codec, SharedCodec};
pub use member_codec::MemberCodec;
pub use nullable_codec::NullableCodec;
pub use payload::{decode_fields, encode_fields};
pub use primitive_codec::PrimitiveCodec;
pub use string_codec::{BytesCodec, StringCodec};
pub use type_codec::{TypeWitnessCodec, read_witness, witness_depth, witness_size, write_witness};
