use crate::codec::{
    ArrayCodec, BytesCodec, CodecError, MemberCodec, NullableCodec, PrimitiveCodec, SharedCodec,
    StringCodec, TypeWitnessCodec,
};
use crate::types::{MemberRegistry, TypeRef};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Stateless leaf codecs, shared process-wide.
static LEAF_CODECS: Lazy<HashMap<TypeRef, SharedCodec>> = Lazy::new(|| {
    let mut codecs: HashMap<TypeRef, SharedCodec> = HashMap::new();

    for type_ref in [
        TypeRef::Unit,
        TypeRef::Bool,
        TypeRef::I8,
        TypeRef::I16,
        TypeRef::I32,
        TypeRef::I64,
        TypeRef::U8,
        TypeRef::U16,
        TypeRef::U32,
        TypeRef::U64,
        TypeRef::F32,
        TypeRef::F64,
    ] {
        if let Some(codec) = PrimitiveCodec::new(type_ref.clone()) {
            codecs.insert(type_ref, Arc::new(codec));
        }
    }

    codecs.insert(TypeRef::String, Arc::new(StringCodec::new()));
    codecs.insert(TypeRef::Bytes, Arc::new(BytesCodec::new()));
    codecs.insert(TypeRef::Type, Arc::new(TypeWitnessCodec::new()));
    codecs
});

/// Builds codecs for closed types, composing them recursively.
///
/// The factory owns the member registry that identity-based codecs resolve
/// against, so every codec it hands out shares one view of the live members.
#[derive(Debug, Clone, Default)]
pub struct CodecFactory {
    registry: Arc<MemberRegistry>,
}

impl CodecFactory {
    pub fn new(registry: Arc<MemberRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<MemberRegistry> {
        &self.registry
    }

    /// Returns the codec for `type_ref`.
    ///
    /// Fails for open generic placeholders, `Pending` markers and the
    /// `member<Any>` kind; these are construction-time coverage errors.
    pub fn codec_for(&self, type_ref: &TypeRef) -> Result<SharedCodec, CodecError> {
        match type_ref {
            TypeRef::Array(element) => Ok(Arc::new(ArrayCodec::new(self.codec_for(element)?))),
            TypeRef::Nullable(inner) => Ok(Arc::new(NullableCodec::new(self.codec_for(inner)?))),
            TypeRef::Member(kind) => Ok(Arc::new(MemberCodec::new(*kind, self.registry.clone())?)),
            TypeRef::Generic(index) => Err(CodecError::OpenGeneric(*index)),
            TypeRef::Pending(_) => Err(CodecError::PendingType(type_ref.clone())),
            leaf => LEAF_CODECS
                .get(leaf)
                .cloned()
                .ok_or_else(|| CodecError::Unsupported(leaf.clone())),
        }
    }

    /// Builds one codec per type, in order.
    pub fn codecs_for<'t>(
        &self,
        types: impl IntoIterator<Item = &'t TypeRef>,
    ) -> Result<Vec<SharedCodec>, CodecError> {
        types.into_iter().map(|ty| self.codec_for(ty)).collect()
    }
}
