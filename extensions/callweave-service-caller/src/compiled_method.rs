use crate::RpcCallerError;
use callweave::codec::{
    Codec, CodecError, CodecFactory, DecodeError, ReadCursor, SharedCodec, decode_fields,
    encode_fields,
};
use callweave::types::{TypeRef, Value};
use callweave_service::MethodDescription;
use dashmap::DashMap;
use std::sync::Arc;

/// Decoded result of a Direct call.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectReply {
    /// Final values of the Ref and Out parameters, in declaration order.
    pub response_parameters: Vec<Value>,
    /// `Value::Unit` for void methods.
    pub return_value: Value,
}

/// Codecs of one concrete method (generic arguments already substituted).
#[derive(Debug)]
pub(crate) struct MethodCodecs {
    request: Vec<SharedCodec>,
    /// Ref/Out parameters, then the return value if it is not void.
    response: Vec<SharedCodec>,
    returns_value: bool,
}

impl MethodCodecs {
    fn build(
        method: &MethodDescription,
        factory: &CodecFactory,
        type_args: &[TypeRef],
    ) -> Result<Self, CodecError> {
        let codec_for = |type_ref: &TypeRef| -> Result<SharedCodec, CodecError> {
            let closed = type_ref
                .substitute(type_args)
                .ok_or_else(|| CodecError::OpenGeneric(type_ref.max_generic_index().unwrap_or(0)))?;
            factory.codec_for(&closed)
        };

        let request = method
            .request_parameters()
            .map(|param| codec_for(&param.type_ref))
            .collect::<Result<Vec<_>, _>>()?;

        let mut response = method
            .response_parameters()
            .map(|param| codec_for(&param.type_ref))
            .collect::<Result<Vec<_>, _>>()?;

        if method.returns_value() {
            response.push(codec_for(method.return_type())?);
        }

        Ok(Self {
            request,
            response,
            returns_value: method.returns_value(),
        })
    }

    /// Decodes a Direct response: response parameters first, return value last.
    pub(crate) fn decode_direct(&self, payload: &[u8]) -> Result<DirectReply, DecodeError> {
        let mut values = decode_fields(&mut ReadCursor::new(payload), &self.response)?;

        let return_value = if self.returns_value {
            values.pop().unwrap_or(Value::Unit)
        } else {
            Value::Unit
        };

        Ok(DirectReply {
            response_parameters: values,
            return_value,
        })
    }

    /// Decodes the return value of an `AsyncWithRetval` call.
    pub(crate) fn decode_return(&self, payload: &[u8]) -> Result<Value, DecodeError> {
        let mut values = decode_fields(&mut ReadCursor::new(payload), &self.response)?;
        Ok(values.pop().unwrap_or(Value::Unit))
    }
}

/// Client-side plan of one method.
///
/// Non-generic methods carry their codecs from compile time. Generic methods
/// build codecs per distinct tuple of type arguments, on first use, and keep
/// them for the life of the compiled service.
#[derive(Debug)]
pub(crate) struct CompiledMethod {
    description: Arc<MethodDescription>,
    factory: CodecFactory,
    witness: SharedCodec,
    concrete: Option<Arc<MethodCodecs>>,
    specializations: DashMap<Vec<TypeRef>, Arc<MethodCodecs>>,
}

impl CompiledMethod {
    pub(crate) fn new(
        description: Arc<MethodDescription>,
        factory: &CodecFactory,
    ) -> Result<Self, CodecError> {
        let concrete = if description.is_generic() {
            None
        } else {
            Some(Arc::new(MethodCodecs::build(&description, factory, &[])?))
        };

        Ok(Self {
            witness: factory.codec_for(&TypeRef::Type)?,
            factory: factory.clone(),
            description,
            concrete,
            specializations: DashMap::new(),
        })
    }

    pub(crate) fn description(&self) -> &Arc<MethodDescription> {
        &self.description
    }

    pub(crate) fn codecs(&self, type_args: &[TypeRef]) -> Result<Arc<MethodCodecs>, RpcCallerError> {
        let expected = self.description.generic_arity();
        if type_args.len() != expected {
            return Err(RpcCallerError::GenericArgumentCount {
                method: self.description.name().to_owned(),
                expected,
                found: type_args.len(),
            });
        }

        if let Some(concrete) = &self.concrete {
            return Ok(concrete.clone());
        }

        if let Some(open) = type_args.iter().find(|arg| !arg.is_closed()) {
            return Err(RpcCallerError::OpenTypeArgument(open.clone()));
        }

        // Witnesses are only sent for types both sides can encode.
        for arg in type_args {
            self.factory.codec_for(arg)?;
        }

        if let Some(existing) = self.specializations.get(type_args) {
            return Ok(existing.clone());
        }

        let built = Arc::new(MethodCodecs::build(
            &self.description,
            &self.factory,
            type_args,
        )?);

        tracing::debug!(
            method = self.description.name(),
            type_args = ?type_args,
            "built client specialization"
        );

        Ok(self
            .specializations
            .entry(type_args.to_vec())
            .or_insert(built)
            .clone())
    }

    /// Encodes generic witnesses, then request parameters, into one buffer.
    ///
    /// Returns `None` when there is nothing to send.
    pub(crate) fn encode_request(
        &self,
        codecs: &MethodCodecs,
        type_args: &[TypeRef],
        values: &[Value],
    ) -> Result<Option<Vec<u8>>, RpcCallerError> {
        if values.len() != codecs.request.len() {
            return Err(RpcCallerError::ArgumentCount {
                method: self.description.name().to_owned(),
                expected: codecs.request.len(),
                found: values.len(),
            });
        }

        let witnesses: Vec<Value> = type_args.iter().cloned().map(Value::Type).collect();

        let fields: Vec<(&dyn Codec, &Value)> = witnesses
            .iter()
            .map(|witness| (self.witness.as_ref(), witness))
            .chain(
                codecs
                    .request
                    .iter()
                    .zip(values)
                    .map(|(codec, value)| (codec.as_ref(), value)),
            )
            .collect();

        let payload = encode_fields(&fields)?;

        if payload.is_empty() && type_args.is_empty() {
            return Ok(None);
        }

        Ok(Some(payload))
    }

    pub(crate) fn specialization_count(&self) -> usize {
        self.specializations.len()
    }
}
