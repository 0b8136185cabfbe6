use crate::DispatchError;
use callweave::codec::{
    Codec, CodecError, CodecFactory, DecodeError, ReadCursor, SharedCodec, decode_fields,
    encode_fields, read_witness,
};
use callweave::types::{TypeRef, Value};
use callweave_service::{
    ImplReply, MethodCall, MethodDescription, RemotingStyle, ServiceImplementation, ServicePath,
};
use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::sync::Arc;

pub type HandlerFuture = BoxFuture<'static, Result<Vec<u8>, DispatchError>>;

/// Handler of one method with fully resolved types.
///
/// Owns the codecs of its request parameters, response parameters and
/// return value.
#[derive(Debug)]
pub struct ConcreteHandler {
    path: ServicePath,
    method: Arc<MethodDescription>,
    type_args: Vec<TypeRef>,
    request_positions: Vec<usize>,
    request_codecs: Vec<SharedCodec>,
    response: Vec<(usize, SharedCodec)>,
    return_codec: Option<SharedCodec>,
}

impl ConcreteHandler {
    pub(crate) fn build(
        path: ServicePath,
        method: Arc<MethodDescription>,
        factory: &CodecFactory,
        type_args: Vec<TypeRef>,
    ) -> Result<Self, CodecError> {
        let codec_for = |type_ref: &TypeRef| -> Result<SharedCodec, CodecError> {
            let closed = type_ref.substitute(&type_args).ok_or_else(|| {
                CodecError::OpenGeneric(type_ref.max_generic_index().unwrap_or(0))
            })?;
            factory.codec_for(&closed)
        };

        let mut request_positions = Vec::new();
        let mut request_codecs = Vec::new();
        for param in method.request_parameters() {
            request_positions.push(param.position);
            request_codecs.push(codec_for(&param.type_ref)?);
        }

        let response = method
            .response_parameters()
            .map(|param| Ok((param.position, codec_for(&param.type_ref)?)))
            .collect::<Result<Vec<_>, CodecError>>()?;

        let return_codec = if method.returns_value() {
            Some(codec_for(method.return_type())?)
        } else {
            None
        };

        Ok(Self {
            path,
            method,
            type_args,
            request_positions,
            request_codecs,
            response,
            return_codec,
        })
    }

    pub fn path(&self) -> &ServicePath {
        &self.path
    }

    pub fn type_args(&self) -> &[TypeRef] {
        &self.type_args
    }

    /// Decodes the request parameters, invokes `leaf`, and returns the
    /// operation that yields the encoded response.
    fn execute(
        &self,
        leaf: &dyn ServiceImplementation,
        cursor: &mut ReadCursor<'_>,
    ) -> Result<HandlerFuture, DispatchError> {
        let decoded = decode_fields(cursor, &self.request_codecs)?;

        let mut args = vec![Value::Null; self.method.parameters().len()];
        for (position, value) in self.request_positions.iter().zip(decoded) {
            args[*position] = value;
        }

        let mut call = MethodCall::new(self.method.clone(), self.type_args.clone(), args);
        let reply = leaf.invoke(&mut call)?;

        match (self.method.remoting(), reply) {
            (RemotingStyle::Direct, ImplReply::Value(return_value)) => {
                let payload = self.encode_direct(call.args(), &return_value)?;
                Ok(future::ready(Ok(payload)).boxed())
            }
            (RemotingStyle::Direct, ImplReply::Pending(_)) => Err(DispatchError::ReplyMismatch {
                method: self.method.name().to_owned(),
                style: RemotingStyle::Direct,
            }),
            (RemotingStyle::AsyncVoid, reply) => Ok(async move {
                if let ImplReply::Pending(pending) = reply {
                    pending.await?;
                }
                Ok::<Vec<u8>, DispatchError>(Vec::new())
            }
            .boxed()),
            (RemotingStyle::AsyncWithRetval, reply) => {
                let return_codec = self.return_codec.clone();
                Ok(async move {
                    let value = match reply {
                        ImplReply::Value(value) => value,
                        ImplReply::Pending(pending) => pending.await?,
                    };

                    let payload = match &return_codec {
                        Some(codec) => encode_fields(&[(codec.as_ref(), &value)])?,
                        None => Vec::new(),
                    };

                    Ok::<Vec<u8>, DispatchError>(payload)
                }
                .boxed())
            }
        }
    }

    /// Encodes Ref/Out parameters in declaration order, then the return
    /// value.
    fn encode_direct(&self, args: &[Value], return_value: &Value) -> Result<Vec<u8>, DispatchError> {
        let mut fields: Vec<(&dyn Codec, &Value)> = Vec::with_capacity(self.response.len() + 1);

        for (position, codec) in &self.response {
            fields.push((codec.as_ref(), &args[*position]));
        }

        if let Some(codec) = &self.return_codec {
            fields.push((codec.as_ref(), return_value));
        }

        Ok(encode_fields(&fields)?)
    }
}

/// Handler of a generic method.
///
/// Reads one type witness per generic parameter ahead of the regular
/// parameters and forwards to the concrete handler for that tuple of type
/// arguments, building it on first use. Concurrent first requests for the
/// same tuple may both build a handler, but only one is kept.
#[derive(Debug)]
pub struct GenericHandler {
    path: ServicePath,
    method: Arc<MethodDescription>,
    factory: CodecFactory,
    specializations: DashMap<Vec<TypeRef>, Arc<ConcreteHandler>>,
}

impl GenericHandler {
    pub(crate) fn new(path: ServicePath, method: Arc<MethodDescription>, factory: CodecFactory) -> Self {
        Self {
            path,
            method,
            factory,
            specializations: DashMap::new(),
        }
    }

    pub fn path(&self) -> &ServicePath {
        &self.path
    }

    pub fn specialization_count(&self) -> usize {
        self.specializations.len()
    }

    /// The concrete handler for the type arguments at the head of `cursor`.
    pub fn specialize(&self, cursor: &mut ReadCursor<'_>) -> Result<Arc<ConcreteHandler>, DecodeError> {
        let mut type_args = Vec::with_capacity(self.method.generic_arity());
        for _ in 0..self.method.generic_arity() {
            let witness = read_witness(cursor)?;
            if !witness.is_closed() {
                return Err(DecodeError::InvalidWitness(witness));
            }
            // A type argument must be encodable even when no parameter uses it.
            self.factory.codec_for(&witness)?;
            type_args.push(witness);
        }

        if let Some(existing) = self.specializations.get(&type_args) {
            return Ok(existing.clone());
        }

        let built = Arc::new(ConcreteHandler::build(
            self.path.clone(),
            self.method.clone(),
            &self.factory,
            type_args.clone(),
        )?);

        tracing::debug!(
            path = %self.path,
            type_args = ?type_args,
            "built handler specialization"
        );

        Ok(self.specializations.entry(type_args).or_insert(built).clone())
    }
}

/// Server-side entry point for one `ServicePath`.
#[derive(Debug, Clone)]
pub enum Handler {
    Concrete(Arc<ConcreteHandler>),
    Generic(Arc<GenericHandler>),
}

impl Handler {
    pub fn path(&self) -> &ServicePath {
        match self {
            Handler::Concrete(handler) => handler.path(),
            Handler::Generic(handler) => handler.path(),
        }
    }

    /// Handles one request against the root implementation of the service.
    ///
    /// Decoding starts at `offset` within `payload` and must consume the
    /// rest of it. Sub-services named on the path are looked up on
    /// `implementation` before invoking. Any failure before the
    /// implementation's own pending operation is reported through the
    /// returned future.
    pub fn handle(
        &self,
        implementation: Arc<dyn ServiceImplementation>,
        payload: &[u8],
        offset: usize,
    ) -> HandlerFuture {
        match self.dispatch(implementation, payload, offset) {
            Ok(pending) => pending,
            Err(err) => future::ready(Err(err)).boxed(),
        }
    }

    fn dispatch(
        &self,
        implementation: Arc<dyn ServiceImplementation>,
        payload: &[u8],
        offset: usize,
    ) -> Result<HandlerFuture, DispatchError> {
        let mut cursor = ReadCursor::at(payload, offset)?;

        let concrete = match self {
            Handler::Concrete(handler) => handler.clone(),
            Handler::Generic(handler) => handler.specialize(&mut cursor)?,
        };

        let leaf = self.resolve_leaf(implementation)?;
        concrete.execute(leaf.as_ref(), &mut cursor)
    }

    fn resolve_leaf(
        &self,
        root: Arc<dyn ServiceImplementation>,
    ) -> Result<Arc<dyn ServiceImplementation>, DispatchError> {
        self.path()
            .subservices()
            .iter()
            .try_fold(root, |current, name| {
                current
                    .subservice(name)
                    .ok_or_else(|| DispatchError::SubserviceUnavailable {
                        path: self.path().format(),
                        name: name.clone(),
                    })
            })
    }
}
