use crate::compiled_method::{CompiledMethod, MethodCodecs};
use crate::{OutgoingRequest, OutgoingRequestProcessor, RpcCallerError};
use callweave::types::{TypeRef, Value};
use callweave_service::{RemotingStyle, ServicePath};
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub use crate::compiled_method::DirectReply;

pub type PendingReply = BoxFuture<'static, Result<Value, RpcCallerError>>;

/// Arguments of one call: generic type arguments, then request values
/// (Val and Ref parameters, in declaration order).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub type_args: Vec<TypeRef>,
    pub values: Vec<Value>,
}

impl CallArgs {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            type_args: Vec::new(),
            values,
        }
    }

    pub fn generic(type_args: Vec<TypeRef>, values: Vec<Value>) -> Self {
        Self { type_args, values }
    }
}

impl From<Vec<Value>> for CallArgs {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl From<()> for CallArgs {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

pub enum CallReply {
    Direct(DirectReply),
    /// The pending operation of an async call. Resolves to `Value::Unit`
    /// for `AsyncVoid` methods.
    Pending(PendingReply),
}

/// Compiled form of one service description, shared by all proxy nodes
/// built from it.
#[derive(Debug)]
pub(crate) struct CompiledService {
    pub(crate) name: String,
    pub(crate) methods: HashMap<String, Arc<CompiledMethod>>,
    pub(crate) subservices: Vec<(String, Arc<CompiledService>)>,
}

/// A callable view of a service for one (scope, timeout) pair.
///
/// Child nodes for every sub-service are built together with their parent
/// and share its processor, scope and timeout.
pub struct ProxyNode {
    service: Arc<CompiledService>,
    processor: Arc<dyn OutgoingRequestProcessor>,
    interface_id: Arc<str>,
    path: Vec<String>,
    scope: Option<Arc<str>>,
    timeout: Duration,
    children: HashMap<String, Arc<ProxyNode>>,
}

impl ProxyNode {
    pub(crate) fn new(
        service: Arc<CompiledService>,
        processor: Arc<dyn OutgoingRequestProcessor>,
        interface_id: Arc<str>,
        path: Vec<String>,
        scope: Option<Arc<str>>,
        timeout: Duration,
    ) -> Self {
        let children = service
            .subservices
            .iter()
            .map(|(name, child)| {
                let mut child_path = path.clone();
                child_path.push(name.clone());

                let node = ProxyNode::new(
                    child.clone(),
                    processor.clone(),
                    interface_id.clone(),
                    child_path,
                    scope.clone(),
                    timeout,
                );

                (name.clone(), Arc::new(node))
            })
            .collect();

        Self {
            service,
            processor,
            interface_id,
            path,
            scope,
            timeout,
            children,
        }
    }

    /// Root service name followed by the sub-service chain.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interface_id(&self) -> &str {
        &self.interface_id
    }

    pub fn subservice(&self, name: &str) -> Option<&Arc<ProxyNode>> {
        self.children.get(name)
    }

    /// Number of generic specializations built so far for `method`.
    pub fn specialization_count(&self, method: &str) -> usize {
        self.service
            .methods
            .get(method)
            .map_or(0, |compiled| compiled.specialization_count())
    }

    /// Encodes and dispatches a call, whatever its remoting style.
    pub fn invoke(
        &self,
        method: &str,
        args: impl Into<CallArgs>,
    ) -> Result<CallReply, RpcCallerError> {
        let (compiled, codecs, request) = self.prepare(method, args.into())?;

        match compiled.description().remoting() {
            RemotingStyle::Direct => {
                let payload = self.processor.process(request)?;
                Ok(CallReply::Direct(Self::finish_direct(&compiled, &codecs, &payload)?))
            }
            style => Ok(CallReply::Pending(self.dispatch_async(style, codecs, request))),
        }
    }

    /// Performs a Direct call.
    pub fn call(
        &self,
        method: &str,
        args: impl Into<CallArgs>,
    ) -> Result<DirectReply, RpcCallerError> {
        Self::expect_style(self.method(method)?.as_ref(), |style| {
            style == RemotingStyle::Direct
        })?;

        let (compiled, codecs, request) = self.prepare(method, args.into())?;
        let payload = self.processor.process(request)?;

        Self::finish_direct(&compiled, &codecs, &payload)
    }

    /// Performs an `AsyncVoid` or `AsyncWithRetval` call.
    ///
    /// Encoding happens immediately. The returned operation sends the request
    /// when first polled, and the return value is decoded only once the
    /// response has arrived. Dropping the operation before polling it means
    /// the call is never sent, `AsyncVoid` calls included.
    pub fn call_async(&self, method: &str, args: impl Into<CallArgs>) -> PendingReply {
        let prepared = self.method(method).and_then(|compiled| {
            Self::expect_style(&compiled, |style| style != RemotingStyle::Direct)?;
            self.prepare(method, args.into())
        });

        match prepared {
            Ok((compiled, codecs, request)) => {
                self.dispatch_async(compiled.description().remoting(), codecs, request)
            }
            Err(err) => future::ready(Err(err)).boxed(),
        }
    }

    fn method(&self, name: &str) -> Result<Arc<CompiledMethod>, RpcCallerError> {
        self.service
            .methods
            .get(name)
            .cloned()
            .ok_or_else(|| RpcCallerError::UnknownMethod {
                service: self.service.name.clone(),
                method: name.to_owned(),
            })
    }

    fn expect_style(
        compiled: &CompiledMethod,
        accept: impl Fn(RemotingStyle) -> bool,
    ) -> Result<(), RpcCallerError> {
        let style = compiled.description().remoting();
        if accept(style) {
            Ok(())
        } else {
            Err(RpcCallerError::RemotingMismatch {
                method: compiled.description().name().to_owned(),
                style,
            })
        }
    }

    fn prepare(
        &self,
        method: &str,
        args: CallArgs,
    ) -> Result<(Arc<CompiledMethod>, Arc<MethodCodecs>, OutgoingRequest), RpcCallerError> {
        let compiled = self.method(method)?;
        let codecs = compiled.codecs(&args.type_args)?;
        let payload = compiled.encode_request(&codecs, &args.type_args, &args.values)?;

        let request = OutgoingRequest {
            interface_id: self.interface_id.clone(),
            path: ServicePath::for_method(&self.path, method)?,
            scope: self.scope.clone(),
            payload,
            timeout: self.timeout,
        };

        tracing::trace!(
            path = %request.path,
            bytes = request.payload.as_ref().map_or(0, Vec::len),
            "dispatching call"
        );

        Ok((compiled, codecs, request))
    }

    fn finish_direct(
        compiled: &CompiledMethod,
        codecs: &MethodCodecs,
        payload: &[u8],
    ) -> Result<DirectReply, RpcCallerError> {
        if !compiled.description().has_response() {
            return Ok(DirectReply {
                response_parameters: Vec::new(),
                return_value: Value::Unit,
            });
        }

        Ok(codecs.decode_direct(payload)?)
    }

    fn dispatch_async(
        &self,
        style: RemotingStyle,
        codecs: Arc<MethodCodecs>,
        request: OutgoingRequest,
    ) -> PendingReply {
        let processor = self.processor.clone();

        async move {
            let payload = processor.process_async(request).await?;

            let value = match style {
                RemotingStyle::AsyncWithRetval => codecs.decode_return(&payload)?,
                _ => Value::Unit,
            };

            Ok::<Value, RpcCallerError>(value)
        }
        .boxed()
    }
}
