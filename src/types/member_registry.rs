use crate::codec::DecodeError;
use crate::types::{MemberInfo, MemberKind, TypeRef};
use std::collections::HashMap;
use std::sync::Arc;

/// Explicit catalogue of the members that identity-based codecs may carry.
///
/// The registry is populated once at startup (typically from the service
/// descriptions the process knows about) and then shared immutably behind an
/// `Arc`. Decoding a member identity re-resolves it here, reproducing the
/// overload-selection rule of exact parameter-type match after generic
/// substitution.
#[derive(Debug, Default)]
pub struct MemberRegistry {
    by_name: HashMap<(String, String), Vec<Arc<MemberInfo>>>,
    len: usize,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a member, returning the shared instance.
    ///
    /// Registering a member identical to an existing one returns the existing
    /// instance; overloads (same name, different signature) are kept side by
    /// side.
    pub fn register(&mut self, info: MemberInfo) -> Arc<MemberInfo> {
        let overloads = self
            .by_name
            .entry((info.declaring_type.clone(), info.name.clone()))
            .or_default();

        if let Some(existing) = overloads.iter().find(|existing| ***existing == info) {
            return existing.clone();
        }

        let info = Arc::new(info);
        overloads.push(info.clone());
        self.len += 1;

        tracing::trace!(
            declaring_type = %info.declaring_type,
            name = %info.name,
            kind = ?info.kind,
            "registered member"
        );

        info
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All registered members of `declaring_type` named `name`, any kind.
    pub fn overloads(&self, declaring_type: &str, name: &str) -> &[Arc<MemberInfo>] {
        self.by_name
            .get(&(declaring_type.to_owned(), name.to_owned()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolves a member identity to exactly one registered member.
    ///
    /// Non-callable members match on kind, declaring type and name. Callable
    /// members must additionally have the same generic arity, and their
    /// parameter types (after substituting `generic_arguments`, when given)
    /// must equal `parameter_types` position by position.
    pub fn resolve(
        &self,
        kind: MemberKind,
        declaring_type: &str,
        name: &str,
        generic_arity: u16,
        generic_arguments: &[TypeRef],
        parameter_types: &[TypeRef],
    ) -> Result<Arc<MemberInfo>, DecodeError> {
        let mut matches = self
            .overloads(declaring_type, name)
            .iter()
            .filter(|candidate| candidate.kind == kind)
            .filter(|candidate| {
                !kind.is_callable()
                    || Self::signature_matches(
                        candidate,
                        generic_arity,
                        generic_arguments,
                        parameter_types,
                    )
            });

        match (matches.next(), matches.next()) {
            (Some(found), None) => Ok(found.clone()),
            (first, _) => Err(DecodeError::AmbiguousOrMissingMember {
                kind,
                declaring_type: declaring_type.to_owned(),
                name: name.to_owned(),
                matches: if first.is_some() { 2 + matches.count() } else { 0 },
            }),
        }
    }

    fn signature_matches(
        candidate: &MemberInfo,
        generic_arity: u16,
        generic_arguments: &[TypeRef],
        parameter_types: &[TypeRef],
    ) -> bool {
        if candidate.generic_arity != generic_arity
            || candidate.parameter_types.len() != parameter_types.len()
        {
            return false;
        }

        candidate
            .parameter_types
            .iter()
            .zip(parameter_types)
            .all(|(open, expected)| {
                if generic_arguments.is_empty() {
                    return open == expected;
                }

                open.substitute(generic_arguments).as_ref() == Some(expected)
            })
    }
}
