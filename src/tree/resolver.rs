//! Call-site resolution.
//!
//! The tree never inspects a live call stack. Whoever records or decodes a
//! trace hands it a [`CallSiteResolver`] that knows which types and methods
//! exist.

use super::call_site::CallSite;
use crate::utils::error::ResolveError;
use log::debug;
use std::collections::HashMap;

/// Maps signatures back to call sites
pub trait CallSiteResolver {
    /// Exact lookup by owner, method name and parameter types
    fn resolve(
        &self,
        owner_type: &str,
        method_name: &str,
        param_types: &[String],
    ) -> Result<CallSite, ResolveError>;

    /// Lookup by the runtime types of the arguments of a call
    ///
    /// A `None` argument type (an argument whose type is unknown) matches
    /// any parameter type. Exactly one candidate must remain.
    fn find_method(
        &self,
        owner_type: &str,
        method_name: &str,
        arg_types: &[Option<&str>],
    ) -> Result<CallSite, ResolveError>;
}

impl<T: CallSiteResolver + ?Sized> CallSiteResolver for &T {
    fn resolve(
        &self,
        owner_type: &str,
        method_name: &str,
        param_types: &[String],
    ) -> Result<CallSite, ResolveError> {
        (**self).resolve(owner_type, method_name, param_types)
    }

    fn find_method(
        &self,
        owner_type: &str,
        method_name: &str,
        arg_types: &[Option<&str>],
    ) -> Result<CallSite, ResolveError> {
        (**self).find_method(owner_type, method_name, arg_types)
    }
}

/// In-memory resolver holding the methods of every known owner type
///
/// **Public** - used by the workload, `verify` and `print`
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    types: HashMap<String, Vec<CallSite>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method to its owner type, declaring the type if needed
    pub fn register(&mut self, site: CallSite) {
        let methods = self.types.entry(site.owner_type().to_string()).or_default();
        if !methods.contains(&site) {
            methods.push(site);
        }
    }

    /// Declare a type that has no methods yet
    pub fn declare_type(&mut self, owner_type: impl Into<String>) {
        self.types.entry(owner_type.into()).or_default();
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, site: CallSite) -> Self {
        self.register(site);
        self
    }

    pub fn contains_type(&self, owner_type: &str) -> bool {
        self.types.contains_key(owner_type)
    }

    pub fn method_count(&self) -> usize {
        self.types.values().map(Vec::len).sum()
    }

    fn methods_of(&self, owner_type: &str) -> Result<&[CallSite], ResolveError> {
        self.types
            .get(owner_type)
            .map(Vec::as_slice)
            .ok_or_else(|| ResolveError::TypeNotFound(owner_type.to_string()))
    }
}

impl CallSiteResolver for SymbolTable {
    fn resolve(
        &self,
        owner_type: &str,
        method_name: &str,
        param_types: &[String],
    ) -> Result<CallSite, ResolveError> {
        self.methods_of(owner_type)?
            .iter()
            .find(|m| m.method_name() == method_name && m.param_types() == param_types)
            .cloned()
            .ok_or_else(|| ResolveError::MethodNotFound {
                owner_type: owner_type.to_string(),
                method_name: method_name.to_string(),
                params: param_types.join(", "),
            })
    }

    fn find_method(
        &self,
        owner_type: &str,
        method_name: &str,
        arg_types: &[Option<&str>],
    ) -> Result<CallSite, ResolveError> {
        let candidates: Vec<&CallSite> = self
            .methods_of(owner_type)?
            .iter()
            .filter(|m| m.method_name() == method_name && m.arity() == arg_types.len())
            .filter(|m| {
                m.param_types()
                    .iter()
                    .zip(arg_types)
                    .all(|(param, arg)| arg.map_or(true, |arg| arg == param))
            })
            .collect();

        debug!(
            "{} candidate(s) for {}.{} with {} argument(s)",
            candidates.len(),
            owner_type,
            method_name,
            arg_types.len()
        );

        match candidates.as_slice() {
            [site] => Ok((*site).clone()),
            [] => Err(ResolveError::MethodNotFound {
                owner_type: owner_type.to_string(),
                method_name: method_name.to_string(),
                params: describe_arg_types(arg_types),
            }),
            many => Err(ResolveError::MethodAmbiguous {
                owner_type: owner_type.to_string(),
                method_name: method_name.to_string(),
                params: describe_arg_types(arg_types),
                candidates: many.len(),
            }),
        }
    }
}

/// Resolver for tools without symbol information: every signature exists
///
/// Lookups by argument type only succeed when every type is known.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl CallSiteResolver for AcceptAll {
    fn resolve(
        &self,
        owner_type: &str,
        method_name: &str,
        param_types: &[String],
    ) -> Result<CallSite, ResolveError> {
        Ok(CallSite::new(owner_type, method_name, param_types.iter().cloned()))
    }

    fn find_method(
        &self,
        owner_type: &str,
        method_name: &str,
        arg_types: &[Option<&str>],
    ) -> Result<CallSite, ResolveError> {
        let params: Option<Vec<&str>> = arg_types.iter().copied().collect();
        params
            .map(|params| CallSite::new(owner_type, method_name, params))
            .ok_or_else(|| ResolveError::MethodNotFound {
                owner_type: owner_type.to_string(),
                method_name: method_name.to_string(),
                params: describe_arg_types(arg_types),
            })
    }
}

fn describe_arg_types(arg_types: &[Option<&str>]) -> String {
    arg_types
        .iter()
        .map(|t| t.unwrap_or("_"))
        .collect::<Vec<_>>()
        .join(", ")
}
