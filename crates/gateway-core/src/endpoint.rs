//! Endpoint Dispatcher (C6, spec.md §4.6).
//!
//! Framework-agnostic on purpose: this module never sees an HTTP request.
//! The wire front (`gateway-cli`) picks the path apart into a
//! [`WireShape`] and whatever credential material the transport exposes,
//! then calls [`resolve`]. Keeping axum (or any HTTP crate) out of this
//! crate's dependency graph means the auth-policy logic below is testable
//! without spinning up a server.

use crate::facade::ConfigStore;
use crate::model::{AuthPolicy, Endpoint, Principal};

/// Which wire shape an inbound request arrived on. Determines whether an
/// `api_key` query parameter is honored at all (spec.md §4.6: never on
/// SSE, since intermediaries commonly strip query strings from long-lived
/// event streams).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireShape {
    Sse,
    StreamableHttp,
    OpenApi,
}

impl WireShape {
    fn allows_query_param_credential(self) -> bool {
        !matches!(self, WireShape::Sse)
    }
}

/// Whatever credential material the caller extracted from the request,
/// still unvalidated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Credential<'a> {
    /// `Authorization: Bearer <k>`, already stripped of the scheme.
    pub bearer: Option<&'a str>,
    /// `?api_key=<k>`, only ever consulted if the endpoint's policy and
    /// the wire shape both allow it.
    pub query_api_key: Option<&'a str>,
}

/// The outcome of a successful dispatch: the resolved endpoint, and the
/// principal behind the credential (`None` for a public endpoint accessed
/// without one).
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub endpoint: Endpoint,
    pub principal: Option<Principal>,
}

/// Why dispatch refused a request, mapped directly to the HTTP statuses
/// spec.md §4.6 names: 404 unknown endpoint, 401 missing/invalid
/// credential, 403 forbidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    EndpointNotFound,
    MissingOrInvalidCredential,
    Forbidden,
}

/// Resolve `endpoint_name` + `shape` + `credential` to a [`Dispatch`],
/// enforcing the endpoint's [`AuthPolicy`] along the way (spec.md §4.6).
///
/// `AuthPolicy::Public` endpoints are private in spec.md's prose sense the
/// moment they require *any* credential: `RequireBearer` and
/// `AllowQueryParamBearer` both gate on "is this principal's key a
/// non-public one" per §4.8's `validateCredential` note — a public
/// (unowned) API key may authenticate but still can't reach a
/// non-`Public` endpoint.
pub async fn resolve(
    store: &dyn ConfigStore,
    endpoint_name: &str,
    shape: WireShape,
    credential: Credential<'_>,
) -> Result<Dispatch, DispatchError> {
    let endpoint = store
        .get_endpoint(endpoint_name)
        .await
        .map_err(|_| DispatchError::EndpointNotFound)?
        .ok_or(DispatchError::EndpointNotFound)?;

    if endpoint.auth == AuthPolicy::Public {
        // A credential may still be presented opportunistically (e.g. a
        // shared bearer header sent to every endpoint by a client); if so
        // it is validated and surfaced, but its absence is not an error.
        let principal = match extract_raw(&endpoint, shape, credential) {
            Some(raw) => store.validate_credential(raw).await.ok().flatten(),
            None => None,
        };
        return Ok(Dispatch { endpoint, principal });
    }

    let raw = extract_raw(&endpoint, shape, credential).ok_or(DispatchError::MissingOrInvalidCredential)?;
    let principal = store
        .validate_credential(raw)
        .await
        .map_err(|_| DispatchError::MissingOrInvalidCredential)?
        .ok_or(DispatchError::MissingOrInvalidCredential)?;

    if principal.is_public_key {
        return Err(DispatchError::Forbidden);
    }

    Ok(Dispatch { endpoint, principal: Some(principal) })
}

/// `Authorization: Bearer` always wins; the query param is only
/// considered when the endpoint's own policy allows it *and* the wire
/// shape isn't SSE.
fn extract_raw<'a>(endpoint: &Endpoint, shape: WireShape, credential: Credential<'a>) -> Option<&'a str> {
    if let Some(bearer) = credential.bearer {
        return Some(bearer);
    }
    if endpoint.auth == AuthPolicy::AllowQueryParamBearer && shape.allows_query_param_credential() {
        return credential.query_api_key;
    }
    None
}
