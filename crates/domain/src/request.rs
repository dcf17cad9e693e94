//! Request descriptors handed from the statement codec to the session layer
//!
//! A request names its action, its parameters and whether it reads or
//! mutates. The session layer decides everything else (HTTP method, token,
//! signing, retries) from that.

use std::collections::BTreeMap;

use crate::constants::{MULTI_VALUE_ALT_SEPARATOR, MULTI_VALUE_SEPARATOR};

/// Action API modules this client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Query,
    Login,
    Delete,
    WbSearchEntities,
    WbGetEntities,
    WbGetClaims,
    WbEditEntity,
    WbCreateClaim,
    WbSetClaim,
    WbSetClaimValue,
    WbRemoveClaims,
    WbSetQualifier,
    WbRemoveQualifiers,
    WbSetReference,
    WbRemoveReferences,
    WbSetLabel,
    WbSetDescription,
    WbSetAliases,
}

crate::impl_wire_enum_conversions!(Action {
    Query => "query",
    Login => "login",
    Delete => "delete",
    WbSearchEntities => "wbsearchentities",
    WbGetEntities => "wbgetentities",
    WbGetClaims => "wbgetclaims",
    WbEditEntity => "wbeditentity",
    WbCreateClaim => "wbcreateclaim",
    WbSetClaim => "wbsetclaim",
    WbSetClaimValue => "wbsetclaimvalue",
    WbRemoveClaims => "wbremoveclaims",
    WbSetQualifier => "wbsetqualifier",
    WbRemoveQualifiers => "wbremovequalifiers",
    WbSetReference => "wbsetreference",
    WbRemoveReferences => "wbremovereferences",
    WbSetLabel => "wbsetlabel",
    WbSetDescription => "wbsetdescription",
    WbSetAliases => "wbsetaliases",
});

/// Whether a request may change server state.
///
/// Reads are replayable after a lost response; edits are not, because the
/// client cannot tell "never arrived" from "applied, response lost".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One logical call against the action API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub action: Action,
    pub access: Access,
    pub params: BTreeMap<String, String>,
}

impl ApiRequest {
    /// A read-only request.
    pub fn read(action: Action) -> Self {
        Self { action, access: Access::Read, params: BTreeMap::new() }
    }

    /// A mutating request; the session attaches an edit token.
    pub fn edit(action: Action) -> Self {
        Self { action, access: Access::Edit, params: BTreeMap::new() }
    }

    #[must_use]
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Set `key` only when `value` is present.
    #[must_use]
    pub fn param_opt(self, key: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Set a multi-value parameter. Skipped when `values` is empty.
    #[must_use]
    pub fn param_list<I, S>(self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        if values.is_empty() {
            return self;
        }
        self.param(key, join_multi_value(&values))
    }

    /// Boolean flags are present-or-absent on the wire.
    #[must_use]
    pub fn flag(self, key: &str, enabled: bool) -> Self {
        if enabled {
            self.param(key, "1")
        } else {
            self
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn is_edit(&self) -> bool {
        self.access == Access::Edit
    }

    /// Edits are POSTed, reads use GET.
    pub fn method(&self) -> HttpMethod {
        match self.access {
            Access::Read => HttpMethod::Get,
            Access::Edit => HttpMethod::Post,
        }
    }
}

/// Join values for a multi-value parameter.
///
/// Values are joined with `|` unless one of them contains `|`, in which case
/// the whole string is prefixed with and joined by U+001F.
pub fn join_multi_value(values: &[String]) -> String {
    if values.iter().any(|v| v.contains(MULTI_VALUE_SEPARATOR)) {
        let sep = MULTI_VALUE_ALT_SEPARATOR.to_string();
        format!("{sep}{}", values.join(&sep))
    } else {
        values.join(&MULTI_VALUE_SEPARATOR.to_string())
    }
}
