//! BRAVIA control endpoint definitions.
//!
//! Single source of truth for the endpoint paths used by the JSON-RPC calls
//! and the IRCC button-code call.

/// Endpoints exposed by the television's control server.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum BraviaService {
    /// System information, power status and remote-controller catalog.
    System,
    /// External input listing and input switching.
    AvContent,
    /// Remote button codes (SOAP envelope, not JSON-RPC).
    Ircc,
}

impl BraviaService {
    /// Returns the endpoint path under the device's base URL.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::System => "/sony/system",
            Self::AvContent => "/sony/avContent",
            Self::Ircc => "/sony/IRCC",
        }
    }

    /// Returns a human-readable name for this endpoint.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::AvContent => "avContent",
            Self::Ircc => "IRCC",
        }
    }

    /// Returns true if the endpoint speaks JSON-RPC.
    #[must_use]
    pub fn is_json_rpc(&self) -> bool {
        !matches!(self, Self::Ircc)
    }
}

impl std::fmt::Display for BraviaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
