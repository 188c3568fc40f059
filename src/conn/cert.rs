//! TLS root-credential provisioning into the modem secure store.
//!
//! The CA chain is compiled into the firmware image and written to a fixed
//! security tag before the first network attach, so the modem can terminate
//! TLS toward the endpoint service without the application ever holding the
//! session keys.
//!
//! Provisioning is idempotent from the caller's point of view: whatever
//! occupies the tag is deleted (best-effort) and the compiled-in blob is
//! written fresh.  A single attempt; a write failure is fatal-boot.

use log::{debug, warn};

use crate::app::ports::{CredentialKind, SecureStorePort};
use crate::config::TLS_SEC_TAG;
use crate::error::StoreError;

/// Compiled-in root CA chain, PEM-encoded.
///
/// NUL-terminated like the C string literal the provisioning tooling
/// produces; the terminator is stripped before the store write.
static CA_CHAIN: &[u8] = b"-----BEGIN CERTIFICATE-----\n\
MIIDSjCCAjKgAwIBAgIQRK+wgNajJ7qJMDmGLvhAazANBgkqhkiG9w0BAQUFADA/\n\
MSQwIgYDVQQKExtEaWdpdGFsIFNpZ25hdHVyZSBUcnVzdCBDby4xFzAVBgNVBAMT\n\
DkRTVCBSb290IENBIFgzMB4XDTAwMDkzMDIxMTIxOVoXDTIxMDkzMDE0MDExNVow\n\
PzEkMCIGA1UEChMbRGlnaXRhbCBTaWduYXR1cmUgVHJ1c3QgQ28uMRcwFQYDVQQD\n\
Ew5EU1QgUm9vdCBDQSBYMzCCASIwDQYJKoZIhvcNAQEBBQADggEPADCCAQoCggEB\n\
AN+v6ZdQCINXtMxiZfaQguzH0yxrMMpb7NnDfcdAwRgUi+DoM3ZJKuM/IUmTrE4O\n\
rz5Iy2Xu/NMhD2XSKtkyj4zl93ewEnu1lcCJo6m67XMuegwGMoOifooUMM0RoOEq\n\
OLl5CjH9UL2AZd+3UWODyOKIYepLYYHsUmu5ouJLGiifSKOeDNoJjj4XLh7dIN9b\n\
xiqKqy69cK3FCxolkHRyxXtqqzTWMIn/5WgTe1QLyNau7Fqckh49ZLOMxt+/yUFw\n\
7BZy1SbsOFU5Q9D8/RhcQPGX69Wam40dutolucbY38EVAjqr2m7xPi71XAicPNaD\n\
aeQQmxkqtilX4+U9m5/wAl0CAwEAAaNCMEAwDwYDVR0TAQH/BAUwAwEB/zAOBgNV\n\
HQ8BAf8EBAMCAQYwHQYDVR0OBBYEFMSnsaR7LHH62+FLkHX/xBVghYkQMA0GCSqG\n\
SIb3DQEBBQUAA4IBAQCjGiybFwBcqR7uKGY3Or+Dxz9LwwmglSBd49lZRNI+DT69\n\
ikugdB/OEIKcdBodfpga3csTS7MgROSR6cz8faXbauX+5v3gTt23ADq1cEmv8uXr\n\
AvHRAosZy5Q6XkjEGB5YGV8eAlrwDPGxrancWYaLbumR9YbK+rlmM6pZW87ipxZz\n\
R8srzJmwN0jP41ZL9c8PDHIyh8bwRLtTcm1D9SZImlJnt1ir/md2cXjbDaJWFBM5\n\
JDGFoqgCWjBH4d1QB7wCCZAA62RjYJsWvIjJEubSfZGL+T0yjWW06XyxV3bqxbYo\n\
Ob8VZRzI9neWagqNdwvYkQsEjgfbKbYK7p2CNTUQ\n\
-----END CERTIFICATE-----\n\0";

// Mirrors the secure-store slot limit.
const _: () = assert!(CA_CHAIN.len() < 4096, "Certificate too large");

/// The provisioned payload: the PEM blob minus its trailing terminator.
pub fn payload() -> &'static [u8] {
    &CA_CHAIN[..CA_CHAIN.len() - 1]
}

/// Install the root credential at the fixed security tag.
///
/// A delete failure for a pre-existing credential is logged and ignored;
/// the overwrite is attempted regardless.  An existence-query or write
/// failure aborts boot.
pub fn provision(store: &mut impl SecureStorePort) -> Result<(), StoreError> {
    let exists = store.cred_exists(TLS_SEC_TAG, CredentialKind::CaChain)?;

    if exists {
        // Delete whatever is provisioned at our tag and reprovision.
        if let Err(e) = store.cred_delete(TLS_SEC_TAG, CredentialKind::CaChain) {
            warn!("cert: delete of existing credential failed ({e}), overwriting anyway");
        }
    }

    debug!("cert: provisioning CA chain ({} bytes)", payload().len());
    store.cred_write(TLS_SEC_TAG, CredentialKind::CaChain, payload())?;

    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
