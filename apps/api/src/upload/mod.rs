// Pre-signed object-storage uploads (profile photos and résumé files).
// The API never proxies file bytes; clients PUT directly to the signed URL.

pub mod handlers;
pub mod signer;

pub use signer::UploadSigner;
