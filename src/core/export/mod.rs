//! One-time credential export

pub mod credentials;

pub use credentials::{
    credentials_filename, discard_passwords, export_credentials, CredentialExport,
    CREDENTIALS_HEADER,
};
