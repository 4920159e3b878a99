//! Concrete collaborators for the signd control server.
//!
//! Provides the in-memory mailbox enclave client, pairing secret generation
//! and the sources of the last observed shell command.

pub mod enclave_mailbox;
pub mod last_command;
pub mod pairing_secret;

pub use enclave_mailbox::{MailboxEnclave, Outgoing};
pub use last_command::{default_command_file, CommandFile, SharedCommand};
pub use pairing_secret::generate_secret;
