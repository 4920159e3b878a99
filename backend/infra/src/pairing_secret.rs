//! Pairing secret generation.

use rand::RngCore;

use signd_core::PairingSecret;

/// Number of random bytes in a pairing secret.
pub const SECRET_LEN: usize = 32;

/// Generate a fresh pairing secret: 256 random bits, hex encoded.
pub fn generate_secret(workstation_name: Option<&str>) -> PairingSecret {
    let mut bytes = [0u8; SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    PairingSecret {
        secret: hex::encode(bytes),
        workstation_name: workstation_name.map(str::to_string),
    }
}
