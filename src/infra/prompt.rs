//! Infrastructure implementations of the `SecretSource` port.
//!
//! `DialoguerSecretSource` prompts the operator for hex-encoded secret
//! material with hidden input; `GeneratedSecretSource` draws fresh random
//! material for non-interactive runs.

use anyhow::{Context, Result};
use dialoguer::Password;
use dialoguer::theme::ColorfulTheme;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::application::ports::SecretSource;
use crate::domain::{SECRET_LENGTH, SecretCommitment};

fn is_hex_secret(input: &str) -> bool {
    hex::decode(input).is_ok_and(|bytes| bytes.len() == SECRET_LENGTH)
}

/// Interactive secret collection via hidden terminal prompts.
///
/// Hex format and length are validated at the prompt, so the commitment
/// handed back can only fail on secret/confirmation mismatch.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerSecretSource;

impl DialoguerSecretSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SecretSource for DialoguerSecretSource {
    fn collect(&self, unit_name: &str) -> Result<SecretCommitment> {
        let hint = format!("{} hex characters", SECRET_LENGTH * 2);
        let validate = move |input: &String| {
            if is_hex_secret(input) {
                Ok(())
            } else {
                Err(format!("enter exactly {hint}"))
            }
        };

        let secret = Password::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Upgrade secret for {unit_name}"))
            .validate_with(validate.clone())
            .interact()
            .context("reading secret")?;
        let confirmation = Password::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Confirm upgrade secret for {unit_name}"))
            .validate_with(validate)
            .interact()
            .context("reading secret confirmation")?;

        // The prompt validator guarantees both sides decode.
        Ok(SecretCommitment::new(
            hex::decode(&secret).context("decoding secret")?,
            hex::decode(&confirmation).context("decoding secret confirmation")?,
        ))
    }
}

/// Random secret material from the operating system, used when prompting
/// is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeneratedSecretSource;

impl GeneratedSecretSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SecretSource for GeneratedSecretSource {
    fn collect(&self, _unit_name: &str) -> Result<SecretCommitment> {
        let mut bytes = vec![0u8; SECRET_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Ok(SecretCommitment::new(bytes.clone(), bytes))
    }
}
