//! Password hashing and verification using Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use netbill_core::{CoreError, CoreResult};

fn peppered<'a>(password: &'a str, pepper: Option<&str>, buf: &'a mut String) -> &'a [u8] {
    match pepper {
        Some(p) => {
            buf.push_str(p);
            buf.push_str(password);
            buf.as_bytes()
        }
        None => password.as_bytes(),
    }
}

/// Hash a password into PHC string format.
///
/// If `pepper` is provided it is prepended to the password before hashing
/// and must match the pepper used at verification time.
pub fn hash_password(password: &str, pepper: Option<&str>) -> CoreResult<String> {
    let mut buf = String::new();
    let input = peppered(password, pepper, &mut buf);

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(input, &salt)
        .map(|h| h.to_string())
        .map_err(|e| CoreError::internal(format!("password hashing: {e}")))
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or an error if the
/// stored hash is malformed.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> CoreResult<bool> {
    let mut buf = String::new();
    let input = peppered(password, pepper, &mut buf);

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| CoreError::internal(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::internal(format!("verify error: {e}"))),
    }
}

/// Burn one hashing round for a login id that has no account.
///
/// Invariant: every login attempt costs exactly one Argon2id computation,
/// whether the user exists, the password is wrong, or the attempt is rate
/// limited. Timing must not reveal which case occurred.
pub fn dummy_verify(password: &str, pepper: Option<&str>) {
    let mut buf = String::new();
    let input = peppered(password, pepper, &mut buf);

    if let Ok(salt) = SaltString::encode_b64(b"netbill.dummy.salt") {
        let _ = Argon2::default().hash_password(input, &salt);
    }
}
