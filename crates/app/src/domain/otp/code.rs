//! OTP codes

use std::fmt;

use creator_deals::otp::OTP_CODE_LENGTH;
use rand::{Rng, rngs::OsRng};
use zeroize::Zeroize;

/// A plaintext code on its way to the signer. Wiped from memory when dropped.
pub struct OtpCode(String);

impl OtpCode {
    /// A fresh six-digit code from the operating system's RNG.
    #[must_use]
    pub fn generate() -> Self {
        let value: u32 = OsRng.gen_range(0..1_000_000);

        Self(format!("{value:0width$}", width = OTP_CODE_LENGTH))
    }

    /// The digits, for hashing and delivery only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_digits(digits: &str) -> Self {
        Self(digits.to_string())
    }
}

impl Drop for OtpCode {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}
