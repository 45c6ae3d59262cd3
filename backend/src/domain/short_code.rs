//! Short codes used in recipe short links.
//!
//! Every recipe receives a random ten-character alphanumeric code when it is
//! created. The code never changes afterwards and resolves back to the
//! recipe through `/s/<code>`.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Number of characters in a short code.
pub const SHORT_CODE_LEN: usize = 10;

/// Upper bound on generation attempts before giving up.
pub const SHORT_CODE_ATTEMPTS: usize = 8;

/// Error returned when text is not a well-formed short code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("short code must be {SHORT_CODE_LEN} ASCII letters or digits")]
pub struct ShortCodeError;

/// A ten-character code drawn from `[A-Za-z0-9]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortCode(String);

impl ShortCode {
    /// Draw a fresh random code from `rng`.
    pub fn random(rng: &mut impl Rng) -> Self {
        let code = rng
            .sample_iter(&Alphanumeric)
            .take(SHORT_CODE_LEN)
            .map(char::from)
            .collect();
        Self(code)
    }

    /// The code as it appears in `/s/{code}` links.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ShortCode {
    type Err = ShortCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == SHORT_CODE_LEN && s.bytes().all(|byte| byte.is_ascii_alphanumeric()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(ShortCodeError)
        }
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    fn random_codes_are_well_formed() {
        let mut rng = SmallRng::seed_from_u64(7);
        let code = ShortCode::random(&mut rng);
        assert_eq!(code.as_str().len(), SHORT_CODE_LEN);
        assert_eq!(code.as_str().parse::<ShortCode>(), Ok(code.clone()));
    }

    #[rstest]
    fn random_codes_rarely_repeat() {
        let mut rng = SmallRng::seed_from_u64(11);
        let codes: HashSet<_> = (0..500).map(|_| ShortCode::random(&mut rng)).collect();
        assert_eq!(codes.len(), 500);
    }

    #[rstest]
    #[case("abc")]
    #[case("abcdefghijk")]
    #[case("abcde-ghij")]
    #[case("abcdéfghi")]
    fn rejects_malformed_text(#[case] raw: &str) {
        assert_eq!(raw.parse::<ShortCode>(), Err(ShortCodeError));
    }
}
