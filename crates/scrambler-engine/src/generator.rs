use std::collections::HashSet;

use rand::distr::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use scrambler_core::{Error, Result, ScrambleOptions};

/// Length of the random local part.
pub const TOKEN_LEN: usize = 8;

const LOCAL_PART_EXTRA: &str = "!#$%&'*+/=?^_`{|}~.-";

/// Placeholder email addresses at a reserved domain.
///
/// Values are distinct within one generator: a repeated draw is discarded.
#[derive(Debug, Clone)]
pub struct ValueGenerator {
    domain: String,
    rng: ChaCha8Rng,
    issued: HashSet<String>,
}

impl ValueGenerator {
    /// Generator seeded from the thread RNG.
    pub fn new(domain: &str) -> Result<Self> {
        Self::with_rng(domain, ChaCha8Rng::from_rng(&mut rand::rng()))
    }

    /// Reproducible generator.
    pub fn seeded(domain: &str, seed: u64) -> Result<Self> {
        Self::with_rng(domain, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_options(options: &ScrambleOptions) -> Result<Self> {
        match options.seed {
            Some(seed) => Self::seeded(&options.domain, seed),
            None => Self::new(&options.domain),
        }
    }

    fn with_rng(domain: &str, rng: ChaCha8Rng) -> Result<Self> {
        let sample = sanitize_email(&format!("sample@{}", domain.trim()))
            .ok_or_else(|| Error::InvalidConfig(format!("invalid placeholder domain: {domain}")))?;
        let (_, domain) = sample
            .split_once('@')
            .ok_or_else(|| Error::InvalidConfig(format!("invalid placeholder domain: {domain}")))?;

        Ok(Self {
            domain: domain.to_string(),
            rng,
            issued: HashSet::new(),
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn generate(&mut self) -> String {
        loop {
            let token: String = (0..TOKEN_LEN)
                .map(|_| char::from(self.rng.sample(Alphanumeric)))
                .collect();
            if let Some(email) = sanitize_email(&format!("{token}@{}", self.domain))
                && self.issued.insert(email.clone())
            {
                return email;
            }
        }
    }
}

/// Normalize an email address, or reject it.
///
/// Drops local-part characters outside the RFC 5322 atext set, lowercases the
/// domain, and strips invalid characters from each domain label. Requires a
/// single `@`, a non-empty local part, and at least two domain labels.
pub fn sanitize_email(input: &str) -> Option<String> {
    let (local, domain) = input.trim().split_once('@')?;
    if domain.contains('@') {
        return None;
    }

    let local: String = local
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || LOCAL_PART_EXTRA.contains(*ch))
        .collect();
    if local.is_empty() || local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return None;
    }

    let labels: Vec<String> = domain
        .trim_matches(|ch: char| ch == '.' || ch.is_whitespace())
        .split('.')
        .map(|label| {
            label
                .to_ascii_lowercase()
                .chars()
                .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
                .collect::<String>()
                .trim_matches('-')
                .to_string()
        })
        .filter(|label| !label.is_empty())
        .collect();
    if labels.len() < 2 {
        return None;
    }

    Some(format!("{local}@{}", labels.join(".")))
}
