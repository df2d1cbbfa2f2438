//! Issuance artifacts for new cards: number, security code, printed name,
//! and expiration date.

use chrono::{DateTime, Datelike, Months, Utc};
use ring::rand::SecureRandom;

use crate::error::{AppError, Result};

const CARD_NUMBER_LEN: usize = 16;
const SECURITY_CODE_LEN: usize = 3;
const VALIDITY_YEARS: u32 = 5;
const MIN_MIDDLE_NAME_LEN: usize = 3;

/// Draws uniformly distributed decimal digits from the RNG
fn random_digits(rng: &dyn SecureRandom, count: usize) -> Result<Vec<u8>> {
    let mut digits = Vec::with_capacity(count);
    let mut buf = [0u8; 16];

    while digits.len() < count {
        rng.fill(&mut buf)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate random bytes")))?;

        // Bytes >= 250 would bias the result towards 0..=5
        let remaining = count - digits.len();
        digits.extend(
            buf.iter()
                .filter(|&&b| b < 250)
                .map(|&b| b % 10)
                .take(remaining),
        );
    }

    Ok(digits)
}

fn luhn_check_digit(payload: &[u8]) -> u8 {
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            let d = d as u32;
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    ((10 - sum % 10) % 10) as u8
}

/// Checks a digit string against the Luhn checksum
pub fn is_luhn_valid(number: &str) -> bool {
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<u8> = number.bytes().map(|b| b - b'0').collect();
    let (payload, check) = digits.split_at(digits.len() - 1);
    luhn_check_digit(payload) == check[0]
}

/// Generates a 16-digit Mastercard-range (51-55) number with a valid check digit
pub fn generate_card_number(rng: &dyn SecureRandom) -> Result<String> {
    let mut digits = vec![5u8];

    let second = loop {
        let d = random_digits(rng, 1)?[0];
        if (1..=5).contains(&d) {
            break d;
        }
    };
    digits.push(second);
    digits.extend(random_digits(rng, CARD_NUMBER_LEN - 3)?);
    digits.push(luhn_check_digit(&digits));

    Ok(digits.iter().map(|d| char::from(b'0' + d)).collect())
}

/// Generates a 3-digit security code
pub fn generate_security_code(rng: &dyn SecureRandom) -> Result<String> {
    let digits = random_digits(rng, SECURITY_CODE_LEN)?;
    Ok(digits.iter().map(|d| char::from(b'0' + d)).collect())
}

/// Builds the printed cardholder name from an employee's full name.
///
/// First and last names are kept whole, middle names shorter than three
/// characters ("da", "de") are dropped and the rest are reduced to their
/// initial. Everything is uppercased.
pub fn cardholder_name(full_name: &str) -> String {
    let parts: Vec<&str> = full_name.split_whitespace().collect();

    let names: Vec<String> = match parts.as_slice() {
        [] => Vec::new(),
        [only] => vec![only.to_uppercase()],
        [first, middle @ .., last] => {
            let mut names = vec![first.to_uppercase()];
            names.extend(
                middle
                    .iter()
                    .filter(|name| name.chars().count() >= MIN_MIDDLE_NAME_LEN)
                    .filter_map(|name| name.chars().next())
                    .map(|initial| initial.to_uppercase().collect::<String>()),
            );
            names.push(last.to_uppercase());
            names
        }
    };

    names.join(" ")
}

/// Expiration in `MM/YY` form, five years after issuance
pub fn expiration_date(issued_at: DateTime<Utc>) -> String {
    let expires = issued_at
        .date_naive()
        .checked_add_months(Months::new(VALIDITY_YEARS * 12))
        .unwrap_or(chrono::NaiveDate::MAX);

    expires.format("%m/%y").to_string()
}

fn parse_expiration(expiration_date: &str) -> Option<(i32, u32)> {
    let (month, year) = expiration_date.split_once('/')?;
    if month.len() != 2 || year.len() != 2 {
        return None;
    }

    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    Some((2000 + year, month))
}

/// A card stays valid through the last day of its expiration month.
/// Unparseable dates count as expired.
pub fn is_expired(expiration_date: &str, now: DateTime<Utc>) -> bool {
    match parse_expiration(expiration_date) {
        Some(expires) => (now.year(), now.month()) > expires,
        None => {
            tracing::warn!(expiration_date, "Unparseable card expiration date");
            true
        }
    }
}
