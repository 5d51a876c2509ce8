use rand::rngs::OsRng;
use rand::RngCore;

/// Code alphabet: uppercase letters and digits without the look-alikes
/// 0, O, 1, I and L.
pub const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Fixed code length; the `redemptions` CHECK constraint matches it.
pub const CODE_LENGTH: usize = 8;

/// Bytes at or above this value are rejected so every symbol is equally likely.
const REJECT_THRESHOLD: usize = 256 - (256 % ALPHABET.len());

/// Generate a code from the operating system CSPRNG.
pub fn generate_code() -> String {
    generate_code_with(&mut OsRng)
}

pub fn generate_code_with<R: RngCore + ?Sized>(rng: &mut R) -> String {
    draw(rng, CODE_LENGTH)
}

fn draw<R: RngCore + ?Sized>(rng: &mut R, length: usize) -> String {
    let mut code = String::with_capacity(length);
    let mut buf = [0u8; 32];

    while code.len() < length {
        rng.fill_bytes(&mut buf);
        for &byte in buf.iter() {
            if (byte as usize) >= REJECT_THRESHOLD {
                continue;
            }
            code.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
            if code.len() == length {
                break;
            }
        }
    }
    code
}

/// Uppercase and strip whitespace and dashes, as typed at the redemption desk.
pub fn normalize_code(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| ALPHABET.contains(&b))
}
