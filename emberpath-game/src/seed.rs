//! Human-friendly world share codes.
//! Code format: <WORD><NN>-<HEX4>, e.g., EMBER42-1F0C, WYRM07-00AA

use twox_hash::XxHash64;

// Word list for share codes
pub const WORD_LIST: [&str; 64] = [
    "EMBER", "ASH", "CINDER", "FLARE", "FROST", "RIME", "VENOM", "SHADE", "STORM", "THUNDER",
    "STONE", "GRANITE", "BLOOD", "ARCANE", "RUNE", "HIVE", "WAR", "CROWN", "HOLLOW", "KING",
    "WARDEN", "MATRON", "QUEEN", "STALKER", "CALLER", "COLOSS", "BARON", "SENTRY", "MOTHER",
    "CHIEF", "KEY", "GATE", "LANTERN", "CAMP", "VAULT", "GROTTO", "BASTION", "FORK", "PEAK",
    "WOOD", "GLOAM", "WATCH", "TOWN", "ROAD", "TORCH", "SHIELD", "BLADE", "BOW", "STAFF", "HELM",
    "CLOAK", "PLUME", "SHARD", "RELIC", "OMEN", "WYRM", "RAVEN", "WOLF", "BEAR", "OWL", "FOX",
    "STAG", "ADDER", "MOTH",
];

const CODE_DOMAIN: u64 = 0x454D_4245_5250_4154; // "EMBERPAT"
const NN_SHIFT: u32 = 22;
const WORD_SHIFT: u32 = 16;
const PACKED_MASK: u64 = 0x1FFF_FFFF;

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[inline]
fn pack(word_index: u8, nn: u8, tail: u16) -> u64 {
    (u64::from(nn & 0x7F) << NN_SHIFT) | (u64::from(word_index & 0x3F) << WORD_SHIFT) | u64::from(tail)
}

#[inline]
fn unpack(seed: u64) -> (u8, u8, u16) {
    let word_index = ((seed >> WORD_SHIFT) & 0x3F) as u8;
    let nn = ((seed >> NN_SHIFT) & 0x7F) as u8;
    let tail = (seed & 0xFFFF) as u16;
    (word_index, nn, tail)
}

/// Fill the bits a code does not carry from a hash of the bits it does.
fn compose_seed(word_index: u8, nn: u8, tail: u16) -> u64 {
    let packed = pack(word_index, nn, tail);
    let high = XxHash64::oneshot(CODE_DOMAIN, &packed.to_le_bytes());
    (high & !PACKED_MASK) | packed
}

/// Render the share code for `seed`. Only the low 29 bits are carried.
#[must_use]
pub fn encode_world_code(seed: u64) -> String {
    let (word_index, mut nn, tail) = unpack(seed);
    let word = WORD_LIST
        .get(usize::from(word_index))
        .copied()
        .unwrap_or(WORD_LIST[0]);
    if nn > 99 {
        nn %= 100;
    }
    format!("{word}{nn:02}-{tail:04X}")
}

/// Parse a share code back into the seed it names.
#[must_use]
pub fn decode_world_code(code: &str) -> Option<u64> {
    let (head, tail) = code.trim().split_once('-')?;
    if !head.is_ascii() || !tail.is_ascii() || head.len() < 3 || tail.len() != 4 {
        return None;
    }
    let (word_part, nn_part) = head.split_at(head.len() - 2);
    if !nn_part.bytes().all(|b| b.is_ascii_digit())
        || !tail.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return None;
    }
    let nn: u8 = nn_part.parse().ok()?;
    let tail = u16::from_str_radix(tail, 16).ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| *w == word)?;
    let word_index = u8::try_from(idx).ok()?;
    Some(compose_seed(word_index, nn, tail))
}

/// Pick a fresh code from raw entropy.
#[must_use]
pub fn world_code_from_entropy(entropy: u64) -> String {
    let word_index = u8::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    let tail = (entropy >> 32) as u16;
    encode_world_code(compose_seed(word_index, nn, tail))
}
