//! ESC/POS encoding for 58 mm thermal printers.
//!
//! Only the handful of commands the receipt layout needs are emitted. Text is
//! written in code page 858, selected right after initialization.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{Align, Op, Receipt};

const ESC: u8 = 0x1b;
const GS: u8 = 0x1d;
const LF: u8 = 0x0a;

/// `ESC t` table number of PC858 (Latin-1 plus euro).
const CODE_PAGE_PC858: u8 = 19;

/// QR model 2, module size 6, error correction level M.
const QR_MODEL: u8 = 0x32;
const QR_MODULE_SIZE: u8 = 6;
const QR_EC_LEVEL_M: u8 = 0x31;

/// Encodes a receipt into the byte stream sent to the printer.
pub fn encode(receipt: &Receipt) -> Vec<u8> {
    let mut out = Vec::with_capacity(512);
    out.extend_from_slice(&[ESC, b'@']);
    out.extend_from_slice(&[ESC, b't', CODE_PAGE_PC858]);

    for op in &receipt.ops {
        match op {
            Op::Align(align) => {
                let n = match align {
                    Align::Left => 0,
                    Align::Center => 1,
                };
                out.extend_from_slice(&[ESC, b'a', n]);
            }
            Op::Bold(on) => out.extend_from_slice(&[ESC, b'E', u8::from(*on)]),
            Op::Size(width, height) => {
                let w = (*width).clamp(1, 8) - 1;
                let h = (*height).clamp(1, 8) - 1;
                out.extend_from_slice(&[GS, b'!', (w << 4) | h]);
            }
            Op::Line(text) => {
                out.extend(to_code_page(text));
                out.push(LF);
            }
            Op::Rule => {
                out.extend(std::iter::repeat_n(b'-', receipt.columns));
                out.push(LF);
            }
            Op::Feed(lines) => out.extend_from_slice(&[ESC, b'd', *lines]),
            Op::Qr(data) => qr(&mut out, data),
            Op::Cut => {
                out.extend_from_slice(&[LF, LF]);
                out.extend_from_slice(&[GS, b'V', 1]);
            }
        }
    }
    out
}

fn qr(out: &mut Vec<u8>, data: &str) {
    let payload = to_code_page(data);
    // Store length counts the `cn fn m` prefix bytes.
    let len = payload.len().min(u16::MAX as usize - 3) + 3;
    let [pl, ph] = (len as u16).to_le_bytes();

    out.extend_from_slice(&[GS, b'(', b'k', 4, 0, 0x31, 0x41, QR_MODEL, 0]);
    out.extend_from_slice(&[GS, b'(', b'k', 3, 0, 0x31, 0x43, QR_MODULE_SIZE]);
    out.extend_from_slice(&[GS, b'(', b'k', 3, 0, 0x31, 0x45, QR_EC_LEVEL_M]);
    out.extend_from_slice(&[GS, b'(', b'k', pl, ph, 0x31, 0x50, 0x30]);
    out.extend_from_slice(&payload[..len - 3]);
    out.extend_from_slice(&[GS, b'(', b'k', 3, 0, 0x31, 0x51, 0x30]);
    out.push(LF);
}

/// Upper half of code page 858.
const PC858_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', 'ø', '£', 'Ø', '×', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '®', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', 'Á', 'Â', 'À', '©', '╣', '║', '╗', '╝', '¢', '¥', '┐', //
    '└', '┴', '┬', '├', '─', '┼', 'ã', 'Ã', '╚', '╔', '╩', '╦', '╠', '═', '╬', '¤', //
    'ð', 'Ð', 'Ê', 'Ë', 'È', '€', 'Í', 'Î', 'Ï', '┘', '┌', '█', '▄', '¦', 'Ì', '▀', //
    'Ó', 'ß', 'Ô', 'Ò', 'õ', 'Õ', 'µ', 'þ', 'Þ', 'Ú', 'Û', 'Ù', 'ý', 'Ý', '¯', '´', //
    '\u{ad}', '±', '‗', '¾', '¶', '§', '÷', '¸', '°', '¨', '·', '¹', '³', '²', '■', '\u{a0}',
];

fn code_page_byte(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' => Some(ch as u8),
        '\t' => Some(b' '),
        _ => PC858_HIGH
            .iter()
            .position(|candidate| *candidate == ch)
            .map(|index| 0x80 + index as u8),
    }
}

/// Encodes text in code page 858.
///
/// A character missing from the page is replaced by its compatibility
/// decomposition without accents (`ũ` prints as `u`, `№` as `No`), and by `?`
/// when nothing of it can be printed.
pub fn to_code_page(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if let Some(byte) = code_page_byte(ch) {
            out.push(byte);
            continue;
        }
        let folded = std::iter::once(ch)
            .nfkd()
            .filter(|part| !is_combining_mark(*part))
            .filter_map(code_page_byte)
            .collect::<Vec<_>>();
        if folded.is_empty() {
            out.push(b'?');
        } else {
            out.extend(folded);
        }
    }
    out
}

/// Reads code page 858 bytes back into text.
pub fn from_code_page(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| match byte {
            0x00..=0x7f => char::from(*byte),
            _ => PC858_HIGH[usize::from(byte - 0x80)],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(ops: Vec<Op>) -> Receipt {
        Receipt {
            payment_id: "p1".to_string(),
            columns: 8,
            ops,
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }

    #[test]
    fn starts_with_initialize() {
        assert_eq!(
            encode(&receipt(Vec::new())),
            vec![ESC, b'@', ESC, b't', CODE_PAGE_PC858]
        );
    }

    #[test]
    fn formatting_commands() {
        let bytes = encode(&receipt(vec![
            Op::Align(Align::Center),
            Op::Bold(true),
            Op::Size(2, 2),
            Op::Rule,
        ]));
        assert!(contains(&bytes, &[ESC, b'a', 1]));
        assert!(contains(&bytes, &[ESC, b'E', 1]));
        assert!(contains(&bytes, &[GS, b'!', 0x11]));
        assert!(contains(&bytes, b"--------\n"));
    }

    #[test]
    fn qr_store_length_includes_header() {
        let bytes = encode(&receipt(vec![Op::Qr("abc".to_string())]));
        assert!(contains(&bytes, &[GS, b'(', b'k', 6, 0, 0x31, 0x50, 0x30, b'a', b'b', b'c']));
        assert!(contains(&bytes, &[GS, b'(', b'k', 3, 0, 0x31, 0x45, 0x31]));
        assert!(contains(&bytes, &[GS, b'(', b'k', 3, 0, 0x31, 0x51, 0x30]));
    }

    #[test]
    fn ends_with_partial_cut() {
        let bytes = encode(&receipt(vec![Op::Cut]));
        assert!(bytes.ends_with(&[GS, b'V', 1]));
    }

    #[test]
    fn latin_text_keeps_its_accents() {
        assert_eq!(to_code_page("Zoë"), vec![b'Z', b'o', 0x89]);
        assert_eq!(to_code_page("Café €5"), vec![b'C', b'a', b'f', 0x82, b' ', 0xd5, b'5']);
        assert_eq!(from_code_page(&to_code_page("Zoë Müller, Señora")), "Zoë Müller, Señora");
    }

    #[test]
    fn missing_characters_fall_back() {
        assert_eq!(to_code_page("Wanjirũ №5"), b"Wanjiru No5".to_vec());
        assert_eq!(to_code_page("Zoë 日本"), vec![b'Z', b'o', 0x89, b' ', b'?', b'?']);
    }

    #[test]
    fn line_text_is_encoded_in_the_stream() {
        let bytes = encode(&receipt(vec![Op::Line("Name: Zoë".to_string())]));
        assert!(contains(&bytes, &[b':', b' ', b'Z', b'o', 0x89, LF]));
    }
}
